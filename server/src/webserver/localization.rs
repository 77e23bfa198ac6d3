use fluent_templates::{LanguageIdentifier, Loader};
use rocket::{
    request::{FromRequest, Outcome},
    Request,
};
use rocket_dyn_templates::tera::{self, Value};
use std::{collections::HashMap, str::FromStr};

use crate::configuration::{Configuration, SitePrimaryLocale};

fluent_templates::static_loader! {
    static LOCALES = {
        locales: "../strings",
        fallback_language: "en-US",
    };
}

fn string_arg<'a>(args: &'a HashMap<String, Value>, name: &str) -> tera::Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg(format!("{} must be a string", name)))
}

fn language_identifier(code: &str) -> tera::Result<LanguageIdentifier> {
    LanguageIdentifier::from_str(code)
        .map_err(|_| tera::Error::msg(format!("invalid language code {:?}", code)))
}

fn lookup(language: &LanguageIdentifier, key: &str) -> String {
    LOCALES
        .lookup(language, key)
        .unwrap_or_else(|| key.to_owned())
}

/// Looks up `key` for a negotiated language code. Unknown keys and
/// unparseable codes yield the key itself.
pub fn localize(language: &str, key: &str) -> String {
    match LanguageIdentifier::from_str(language) {
        Ok(language) => lookup(&language, key),
        Err(_) => key.to_owned(),
    }
}

/// `localize(key=..., language=...)`
pub struct Localize;

impl tera::Function for Localize {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let key = string_arg(args, "key")?;
        let language = language_identifier(string_arg(args, "language")?)?;

        Ok(Value::String(lookup(&language, key)))
    }
}

/// Reduces a full locale (`en-US`) to its language subtag (`en`).
pub struct LanguageCode;

impl tera::Filter for LanguageCode {
    fn filter(&self, value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let code = value
            .as_str()
            .ok_or_else(|| tera::Error::msg("language must be a string"))?;

        Ok(Value::from(language_identifier(code)?.language.to_string()))
    }
}

#[derive(Debug)]
pub struct UserLanguage(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserLanguage {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let default_locale =
            SitePrimaryLocale::get().unwrap_or_else(|| String::from("en-US"));
        let available = LOCALES.locales().cloned().collect::<Vec<_>>();

        Outcome::Success(UserLanguage(pick_best_language(
            &default_locale,
            request.headers().get_one("Accept-Language"),
            &available,
        )))
    }
}

#[derive(Debug, PartialEq)]
struct AcceptableLanguage<'a> {
    code: &'a str,
    weight: f32,
}

fn parse_accept_language_header(header: &str) -> Vec<AcceptableLanguage<'_>> {
    header
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(2, ";q=");
            let code = parts.next().unwrap_or_default().trim();
            let weight = parts
                .next()
                .map(|q| q.trim().parse::<f32>().unwrap_or_default())
                .unwrap_or(1.);
            AcceptableLanguage { code, weight }
        })
        .collect()
}

/// Picks the highest weighted language from the header that one of the
/// available locales can serve. Earlier entries win ties.
fn pick_best_language(
    default_code: &str,
    accept_language_header: Option<&str>,
    available_locales: &[LanguageIdentifier],
) -> String {
    let mut candidates = accept_language_header
        .map(parse_accept_language_header)
        .unwrap_or_default();
    candidates.retain(|language| language.weight > 0.);
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    candidates
        .into_iter()
        .find(|language| {
            LanguageIdentifier::from_str(language.code)
                .map(|identifier| {
                    available_locales
                        .iter()
                        .any(|locale| identifier.matches(locale, true, false))
                })
                .unwrap_or(false)
        })
        .map(|language| language.code.to_owned())
        .unwrap_or_else(|| default_code.to_owned())
}
