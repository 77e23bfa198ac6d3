use super::Configuration;

pub struct ApiUrl;

impl Configuration for ApiUrl {
    type Type = String;

    fn default() -> Option<Self::Type> {
        Some(String::from("http://localhost:8000"))
    }

    fn key() -> &'static str {
        "api-url"
    }
}
