use std::{
    env,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use newsagent_api::{NewsClient, NewsSource};
use rocket::{fs::FileServer, request::FlashMessage, Build, Rocket};
use rocket_dyn_templates::{tera, Template};
use serde::Serialize;

use localization::UserLanguage;

use crate::{
    configuration::{
        ApiUrl, Configuration, ConfigurationManager, SearchDebounceMillis, SiteName,
    },
    markdown::MarkdownFilter,
};

mod localization;
mod news;

pub type SharedSource = Arc<dyn NewsSource>;

fn root_path() -> PathBuf {
    env::var("CARGO_MANIFEST_DIR")
        .ok()
        .and_then(|dir| Path::new(&dir).parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_default()
}

pub fn rocket_server(source: SharedSource) -> Rocket<Build> {
    let root_path = root_path();
    let figment =
        rocket::Config::figment().merge(("template_dir", root_path.join("templates")));

    rocket::custom(figment)
        .manage(source)
        .attach(Template::custom(|engines| {
            engines
                .tera
                .register_filter("render_markdown", MarkdownFilter);
            engines
                .tera
                .register_filter("language_code", localization::LanguageCode);
            engines
                .tera
                .register_function("localize", localization::Localize);
            engines
                .tera
                .register_function("site_name", TeraConfiguration::<SiteName>::default());
            engines.tera.register_function(
                "search_debounce_millis",
                TeraConfiguration::<SearchDebounceMillis>::default(),
            );
        }))
        .mount(
            "/",
            routes![
                news::list_news,
                news::view_news,
                news::generate_news,
                news::generate_news_form,
                news::search_news,
            ],
        )
        .mount("/static", FileServer::from(root_path.join("static")))
}

pub async fn main() -> anyhow::Result<()> {
    let api_url = ApiUrl::get().unwrap_or_default();
    let client = NewsClient::new(&api_url)?;
    info!("using news service at {}", client.base_url());

    if let Err(error) = rocket_server(Arc::new(client)).launch().await {
        error!("webserver stopped: {}", error);
        anyhow::bail!("webserver stopped unexpectedly");
    }

    Ok(())
}

pub struct TeraConfiguration<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for TeraConfiguration<T> {
    fn default() -> Self {
        Self {
            _phantom: Default::default(),
        }
    }
}

impl<T> tera::Function for TeraConfiguration<T>
where
    T: Configuration + Send + Sync,
{
    fn call(
        &self,
        _args: &std::collections::HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        let manager = ConfigurationManager::shared();
        let value = manager
            .get::<T>()
            .ok_or_else(|| tera::Error::msg("no value found"))?;
        serde_json::to_value(value).map_err(|err| tera::Error::msg(err.to_string()))
    }
}

/// A transient message shown at the top of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    FetchFailed,
    GenerateFailed,
    TopicRequired,
    Generated,
}

impl Notice {
    const ALL: [Notice; 4] = [
        Notice::FetchFailed,
        Notice::GenerateFailed,
        Notice::TopicRequired,
        Notice::Generated,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Notice::FetchFailed => "news-fetch-failed",
            Notice::GenerateFailed => "news-generate-failed",
            Notice::TopicRequired => "news-topic-required",
            Notice::Generated => "news-generated",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|notice| notice.key() == key)
    }

    pub fn from_flash(flash: &FlashMessage<'_>) -> Option<Self> {
        Self::from_key(flash.message())
    }

    pub fn is_error(self) -> bool {
        !matches!(self, Notice::Generated)
    }

    pub(crate) fn view(self) -> NoticeView {
        NoticeView {
            error: self.is_error(),
            title: if self.is_error() {
                "notice-error-title"
            } else {
                "news-generated-title"
            },
            message: self.key(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoticeView {
    pub error: bool,
    pub title: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RequestData {
    pub language: String,
    pub search: String,
    pub notices: Vec<NoticeView>,
}

impl RequestData {
    pub fn new(language: UserLanguage, search: Option<&str>, notices: &[Notice]) -> Self {
        Self {
            language: language.0,
            search: search.unwrap_or_default().to_owned(),
            notices: notices.iter().map(|notice| notice.view()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rocket::local::asynchronous::Client;

    use super::{rocket_server, Notice};
    use crate::{
        configuration::{ConfigurationManager, SearchDebounceMillis},
        test_helpers::FixtureSource,
    };

    #[test]
    fn notice_keys_round_trip() {
        for notice in Notice::ALL {
            assert_eq!(Notice::from_key(notice.key()), Some(notice));
        }
        assert_eq!(Notice::from_key("something-else"), None);
    }

    #[test]
    fn only_generation_success_is_not_an_error() {
        assert!(!Notice::Generated.is_error());
        assert!(Notice::FetchFailed.is_error());
        assert!(Notice::GenerateFailed.is_error());
        assert!(Notice::TopicRequired.is_error());
    }

    #[rocket::async_test]
    async fn layout_debounces_search_with_configured_delay() {
        ConfigurationManager::shared()
            .set::<SearchDebounceMillis>(450)
            .unwrap();
        let client = Client::tracked(rocket_server(Arc::new(FixtureSource::new(Vec::new()))))
            .await
            .expect("valid rocket instance");

        let body = client
            .get("/")
            .dispatch()
            .await
            .into_string()
            .await
            .unwrap();
        assert!(body.contains("clearTimeout(pending);"));
        assert!(body.contains("form.submit(); }, 450);"));
    }
}
