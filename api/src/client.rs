use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::{schema::Article, ApiError};

/// The external service that generates and stores articles.
#[async_trait]
pub trait NewsSource: Send + Sync + 'static {
    /// Fetches every article the service knows about.
    async fn list_articles(&self) -> Result<Vec<Article>, ApiError>;

    /// Asks the service to generate an article about `topic`. Only transport
    /// failures are reported; the response itself is not examined.
    async fn generate(&self, topic: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    topic: &'a str,
}

impl NewsClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            source,
        })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_url(&self) -> String {
        format!("{}/news/", self.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/generate_news/", self.base_url)
    }
}

fn decode_articles(body: &str) -> Result<Vec<Article>, ApiError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn list_articles(&self) -> Result<Vec<Article>, ApiError> {
        let body = self.http.get(self.list_url()).send().await?.text().await?;
        let articles = decode_articles(&body)?;
        log::debug!("fetched {} articles", articles.len());
        Ok(articles)
    }

    async fn generate(&self, topic: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.generate_url())
            .json(&GenerateRequest { topic })
            .send()
            .await?;

        if !response.status().is_success() {
            log::warn!(
                "news service answered {} to generation of {:?}",
                response.status(),
                topic
            );
        }

        Ok(())
    }
}
