use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use newsagent_api::{schema::Article, ApiError, NewsSource};

/// An in-memory news service that records what it was asked to do.
#[derive(Debug, Default)]
pub struct FixtureSource {
    articles: Option<Vec<Article>>,
    fail_generation: bool,
    list_calls: AtomicUsize,
    generated: Mutex<Vec<String>>,
}

impl FixtureSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles: Some(articles),
            ..Default::default()
        }
    }

    /// A service that cannot be reached at all.
    pub fn failing() -> Self {
        Self {
            articles: None,
            fail_generation: true,
            ..Default::default()
        }
    }

    pub fn with_failing_generation(mut self) -> Self {
        self.fail_generation = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn generated(&self) -> Vec<String> {
        self.generated.lock().unwrap().clone()
    }
}

fn unreachable() -> ApiError {
    // A decode failure stands in for any error coming back from the service.
    ApiError::Decode(serde_json::from_str::<Vec<Article>>("unreachable").unwrap_err())
}

#[rocket::async_trait]
impl NewsSource for FixtureSource {
    async fn list_articles(&self) -> Result<Vec<Article>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.articles.clone().ok_or_else(unreachable)
    }

    async fn generate(&self, topic: &str) -> Result<(), ApiError> {
        self.generated.lock().unwrap().push(topic.to_owned());
        if self.fail_generation {
            Err(unreachable())
        } else {
            Ok(())
        }
    }
}
