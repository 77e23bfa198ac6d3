use serde::{Deserialize, Serialize};

/// A generated news article as returned by the news service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub topic: String,
    pub title: String,
    pub slug: String,
    pub content: String,
}

impl Article {
    pub fn new(topic: &str, title: &str, slug: &str, content: &str) -> Self {
        Self {
            topic: topic.to_owned(),
            title: title.to_owned(),
            slug: slug.to_owned(),
            content: content.to_owned(),
        }
    }

    /// Returns the first article whose slug is exactly `slug`.
    pub fn find_by_slug<'a>(articles: &'a [Article], slug: &str) -> Option<&'a Article> {
        articles.iter().find(|article| article.slug == slug)
    }
}
