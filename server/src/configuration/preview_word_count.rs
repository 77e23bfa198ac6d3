use super::Configuration;

pub struct PreviewWordCount;

impl Configuration for PreviewWordCount {
    type Type = usize;

    fn default() -> Option<Self::Type> {
        Some(15)
    }

    fn key() -> &'static str {
        "preview-word-count"
    }
}
