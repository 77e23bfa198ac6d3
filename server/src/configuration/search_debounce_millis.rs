use super::Configuration;

pub struct SearchDebounceMillis;

impl Configuration for SearchDebounceMillis {
    type Type = u64;

    fn default() -> Option<Self::Type> {
        Some(300)
    }

    fn key() -> &'static str {
        "search-debounce-millis"
    }
}
