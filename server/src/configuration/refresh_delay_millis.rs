use super::Configuration;

pub struct RefreshDelayMillis;

impl Configuration for RefreshDelayMillis {
    type Type = u64;

    fn default() -> Option<Self::Type> {
        Some(2000)
    }

    fn key() -> &'static str {
        "refresh-delay-millis"
    }
}
