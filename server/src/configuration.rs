mod api_url;
mod preview_word_count;
mod refresh_delay_millis;
mod search_debounce_millis;
mod site_name;
mod site_primary_locale;

pub use self::{
    api_url::ApiUrl, preview_word_count::PreviewWordCount,
    refresh_delay_millis::RefreshDelayMillis, search_debounce_millis::SearchDebounceMillis,
    site_name::SiteName, site_primary_locale::SitePrimaryLocale,
};

use once_cell::sync::OnceCell;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    env,
    sync::{Arc, RwLock},
};
use thiserror::Error;

pub trait Configuration {
    type Type: Serialize + DeserializeOwned;

    fn default() -> Option<Self::Type>;
    fn key() -> &'static str;

    /// The environment variable consulted when no override has been set,
    /// e.g. `NEWSAGENT_API_URL` for `api-url`.
    fn environment_variable() -> String {
        format!("NEWSAGENT_{}", Self::key().to_uppercase().replace('-', "_"))
    }

    fn get() -> Option<Self::Type>
    where
        Self: Sized,
    {
        ConfigurationManager::shared().get::<Self>()
    }
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("configuration lock poisoned")]
    Poisoned,
    #[error("invalid value for {key}: {source}")]
    InvalidValue {
        key: &'static str,
        source: serde_json::Error,
    },
}

static SHARED_MANAGER: OnceCell<ConfigurationManager> = OnceCell::new();

#[derive(Clone, Debug, Default)]
pub struct ConfigurationManager {
    active_configuration: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl ConfigurationManager {
    pub fn shared() -> Self {
        SHARED_MANAGER.get_or_init(Self::default).clone()
    }

    pub fn get<T: Configuration>(&self) -> Option<T::Type> {
        let overridden = self
            .active_configuration
            .read()
            .ok()
            .and_then(|configuration| configuration.get(T::key()).cloned());

        overridden
            .and_then(|v| serde_json::value::from_value(v).ok())
            .or_else(|| {
                env::var(T::environment_variable())
                    .ok()
                    .and_then(|raw| parse_value::<T>(&raw))
            })
            .or_else(T::default)
    }

    pub fn set<T: Configuration>(&self, value: T::Type) -> Result<(), ConfigurationError> {
        let value = serde_json::to_value(value).map_err(|source| {
            ConfigurationError::InvalidValue {
                key: T::key(),
                source,
            }
        })?;
        let mut configuration = self
            .active_configuration
            .write()
            .map_err(|_| ConfigurationError::Poisoned)?;
        configuration.insert(T::key().to_owned(), value);
        Ok(())
    }
}

/// Interprets a raw setting as JSON, falling back to treating it as a plain
/// string so that `NEWSAGENT_SITE_NAME=My News` works without quoting.
fn parse_value<T: Configuration>(raw: &str) -> Option<T::Type> {
    serde_json::from_str(raw)
        .or_else(|_| serde_json::value::from_value(serde_json::Value::String(raw.to_owned())))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{
        parse_value, ApiUrl, Configuration, ConfigurationManager, PreviewWordCount,
        RefreshDelayMillis, SearchDebounceMillis, SiteName,
    };

    #[test]
    fn environment_variable_names() {
        assert_eq!(ApiUrl::environment_variable(), "NEWSAGENT_API_URL");
        assert_eq!(
            SearchDebounceMillis::environment_variable(),
            "NEWSAGENT_SEARCH_DEBOUNCE_MILLIS"
        );
    }

    #[test]
    fn parse_numbers_and_strings() {
        assert_eq!(parse_value::<PreviewWordCount>("20"), Some(20));
        assert_eq!(parse_value::<PreviewWordCount>("twenty"), None);
        assert_eq!(
            parse_value::<SiteName>("My News"),
            Some(String::from("My News"))
        );
        assert_eq!(
            parse_value::<SiteName>("\"Quoted\""),
            Some(String::from("Quoted"))
        );
    }

    #[test]
    fn defaults() {
        let manager = ConfigurationManager::default();
        assert_eq!(manager.get::<PreviewWordCount>(), Some(15));
        assert_eq!(manager.get::<RefreshDelayMillis>(), Some(2000));
    }

    #[test]
    fn overrides_win() {
        let manager = ConfigurationManager::default();
        manager.set::<SearchDebounceMillis>(50).unwrap();
        assert_eq!(manager.get::<SearchDebounceMillis>(), Some(50));
    }
}
