use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid news service url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("error talking to the news service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from the news service: {0}")]
    Decode(#[from] serde_json::Error),
}
