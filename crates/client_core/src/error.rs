use thiserror::Error;

/// Every way a backend request can fail.
///
/// Components never surface these directly; they log the cause and store a fixed
/// human-readable message in their own error slot.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("invalid api base url '{0}'")]
    InvalidBaseUrl(String),
    #[error("no api key configured for {0} requests")]
    MissingApiKey(&'static str),
}
