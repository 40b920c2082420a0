use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base '{base}': {reason}")]
    InvalidBase { base: String, reason: String },
    /// Non-2xx answer; `detail` is the service's message when it sent one.
    #[error("{detail}")]
    Api { status: u16, detail: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
