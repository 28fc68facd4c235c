// Error type shared by the config and client modules. The binary wraps it
// in `anyhow` for reporting, so variants only need to carry enough to
// render a useful message.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build request: {0}")]
    Request(String),

    #[error("failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    /// Any status other than 200. Rendered with the full status line.
    #[error("http status is \"{0}\"")]
    Status(StatusCode),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}
