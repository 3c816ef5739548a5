use std::time::Duration;
use thiserror::Error;

/// Transport-level failure of a batch call. The call produced no usable
/// counters, so nothing from the batch is merged.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The request could not be sent or the connection broke mid-flight.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered 2xx but the body was not a valid batch response.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The call did not resolve within the configured per-call timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The processor is misconfigured or cannot accept work.
    #[error("processor unavailable: {0}")]
    Unavailable(String),
}
