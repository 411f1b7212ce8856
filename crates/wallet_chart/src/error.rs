//! Chart error types.

use crate::model::ChartType;

/// Failure reported by a [`crate::ChartDataFetcher`].
///
/// The service forwards it to observers untouched, so it is `Clone` and
/// comparable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into chart points.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The fetcher has no data for this chart type.
    #[error("Unsupported chart type: {0}")]
    UnsupportedChartType(ChartType),

    #[error("Fetch error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Errors raised while setting up a [`crate::ChartLoadingService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service was constructed outside a tokio runtime.
    #[error("No tokio runtime available to run chart fetches")]
    NoRuntime,
}
