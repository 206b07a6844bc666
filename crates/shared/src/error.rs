use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unsupported time range: {0}")]
    UnsupportedRange(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("magnitude threshold must be a finite number")]
    NotFinite,
}

/// Failure modes of a single event fetch.
///
/// `Cancelled` is an expected outcome of a superseded request and is never
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Failed to fetch earthquakes: {0}")]
    Http(u16),
    #[error("Invalid data received: {0}")]
    MalformedPayload(String),
    #[error("Failed to reach earthquake service: {0}")]
    Transport(String),
    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
