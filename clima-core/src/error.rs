use thiserror::Error;

/// Failure of a single weather or geocoding lookup.
///
/// The coordinator discards these after logging them; they exist so each
/// lookup stays testable on its own.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("no match for {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected response shape: {0}")]
    Parse(String),

    #[error("city query must not be empty")]
    EmptyQuery,

    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound(_))
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ResolveError::Parse(err.to_string())
        } else {
            ResolveError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::Parse(err.to_string())
    }
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
