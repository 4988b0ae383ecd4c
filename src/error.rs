use thiserror::Error;

/// Errors raised by the cache and fetch paths.
///
/// A non-success HTTP status is deliberately absent: it is reported as
/// `Ok(None)` by [`fetch_api_data`](crate::fetch_api_data) so callers can tell
/// "the server said no" apart from a genuine failure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Storage error for key '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn parse(what: &'static str, source: serde_json::Error) -> Self {
        Error::Parse { what, source }
    }

    pub(crate) fn storage(key: &str, source: std::io::Error) -> Self {
        Error::Storage {
            key: key.to_string(),
            source,
        }
    }

    /// True for malformed stored or fetched JSON
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
