//! Error taxonomy for the extract stage.

use thiserror::Error;

/// Failure while resolving or fetching one catalog page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid page index {0}: pages start at 1")]
    InvalidPage(i64),

    #[error("invalid catalog url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("timeout fetching {url}")]
    Timeout { url: String },

    #[error("connection failed for {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ScrapeError {
    /// Classify a transport error the way the page log reports it.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            ScrapeError::Timeout { url }
        } else if err.is_connect() {
            ScrapeError::Connection { url, source: err }
        } else if let Some(status) = err.status() {
            ScrapeError::HttpStatus { url, status: status.as_u16() }
        } else {
            ScrapeError::Fetch { url, source: err }
        }
    }
}

/// A listing card the parser could not read.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("listing card has no title")]
    MissingTitle,
}

/// Why the transform stage dropped a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Reject {
    #[error("{field} holds a placeholder value")]
    InvalidToken { field: &'static str },

    #[error("price is not a valid amount")]
    InvalidPrice,

    #[error("rating has no numeric value")]
    InvalidRating,

    #[error("duplicate of an earlier record")]
    Duplicate,
}
