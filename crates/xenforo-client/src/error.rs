//! XenForo client errors.

use thiserror::Error;

/// Which half of the two-step search protocol failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// `POST /api/search` (obtaining the search_id).
    Create,
    /// `GET /api/search/{id}` (fetching the ranked results).
    Fetch,
}

impl std::fmt::Display for SearchStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStep::Create => write!(f, "create"),
            SearchStep::Fetch => write!(f, "fetch"),
        }
    }
}

#[derive(Error, Debug)]
pub enum XfError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Endpoint not found")]
    NotFound,

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Search failed at {step} step: {source}")]
    Search {
        step: SearchStep,
        #[source]
        source: Box<XfError>,
    },

    #[error("Search response missing search_id")]
    MissingSearchId,
}

impl XfError {
    /// Tag an error with the search step it occurred in.
    pub(crate) fn in_search_step(self, step: SearchStep) -> Self {
        XfError::Search {
            step,
            source: Box::new(self),
        }
    }
}
