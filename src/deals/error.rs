use thiserror::Error;

/// Failures an adapter can raise. Structural mismatches (selectors or JSON
/// fields not found) are not errors; adapters report them as zero matches.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: wreq::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("browser automation failed: {0}")]
    Browser(String),

    #[error("session cookies unavailable at {path}: {reason}")]
    Session { path: String, reason: String },
}

impl ScrapeError {
    /// Returns true for deadline expiries.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::Timeout { .. })
    }
}
