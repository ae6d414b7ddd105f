//! Site adapters: one per storefront, each returning raw records for a query.

pub mod chaldal;
pub mod daraz;
pub mod shwapno_api;
pub mod shwapno_page;

use crate::deals::error::ScrapeError;
use crate::deals::models::RawDeal;
use crate::deals::sources::Source;
use async_trait::async_trait;
use serde_json::Value;

pub use chaldal::ChaldalSource;
pub use daraz::DarazSource;
pub use shwapno_api::ShwapnoApiSource;
pub use shwapno_page::ShwapnoPageSource;

/// Trait for storefront adapters - enables mocking for tests.
///
/// Adapters make a single attempt. They report "nothing found" as an empty
/// list and raise only for failures they cannot interpret.
#[async_trait]
pub trait DealSource: Send + Sync {
    /// Fetches raw records for a query.
    async fn fetch(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError>;

    /// Returns the source this adapter serves.
    fn source(&self) -> Source;
}

/// Renders a JSON scalar as text. Storefront APIs mix numbers and strings.
pub(crate) fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolves a root-relative path (`/asset/x.png`) against `origin`.
///
/// Anything else is returned trimmed; host-only and schema-relative URLs are
/// completed later by normalization.
pub(crate) fn on_origin(origin: &str, url: &str) -> String {
    let url = url.trim();
    if url.starts_with('/') && !url.starts_with("//") {
        format!("{}{}", origin, url)
    } else {
        url.to_string()
    }
}
