//! Shwapno search and product detail APIs.
//!
//! Two phases: the search endpoint returns up to `page_size` candidates, then
//! each candidate's details are requested one after another, so a query costs
//! `1 + candidates` calls.

use super::{json_text, on_origin, DealSource};
use crate::deals::client::ApiClient;
use crate::deals::error::ScrapeError;
use crate::deals::models::RawDeal;
use crate::deals::sources::Source;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Public storefront origin; product links are built from it.
pub const SHWAPNO_ORIGIN: &str = "https://www.shwapno.com";

/// Default number of search candidates to resolve.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Adapter for the Shwapno JSON API.
///
/// Never raises: every failure is logged and reported as no results.
pub struct ShwapnoApiSource {
    client: Arc<ApiClient>,
    api_base: String,
    page_size: usize,
    cookie: Option<String>,
}

impl ShwapnoApiSource {
    /// Creates an adapter talking to the live API.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_base_url(client, SHWAPNO_ORIGIN)
    }

    /// Creates an adapter with a custom API base URL (for testing).
    pub fn with_base_url(client: Arc<ApiClient>, api_base: impl Into<String>) -> Self {
        Self { client, api_base: api_base.into(), page_size: DEFAULT_PAGE_SIZE, cookie: None }
    }

    /// Sets how many search candidates are resolved.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets a session `Cookie` header sent with every request.
    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie.filter(|c| !c.trim().is_empty());
        self
    }

    /// Returns the search URL for a query.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/api/search/filter?q={}&limit={}",
            self.api_base,
            urlencoding::encode(query),
            self.page_size
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![
            ("Origin", SHWAPNO_ORIGIN),
            ("Referer", "https://www.shwapno.com/"),
            ("Content-Type", "application/json"),
        ];
        if let Some(cookie) = &self.cookie {
            headers.push(("Cookie", cookie.as_str()));
        }
        headers
    }

    async fn search(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError> {
        let headers = self.headers();
        let body = self.client.get_json(&self.search_url(query), &headers).await?;

        let Some(candidates) = body.as_array() else {
            warn!("Unexpected Shwapno search response structure");
            return Ok(Vec::new());
        };

        debug!("Shwapno search returned {} candidates", candidates.len());

        let detail_url = format!("{}/api/product", self.api_base);
        let mut results = Vec::new();

        for candidate in candidates.iter().take(self.page_size) {
            let Some(product_id) = candidate_id(candidate) else {
                debug!("Skipping Shwapno candidate without an id");
                continue;
            };

            let detail = self
                .client
                .post_json(&detail_url, &json!({ "productId": product_id }), &headers)
                .await?;

            results.push(detail_to_raw(&detail, product_id));
        }

        Ok(results)
    }
}

/// Returns `productId`, falling back to `id`. Either may be a string or number.
fn candidate_id(candidate: &Value) -> Option<&Value> {
    ["productId", "id"].into_iter().filter_map(|key| candidate.get(key)).find(|id| match id {
        Value::String(s) => !s.is_empty(),
        Value::Number(_) => true,
        _ => false,
    })
}

fn detail_to_raw(detail: &Value, requested_id: &Value) -> RawDeal {
    let product_id = json_text(detail.get("productId")).or_else(|| json_text(Some(requested_id)));

    RawDeal {
        title: json_text(detail.pointer("/picture/title")),
        price: json_text(detail.pointer("/price/price")),
        old_price: json_text(detail.pointer("/price/oldPrice")),
        image: json_text(detail.pointer("/picture/largeDeviceUrl/imageUrl"))
            .map(|src| on_origin(SHWAPNO_ORIGIN, &src)),
        stock: json_text(detail.get("stockAvailability")),
        unit: json_text(detail.get("unit")),
        link: product_id.map(|id| format!("{}/product/{}", SHWAPNO_ORIGIN, id)),
    }
}

#[async_trait]
impl DealSource for ShwapnoApiSource {
    async fn fetch(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError> {
        info!("Searching Shwapno: {}", query);
        match self.search(query).await {
            Ok(products) => Ok(products),
            Err(e) => {
                error!("Shwapno API failed: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn source(&self) -> Source {
        Source::ShwapnoApi
    }
}
