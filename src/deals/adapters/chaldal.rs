//! Chaldal product search API.

use super::{json_text, on_origin, DealSource};
use crate::deals::client::ApiClient;
use crate::deals::error::ScrapeError;
use crate::deals::models::RawDeal;
use crate::deals::sources::Source;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Public storefront origin; product links are built from it.
pub const CHALDAL_ORIGIN: &str = "https://chaldal.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<ChaldalProduct>,
}

#[derive(Debug, Deserialize)]
struct ChaldalProduct {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    stock: Option<Value>,
    #[serde(default)]
    url: Option<String>,
}

/// Adapter for the Chaldal search endpoint.
///
/// Never raises: every failure is logged and reported as no results.
pub struct ChaldalSource {
    client: Arc<ApiClient>,
    api_base: String,
}

impl ChaldalSource {
    /// Creates an adapter talking to the live API.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_base_url(client, CHALDAL_ORIGIN)
    }

    /// Creates an adapter with a custom API base URL (for testing).
    pub fn with_base_url(client: Arc<ApiClient>, api_base: impl Into<String>) -> Self {
        Self { client, api_base: api_base.into() }
    }

    /// Returns the search URL for a query.
    pub fn search_url(&self, query: &str) -> String {
        format!("{}/rest/V1/search/products?q={}", self.api_base, urlencoding::encode(query))
    }

    async fn search(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError> {
        let url = self.search_url(query);
        let body = self.client.get_json(&url, &[]).await?;

        let response: SearchResponse = serde_json::from_value(body)
            .map_err(|e| ScrapeError::Decode { url: url.clone(), reason: e.to_string() })?;

        Ok(response.products.into_iter().map(to_raw).collect())
    }
}

fn to_raw(product: ChaldalProduct) -> RawDeal {
    RawDeal {
        title: product.name,
        price: json_text(product.price.as_ref()),
        image: product.image.map(|src| on_origin(CHALDAL_ORIGIN, &src)),
        stock: json_text(product.stock.as_ref()),
        link: product.url.map(|path| product_link(&path)),
        ..RawDeal::default()
    }
}

/// Product URLs come back as storefront paths, with or without the leading slash.
fn product_link(path: &str) -> String {
    let path = path.trim();
    if path.contains("://") || path.starts_with("//") {
        path.to_string()
    } else {
        format!("{}/{}", CHALDAL_ORIGIN, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DealSource for ChaldalSource {
    async fn fetch(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError> {
        info!("Searching Chaldal: {}", query);
        match self.search(query).await {
            Ok(products) => Ok(products),
            Err(e) => {
                error!("Failed to scrape Chaldal: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn source(&self) -> Source {
        Source::Chaldal
    }
}
