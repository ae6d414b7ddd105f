//! Daraz catalog search, rendered in a browser.

use super::DealSource;
use crate::deals::browser::{Browser, RenderRequest};
use crate::deals::error::ScrapeError;
use crate::deals::models::RawDeal;
use crate::deals::parser::Parser;
use crate::deals::selectors::daraz;
use crate::deals::sources::{DarazRegion, Source};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Adapter for one Daraz regional storefront.
pub struct DarazSource {
    browser: Arc<dyn Browser>,
    region: DarazRegion,
    navigation_timeout: Duration,
    base_url: Option<String>,
}

impl DarazSource {
    /// Creates an adapter for `region`.
    pub fn new(region: DarazRegion, browser: Arc<dyn Browser>, navigation_timeout: Duration) -> Self {
        Self { browser, region, navigation_timeout, base_url: None }
    }

    /// Overrides the storefront base URL (for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| self.region.base_url())
    }

    /// Returns the catalog search URL for a query.
    pub fn search_url(&self, query: &str) -> String {
        format!("{}/catalog/?q={}", self.base_url(), urlencoding::encode(query))
    }
}

#[async_trait]
impl DealSource for DarazSource {
    async fn fetch(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError> {
        let url = self.search_url(query);
        info!("Scraping: {}", url);

        let mut request = RenderRequest::new(&url, self.navigation_timeout);
        request.wait_for = Some(daraz::CARD_MARKER.to_string());

        let page = match self.browser.render(&request).await {
            Ok(page) => page,
            Err(e) if e.is_timeout() => {
                warn!("Daraz {} did not load in time: {}", self.region.code(), e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let cards = Parser::new(self.base_url()).parse_daraz_cards(&page.html);
        if cards.is_empty() {
            warn!("No product cards found on {}", page.url);
        }

        Ok(cards)
    }

    fn source(&self) -> Source {
        Source::Daraz(self.region)
    }
}
