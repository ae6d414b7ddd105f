//! Routes a query to one adapter and normalizes what it returns.

use crate::config::Config;
use crate::deals::adapters::{
    ChaldalSource, DarazSource, DealSource, ShwapnoApiSource, ShwapnoPageSource,
};
use crate::deals::browser::Browser;
use crate::deals::client::ApiClient;
use crate::deals::models::Deal;
use crate::deals::normalize::normalize_all;
use crate::deals::sources::{DarazRegion, Source};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Query used when the caller sends none.
pub const DEFAULT_QUERY: &str = "discount";

/// Upper bound on a single adapter call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(45);

/// Immutable selector → adapter table.
pub struct SourceTable {
    adapters: HashMap<Source, Arc<dyn DealSource>>,
    default_source: Source,
}

impl SourceTable {
    /// Creates an empty table falling back to `default_source`.
    pub fn new(default_source: Source) -> Self {
        Self { adapters: HashMap::new(), default_source }
    }

    /// Builds the table with every known source registered.
    pub fn standard(config: &Config, client: Arc<ApiClient>, browser: Arc<dyn Browser>) -> Self {
        let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs);

        let mut table = Self::new(config.default_source);
        for region in DarazRegion::all() {
            table = table.with(Arc::new(DarazSource::new(*region, browser.clone(), navigation_timeout)));
        }

        table
            .with(Arc::new(ChaldalSource::new(client.clone())))
            .with(Arc::new(
                ShwapnoApiSource::new(client)
                    .with_page_size(config.shwapno_page_size)
                    .with_cookie(config.shwapno_cookie.clone()),
            ))
            .with(Arc::new(
                ShwapnoPageSource::new(browser, config.cookies_path.clone(), navigation_timeout)
                    .with_default_path(config.shwapno_page_path.clone())
                    .with_screenshot(config.screenshot_path.clone()),
            ))
    }

    /// Registers an adapter under the source it reports.
    pub fn with(mut self, adapter: Arc<dyn DealSource>) -> Self {
        self.adapters.insert(adapter.source(), adapter);
        self
    }

    /// Resolves a selector. Absent, blank, unknown or unregistered selectors
    /// resolve to the default source.
    pub fn resolve(&self, selector: Option<&str>) -> Source {
        let Some(selector) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.default_source;
        };

        match selector.parse::<Source>() {
            Ok(source) if self.adapters.contains_key(&source) => source,
            Ok(source) => {
                warn!("No adapter registered for {}, using {}", source, self.default_source);
                self.default_source
            }
            Err(_) => {
                debug!("Unrecognized selector '{}', using {}", selector, self.default_source);
                self.default_source
            }
        }
    }

    /// Returns the adapter for a source.
    pub fn adapter(&self, source: Source) -> Option<&Arc<dyn DealSource>> {
        self.adapters.get(&source)
    }

    /// Returns the default source.
    pub fn default_source(&self) -> Source {
        self.default_source
    }

    /// Returns registered sources in display order.
    pub fn sources(&self) -> Vec<Source> {
        Source::all().iter().copied().filter(|s| self.adapters.contains_key(s)).collect()
    }
}

/// Result of querying one source. Failures never escape as errors.
#[derive(Debug, Clone, Serialize)]
pub struct DealsOutcome {
    pub source: Source,
    pub deals: Vec<Deal>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl DealsOutcome {
    /// Returns true when the adapter failed.
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Picks an adapter per request and normalizes its records.
pub struct Dispatcher {
    table: SourceTable,
    default_query: String,
    deadline: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher over `table`.
    pub fn new(table: SourceTable) -> Self {
        Self { table, default_query: DEFAULT_QUERY.to_string(), deadline: DEFAULT_DEADLINE }
    }

    /// Creates a dispatcher from configuration.
    pub fn from_config(config: &Config, table: SourceTable) -> Self {
        Self::new(table)
            .with_default_query(config.default_query.clone())
            .with_deadline(Duration::from_secs(config.source_timeout_secs))
    }

    /// Sets the query used when none is given.
    pub fn with_default_query(mut self, query: impl Into<String>) -> Self {
        self.default_query = query.into();
        self
    }

    /// Sets the per-call deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns the source table.
    pub fn table(&self) -> &SourceTable {
        &self.table
    }

    /// Queries the source chosen by `selector`.
    pub async fn get_deals(&self, query: Option<&str>, selector: Option<&str>) -> DealsOutcome {
        let query = self.effective_query(query);
        let source = self.table.resolve(selector);
        self.run(query, source).await
    }

    /// Queries several sources concurrently. Each outcome carries its own
    /// failure, so one failing source does not affect the others.
    pub async fn get_deals_from(&self, query: Option<&str>, sources: &[Source]) -> Vec<DealsOutcome> {
        let query = self.effective_query(query);
        join_all(sources.iter().map(|source| self.run(query, *source))).await
    }

    fn effective_query<'a>(&'a self, query: Option<&'a str>) -> &'a str {
        query.map(str::trim).filter(|q| !q.is_empty()).unwrap_or(&self.default_query)
    }

    async fn run(&self, query: &str, source: Source) -> DealsOutcome {
        let Some(adapter) = self.table.adapter(source) else {
            error!("No adapter registered for {}", source);
            return failed(source, format!("no adapter registered for source '{}'", source));
        };

        debug!("Dispatching '{}' to {}", query, source);

        match tokio::time::timeout(self.deadline, adapter.fetch(query)).await {
            Ok(Ok(raws)) => {
                let found = raws.len();
                let deals = normalize_all(raws);
                if deals.is_empty() {
                    warn!("No deals found for region: {}", source);
                } else {
                    info!("{} deals found for region: {} ({} raw)", deals.len(), source, found);
                }
                DealsOutcome { source, deals, failure: None }
            }
            Ok(Err(e)) => {
                error!("Error scraping {}: {}", source, e);
                failed(source, e.to_string())
            }
            Err(_) => {
                error!("Scraping {} exceeded {:?}", source, self.deadline);
                failed(source, format!("timed out after {}s", self.deadline.as_secs()))
            }
        }
    }
}

fn failed(source: Source, message: String) -> DealsOutcome {
    DealsOutcome { source, deals: Vec::new(), failure: Some(message) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deals::error::ScrapeError;
    use crate::deals::models::RawDeal;
    use crate::deals::browser::{RenderRequest, RenderedPage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Stub adapter recording queries.
    struct StubSource {
        source: Source,
        raws: Vec<RawDeal>,
        fail: bool,
        delay: Option<Duration>,
        queries: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(source: Source, raws: Vec<RawDeal>) -> Self {
            Self { source, raws, fail: false, delay: None, queries: Mutex::new(Vec::new()) }
        }

        fn failing(source: Source) -> Self {
            Self { fail: true, ..Self::new(source, Vec::new()) }
        }

        fn slow(source: Source, delay: Duration) -> Self {
            Self { delay: Some(delay), ..Self::new(source, Vec::new()) }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DealSource for StubSource {
        async fn fetch(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError> {
            self.queries.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(ScrapeError::Browser("session not created".to_string()));
            }
            Ok(self.raws.clone())
        }

        fn source(&self) -> Source {
            self.source
        }
    }

    const BD: Source = Source::Daraz(DarazRegion::Bd);

    fn raw(title: &str) -> RawDeal {
        RawDeal::new(title, "৳ 10", "//img/a.jpg", "//daraz.com.bd/p/a")
    }

    #[test]
    fn test_resolve_fallbacks() {
        let table = SourceTable::new(BD)
            .with(Arc::new(StubSource::new(BD, vec![])))
            .with(Arc::new(StubSource::new(Source::Chaldal, vec![])));

        assert_eq!(table.resolve(None), BD);
        assert_eq!(table.resolve(Some("")), BD);
        assert_eq!(table.resolve(Some("   ")), BD);
        assert_eq!(table.resolve(Some("atlantis")), BD);
        assert_eq!(table.resolve(Some("chaldal")), Source::Chaldal);
        // Known source without an adapter falls back too
        assert_eq!(table.resolve(Some("pk")), BD);
    }

    struct NoBrowser;

    #[async_trait]
    impl Browser for NoBrowser {
        async fn render(&self, _request: &RenderRequest) -> Result<RenderedPage, ScrapeError> {
            Err(ScrapeError::Browser("no browser in tests".to_string()))
        }
    }

    #[test]
    fn test_standard_table_registers_all_sources() {
        let config = Config { default_source: Source::Chaldal, ..Config::default() };
        let client = Arc::new(ApiClient::new(&config).unwrap());
        let table = SourceTable::standard(&config, client, Arc::new(NoBrowser));

        assert_eq!(table.sources(), Source::all().to_vec());
        assert_eq!(table.default_source(), Source::Chaldal);
        assert_eq!(table.resolve(Some("shwapno-page")), Source::ShwapnoPage);
        assert_eq!(table.resolve(Some("np")), Source::Daraz(DarazRegion::Np));
        assert_eq!(table.resolve(Some("nowhere")), Source::Chaldal);
    }

    #[test]
    fn test_sources_in_display_order() {
        let table = SourceTable::new(BD)
            .with(Arc::new(StubSource::new(Source::ShwapnoApi, vec![])))
            .with(Arc::new(StubSource::new(Source::Chaldal, vec![])))
            .with(Arc::new(StubSource::new(BD, vec![])));

        assert_eq!(table.sources(), vec![BD, Source::Chaldal, Source::ShwapnoApi]);
        assert_eq!(table.default_source(), BD);
    }

    #[tokio::test]
    async fn test_unrecognized_selector_matches_absent_selector() {
        let daraz = Arc::new(StubSource::new(BD, vec![raw("A")]));
        let chaldal = Arc::new(StubSource::new(Source::Chaldal, vec![raw("C")]));
        let dispatcher = Dispatcher::new(SourceTable::new(BD).with(daraz.clone()).with(chaldal.clone()));

        let absent = dispatcher.get_deals(Some("rice"), None).await;
        let unknown = dispatcher.get_deals(Some("rice"), Some("xx")).await;

        assert_eq!(absent.source, unknown.source);
        assert_eq!(absent.deals, unknown.deals);
        assert_eq!(daraz.queries().len(), 2);
        assert!(chaldal.queries().is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_uses_default() {
        let daraz = Arc::new(StubSource::new(BD, vec![]));
        let dispatcher = Dispatcher::new(SourceTable::new(BD).with(daraz.clone()));

        dispatcher.get_deals(None, None).await;
        dispatcher.get_deals(Some("  "), None).await;
        dispatcher.get_deals(Some(" laptop "), None).await;

        assert_eq!(daraz.queries(), vec!["discount", "discount", "laptop"]);
    }

    #[tokio::test]
    async fn test_custom_default_query() {
        let daraz = Arc::new(StubSource::new(BD, vec![]));
        let dispatcher =
            Dispatcher::new(SourceTable::new(BD).with(daraz.clone())).with_default_query("rice");

        dispatcher.get_deals(None, None).await;
        assert_eq!(daraz.queries(), vec!["rice"]);
    }

    #[tokio::test]
    async fn test_normalizes_and_drops_incomplete() {
        let mut incomplete = raw("B");
        incomplete.image = None;
        let daraz = Arc::new(StubSource::new(BD, vec![raw("A"), incomplete, raw("C")]));
        let dispatcher = Dispatcher::new(SourceTable::new(BD).with(daraz));

        let outcome = dispatcher.get_deals(Some("x"), Some("bd")).await;
        assert!(!outcome.is_failure());
        assert_eq!(outcome.deals.len(), 2);
        assert_eq!(outcome.deals[0].image, "https://img/a.jpg");
        assert_eq!(outcome.deals[1].title, "C");
    }

    #[tokio::test]
    async fn test_empty_result_is_not_failure() {
        let dispatcher = Dispatcher::new(SourceTable::new(BD).with(Arc::new(StubSource::new(BD, vec![]))));

        let outcome = dispatcher.get_deals(Some("x"), None).await;
        assert!(outcome.deals.is_empty());
        assert!(outcome.failure.is_none());
    }

    #[tokio::test]
    async fn test_adapter_error_becomes_failure() {
        let dispatcher = Dispatcher::new(SourceTable::new(BD).with(Arc::new(StubSource::failing(BD))));

        let outcome = dispatcher.get_deals(Some("x"), None).await;
        assert!(outcome.is_failure());
        assert!(outcome.deals.is_empty());
        assert!(outcome.failure.unwrap().contains("session not created"));
    }

    #[tokio::test]
    async fn test_deadline_becomes_failure() {
        let slow = Arc::new(StubSource::slow(BD, Duration::from_secs(5)));
        let dispatcher = Dispatcher::new(SourceTable::new(BD).with(slow))
            .with_deadline(Duration::from_millis(50));

        let started = std::time::Instant::now();
        let outcome = dispatcher.get_deals(Some("x"), None).await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(outcome.failure.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_missing_default_adapter_is_failure() {
        let dispatcher = Dispatcher::new(SourceTable::new(BD));
        let outcome = dispatcher.get_deals(None, None).await;
        assert!(outcome.failure.unwrap().contains("no adapter"));
    }

    #[tokio::test]
    async fn test_get_deals_from_tolerates_partial_failure() {
        let table = SourceTable::new(BD)
            .with(Arc::new(StubSource::new(BD, vec![raw("A")])))
            .with(Arc::new(StubSource::failing(Source::Chaldal)));
        let dispatcher = Dispatcher::new(table);

        let outcomes = dispatcher.get_deals_from(Some("rice"), &[BD, Source::Chaldal]).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].source, BD);
        assert_eq!(outcomes[0].deals.len(), 1);
        assert!(outcomes[1].is_failure());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = DealsOutcome { source: Source::Chaldal, deals: vec![], failure: None };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["source"], "chaldal");
        assert!(json.get("error").is_none());

        let outcome = failed(Source::ShwapnoApi, "boom".to_string());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "boom");
    }
}
