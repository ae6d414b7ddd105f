//! Shwapno product page, rendered with a captured session.

use super::DealSource;
use crate::deals::browser::{load_session_cookies, Browser, RenderRequest};
use crate::deals::error::ScrapeError;
use crate::deals::models::RawDeal;
use crate::deals::parser::Parser;
use crate::deals::sources::Source;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::shwapno_api::SHWAPNO_ORIGIN;

/// Product page scraped when the query is not a path.
pub const DEFAULT_PRODUCT_PATH: &str = "/new-alu";

/// Adapter for a single Shwapno product page.
///
/// The query selects the page when it is a path (`/new-alu`); any other
/// query falls back to the configured default page. Failures are raised.
pub struct ShwapnoPageSource {
    browser: Arc<dyn Browser>,
    cookies_path: PathBuf,
    navigation_timeout: Duration,
    default_path: String,
    screenshot_path: Option<PathBuf>,
    base_url: String,
}

impl ShwapnoPageSource {
    /// Creates an adapter that loads session cookies from `cookies_path`.
    pub fn new(
        browser: Arc<dyn Browser>,
        cookies_path: impl Into<PathBuf>,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            browser,
            cookies_path: cookies_path.into(),
            navigation_timeout,
            default_path: DEFAULT_PRODUCT_PATH.to_string(),
            screenshot_path: None,
            base_url: SHWAPNO_ORIGIN.to_string(),
        }
    }

    /// Sets the page scraped for non-path queries.
    pub fn with_default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = path.into();
        self
    }

    /// Writes a debug screenshot of every rendered page to `path`.
    pub fn with_screenshot(mut self, path: Option<PathBuf>) -> Self {
        self.screenshot_path = path;
        self
    }

    /// Overrides the storefront base URL (for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the page URL for a query.
    pub fn page_url(&self, query: &str) -> String {
        let query = query.trim();
        let path = if query.starts_with('/') { query } else { self.default_path.as_str() };
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl DealSource for ShwapnoPageSource {
    async fn fetch(&self, query: &str) -> Result<Vec<RawDeal>, ScrapeError> {
        let url = self.page_url(query);
        let cookies = load_session_cookies(&self.cookies_path).await?;
        info!("Loading {} cookies and scraping: {}", cookies.len(), url);

        let request = RenderRequest {
            url,
            timeout: self.navigation_timeout,
            wait_for: None,
            cookies,
            screenshot: self.screenshot_path.clone(),
        };
        let page = self.browser.render(&request).await?;

        let product = Parser::new(&self.base_url).parse_shwapno_product(&page.html, &page.url);
        info!("Scraped product: {:?}", product.title);

        Ok(vec![product])
    }

    fn source(&self) -> Source {
        Source::ShwapnoPage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deals::browser::RenderedPage;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    const PRODUCT_HTML: &str = r#"
        <html><body>
            <img src="https://cdn.shwapno.com/alu.jpg">
            <h1>Potato Diamond</h1>
            <div class="price"><span>৳ 55</span></div>
            <span class="product-unit">per kg</span>
        </body></html>
    "#;

    struct MockBrowser {
        html: String,
        final_url: Option<String>,
        requests: Mutex<Vec<RenderRequest>>,
    }

    impl MockBrowser {
        fn new(html: &str) -> Self {
            Self { html: html.to_string(), final_url: None, requests: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl Browser for MockBrowser {
        async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, ScrapeError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(RenderedPage {
                html: self.html.clone(),
                url: self.final_url.clone().unwrap_or_else(|| request.url.clone()),
            })
        }
    }

    struct FailingBrowser;

    #[async_trait]
    impl Browser for FailingBrowser {
        async fn render(&self, _request: &RenderRequest) -> Result<RenderedPage, ScrapeError> {
            Err(ScrapeError::Timeout { what: "navigation".to_string(), seconds: 30 })
        }
    }

    fn cookie_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"name": "cuid", "value": "abc", "domain": "www.shwapno.com", "path": "/"}}]"#)
            .unwrap();
        file
    }

    #[test]
    fn test_page_url() {
        let source = ShwapnoPageSource::new(Arc::new(FailingBrowser), "c.json", Duration::from_secs(30));
        assert_eq!(source.page_url("/chinigura-rice"), "https://www.shwapno.com/chinigura-rice");
        assert_eq!(source.page_url("rice"), "https://www.shwapno.com/new-alu");
        assert_eq!(source.page_url(""), "https://www.shwapno.com/new-alu");

        let source = source.with_default_path("/egg");
        assert_eq!(source.page_url("discount"), "https://www.shwapno.com/egg");
    }

    #[tokio::test]
    async fn test_fetch_single_product_with_cookies() {
        let cookies = cookie_file();
        let browser = Arc::new(MockBrowser::new(PRODUCT_HTML));
        let source = ShwapnoPageSource::new(browser.clone(), cookies.path(), Duration::from_secs(30))
            .with_screenshot(Some(PathBuf::from("shwapno_debug.png")));

        let raws = source.fetch("/new-alu").await.unwrap();
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].title.as_deref(), Some("Potato Diamond"));
        assert_eq!(raws[0].price.as_deref(), Some("৳ 55"));
        assert_eq!(raws[0].unit.as_deref(), Some("per kg"));
        assert_eq!(raws[0].image.as_deref(), Some("https://cdn.shwapno.com/alu.jpg"));
        assert_eq!(raws[0].link.as_deref(), Some("https://www.shwapno.com/new-alu"));

        let requests = browser.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].cookies.len(), 1);
        assert_eq!(requests[0].cookies[0].name, "cuid");
        assert_eq!(requests[0].screenshot, Some(PathBuf::from("shwapno_debug.png")));
    }

    #[tokio::test]
    async fn test_fetch_link_is_final_url() {
        let cookies = cookie_file();
        let mut browser = MockBrowser::new(PRODUCT_HTML);
        browser.final_url = Some("https://www.shwapno.com/new-alu?ref=redirect".to_string());
        let source = ShwapnoPageSource::new(Arc::new(browser), cookies.path(), Duration::from_secs(30));

        let raws = source.fetch("/new-alu").await.unwrap();
        assert_eq!(raws[0].link.as_deref(), Some("https://www.shwapno.com/new-alu?ref=redirect"));
    }

    #[tokio::test]
    async fn test_fetch_missing_cookie_file_is_raised() {
        let browser = Arc::new(MockBrowser::new(PRODUCT_HTML));
        let source = ShwapnoPageSource::new(browser.clone(), "/nonexistent/cookies.json", Duration::from_secs(30));

        let err = source.fetch("/new-alu").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Session { .. }));
        assert!(browser.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_navigation_failure_is_raised() {
        let cookies = cookie_file();
        let source = ShwapnoPageSource::new(Arc::new(FailingBrowser), cookies.path(), Duration::from_secs(30));

        let err = source.fetch("/new-alu").await.unwrap_err();
        assert!(err.is_timeout());
    }
}
