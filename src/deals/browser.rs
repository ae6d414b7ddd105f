//! Rendering capability for client-rendered storefronts.
//!
//! Adapters describe what they need as a [`RenderRequest`] and get back the
//! final markup; extraction happens on that markup with `scraper`, so it can
//! be tested against fixtures without a browser.

use crate::deals::error::ScrapeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thirtyfour::prelude::*;
use thirtyfour::Cookie;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default desktop Chrome user agent presented by the browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// What to render and how.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub url: String,
    /// Budget for the whole render: every navigation plus the selector wait.
    pub timeout: Duration,
    /// CSS selector to wait for after load. Absence is not an error.
    pub wait_for: Option<String>,
    /// Session cookies installed before navigating to `url`.
    pub cookies: Vec<SessionCookie>,
    /// Where to write a debug screenshot, if anywhere.
    pub screenshot: Option<PathBuf>,
}

impl RenderRequest {
    /// Creates a plain request with no cookies, wait or screenshot.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout, wait_for: None, cookies: Vec::new(), screenshot: None }
    }
}

/// A fully rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    /// URL after redirects.
    pub url: String,
}

/// Trait for page rendering - enables mocking for tests.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigates to the request URL and returns the rendered page.
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, ScrapeError>;
}

/// One cookie from an exported browser session (`cookies.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Unix seconds; `-1` marks a session cookie.
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub secure: Option<bool>,
}

impl SessionCookie {
    fn to_webdriver(&self) -> Cookie {
        let mut cookie = Cookie::new(self.name.clone(), self.value.clone());
        cookie.domain = self.domain.clone();
        cookie.path = self.path.clone();
        cookie.secure = self.secure;
        cookie.http_only = self.http_only;
        cookie.expiry = self.expires.filter(|e| *e > 0.0).map(|e| e as i64);
        cookie
    }
}

/// Reads a JSON array of session cookies.
pub async fn load_session_cookies(path: &Path) -> Result<Vec<SessionCookie>, ScrapeError> {
    let session_error = |reason: String| ScrapeError::Session { path: path.display().to_string(), reason };

    let content = tokio::fs::read_to_string(path).await.map_err(|e| session_error(e.to_string()))?;
    let cookies: Vec<SessionCookie> =
        serde_json::from_str(&content).map_err(|e| session_error(e.to_string()))?;

    debug!("Loaded {} session cookies from {}", cookies.len(), path.display());
    Ok(cookies)
}

/// Renders pages in headless Chrome through a WebDriver server (chromedriver).
///
/// Every render opens its own browser session and closes it afterwards.
pub struct WebDriverBrowser {
    server_url: String,
    user_agent: String,
}

impl WebDriverBrowser {
    /// Creates a browser backed by the WebDriver server at `server_url`.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self { server_url: server_url.into(), user_agent: DEFAULT_USER_AGENT.to_string() }
    }

    /// Overrides the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn connect(&self) -> Result<WebDriver, ScrapeError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless().map_err(browser_error)?;
        caps.set_no_sandbox().map_err(browser_error)?;
        caps.add_arg("--disable-setuid-sandbox").map_err(browser_error)?;
        caps.add_arg("--disable-gpu").map_err(browser_error)?;
        caps.add_arg(&format!("--user-agent={}", self.user_agent)).map_err(browser_error)?;

        debug!("Opening WebDriver session at {}", self.server_url);
        WebDriver::new(&self.server_url, caps).await.map_err(|e| {
            ScrapeError::Browser(format!("could not start session at {}: {}", self.server_url, e))
        })
    }

    async fn drive(&self, driver: &WebDriver, request: &RenderRequest) -> Result<RenderedPage, ScrapeError> {
        let deadline = Instant::now() + request.timeout;

        if !request.cookies.is_empty() {
            // WebDriver only accepts cookies for the document currently loaded
            navigate(driver, &origin_of(&request.url), deadline, request.timeout).await?;
            for cookie in &request.cookies {
                driver.add_cookie(cookie.to_webdriver()).await.map_err(browser_error)?;
            }
            debug!("Installed {} session cookies", request.cookies.len());
        }

        navigate(driver, &request.url, deadline, request.timeout).await?;

        if let Some(selector) = &request.wait_for {
            let found = poll_until(deadline, || async move {
                driver.find_all(By::Css(selector.as_str())).await.is_ok_and(|e| !e.is_empty())
            })
            .await;
            if !found {
                debug!("'{}' did not appear within {:?}", selector, request.timeout);
            }
        }

        if let Some(path) = &request.screenshot {
            match driver.screenshot(path).await {
                Ok(()) => info!("Saved debug screenshot to {}", path.display()),
                Err(e) => warn!("Failed to save screenshot to {}: {}", path.display(), e),
            }
        }

        let html = driver.source().await.map_err(browser_error)?;
        let url = driver.current_url().await.map_err(browser_error)?.to_string();

        Ok(RenderedPage { html, url })
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, ScrapeError> {
        let driver = self.connect().await?;
        let result = self.drive(&driver, request).await;

        if let Err(e) = driver.quit().await {
            warn!("Failed to close browser session: {}", e);
        }

        result
    }
}

/// Navigates within whatever is left of the render budget.
async fn navigate(
    driver: &WebDriver,
    url: &str,
    deadline: Instant,
    budget: Duration,
) -> Result<(), ScrapeError> {
    debug!("Navigating to {}", url);
    match tokio::time::timeout_at(deadline, driver.goto(url)).await {
        Ok(result) => result.map_err(browser_error),
        Err(_) => Err(ScrapeError::Timeout {
            what: format!("navigation to {}", url),
            seconds: budget.as_secs(),
        }),
    }
}

/// Re-runs `check` every 250ms until it succeeds or `deadline` passes.
async fn poll_until<F, Fut>(deadline: Instant, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    loop {
        if check().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep_until(deadline.min(Instant::now() + Duration::from_millis(250))).await;
    }
}

/// Returns `scheme://host` of a URL, or the URL itself if it has no path.
fn origin_of(url: &str) -> String {
    match url.find("://") {
        Some(scheme_end) => {
            let host_start = scheme_end + 3;
            match url[host_start..].find('/') {
                Some(path_start) => url[..host_start + path_start].to_string(),
                None => url.to_string(),
            }
        }
        None => url.to_string(),
    }
}

fn browser_error(e: WebDriverError) -> ScrapeError {
    ScrapeError::Browser(e.to_string())
}
