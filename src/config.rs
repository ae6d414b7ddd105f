//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::deals::sources::Source;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Query used when a request carries none
    #[serde(default = "default_query")]
    pub default_query: String,

    /// Source used when the selector is absent or unrecognized
    #[serde(default)]
    pub default_source: Source,

    /// WebDriver endpoint for browser-rendered sources
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Captured Shwapno session cookies (JSON array)
    #[serde(default = "default_cookies_path")]
    pub cookies_path: PathBuf,

    /// Debug screenshot written after each Shwapno page render
    #[serde(default = "default_screenshot_path")]
    pub screenshot_path: Option<PathBuf>,

    /// Shwapno page scraped when the query is not a path
    #[serde(default = "default_shwapno_page_path")]
    pub shwapno_page_path: String,

    /// Number of Shwapno search candidates resolved per query
    #[serde(default = "default_shwapno_page_size")]
    pub shwapno_page_size: usize,

    /// Raw `Cookie` header sent to the Shwapno API
    #[serde(default)]
    pub shwapno_cookie: Option<String>,

    /// Budget in seconds for one browser render, all navigations included
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on one source call in seconds
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_query() -> String {
    "discount".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_cookies_path() -> PathBuf {
    PathBuf::from("cookies.json")
}

fn default_screenshot_path() -> Option<PathBuf> {
    Some(PathBuf::from("shwapno_debug.png"))
}

fn default_shwapno_page_path() -> String {
    "/new-alu".to_string()
}

fn default_shwapno_page_size() -> usize {
    10
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_source_timeout_secs() -> u64 {
    45
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_query: default_query(),
            default_source: Source::default(),
            webdriver_url: default_webdriver_url(),
            cookies_path: default_cookies_path(),
            screenshot_path: default_screenshot_path(),
            shwapno_page_path: default_shwapno_page_path(),
            shwapno_page_size: default_shwapno_page_size(),
            shwapno_cookie: None,
            navigation_timeout_secs: default_navigation_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            source_timeout_secs: default_source_timeout_secs(),
            proxy: None,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("deal-scout").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparseable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                self.host = host;
            }
        }

        if let Ok(url) = std::env::var("DEALS_WEBDRIVER_URL") {
            self.webdriver_url = url;
        }

        if let Ok(path) = std::env::var("DEALS_COOKIES_PATH") {
            self.cookies_path = PathBuf::from(path);
        }

        if let Ok(cookie) = std::env::var("DEALS_SHWAPNO_COOKIE") {
            self.shwapno_cookie = Some(cookie);
        }

        if let Ok(proxy) = std::env::var("DEALS_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(source) = std::env::var("DEALS_DEFAULT_SOURCE") {
            if let Ok(s) = source.parse() {
                self.default_source = s;
            }
        }

        self
    }

    /// Returns `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
