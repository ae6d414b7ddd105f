//! CLI command implementations.

pub mod search;
pub mod serve;

pub use search::SearchCommand;
pub use serve::ServeCommand;

use crate::config::Config;
use crate::deals::{ApiClient, Dispatcher, SourceTable, WebDriverBrowser};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Wires the live HTTP client and WebDriver browser into a dispatcher.
pub fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let client = ApiClient::new(config).context("Failed to create HTTP client")?;
    let browser = WebDriverBrowser::new(config.webdriver_url.clone());
    let table = SourceTable::standard(config, Arc::new(client), Arc::new(browser));

    Ok(Dispatcher::from_config(config, table))
}
