//! Search command implementation.

use super::build_dispatcher;
use crate::config::Config;
use crate::deals::Dispatcher;
use crate::format::Formatter;
use anyhow::{bail, Result};
use tracing::info;

/// Runs one query against a source, or against all of them.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, query: &str, source: Option<&str>) -> Result<String> {
        let dispatcher = build_dispatcher(&self.config)?;
        self.execute_with_dispatcher(&dispatcher, query, source).await
    }

    /// Queries every registered source and returns formatted output.
    pub async fn execute_all(&self, query: &str) -> Result<String> {
        let dispatcher = build_dispatcher(&self.config)?;
        self.execute_all_with_dispatcher(&dispatcher, query).await
    }

    /// Executes the search with a provided dispatcher (for testing).
    pub async fn execute_with_dispatcher(
        &self,
        dispatcher: &Dispatcher,
        query: &str,
        source: Option<&str>,
    ) -> Result<String> {
        let outcome = dispatcher.get_deals(Some(query), source).await;

        if let Some(failure) = outcome.failure {
            bail!("Failed to scrape {}: {}", outcome.source, failure);
        }

        info!("Found {} deals on {}", outcome.deals.len(), outcome.source.name());

        Ok(Formatter::new(self.config.format).format_deals(&outcome.deals))
    }

    /// Fans out with a provided dispatcher (for testing).
    pub async fn execute_all_with_dispatcher(
        &self,
        dispatcher: &Dispatcher,
        query: &str,
    ) -> Result<String> {
        let sources = dispatcher.table().sources();
        let outcomes = dispatcher.get_deals_from(Some(query), &sources).await;

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        info!("Queried {} sources, {} failed", outcomes.len(), failed);

        Ok(Formatter::new(self.config.format).format_outcomes(&outcomes))
    }
}
