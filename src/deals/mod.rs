//! Storefront adapters, record normalization and source dispatch.

pub mod adapters;
pub mod browser;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod selectors;
pub mod sources;

pub use adapters::DealSource;
pub use browser::{Browser, RenderRequest, RenderedPage, WebDriverBrowser};
pub use client::ApiClient;
pub use dispatcher::{DealsOutcome, Dispatcher, SourceTable};
pub use error::ScrapeError;
pub use models::{Deal, RawDeal};
pub use parser::Parser;
pub use sources::{DarazRegion, Source};
