//! deal-scout - Grocery and marketplace deal aggregator
//!
//! Scrapes Daraz regional storefronts, Chaldal and Shwapno, normalizes the
//! listings into one record shape and serves them over HTTP or the CLI.

pub mod api;
pub mod commands;
pub mod config;
pub mod deals;
pub mod format;

pub use config::Config;
pub use deals::{Deal, DealsOutcome, Dispatcher, Source};
