//! deal-scout - Grocery and marketplace deal aggregator

use anyhow::Result;
use clap::{Parser, Subcommand};
use deal_scout::commands::{SearchCommand, ServeCommand};
use deal_scout::config::{Config, OutputFormat};
use deal_scout::deals::Source;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "deal-scout",
    version,
    about = "Deal aggregator for Daraz, Chaldal and Shwapno",
    long_about = "Searches South Asian storefronts and returns normalized deals, from the CLI or an HTTP API."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// WebDriver endpoint (e.g., http://localhost:9515)
    #[arg(long, global = true, env = "DEALS_WEBDRIVER_URL")]
    webdriver: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "DEALS_PROXY")]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the deals HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,
    },

    /// Search one source for deals
    #[command(alias = "s")]
    Search {
        /// Search query (a page path like /new-alu for shwapno-page)
        query: String,

        /// Source code (bd, pk, lk, mm, np, chaldal, shwapno, shwapno-page)
        #[arg(short, long)]
        source: Option<String>,

        /// Query every source instead of one
        #[arg(long, conflicts_with = "source")]
        all: bool,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// List supported sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(url) = cli.webdriver {
        config.webdriver_url = url;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }

            ServeCommand::new(config).execute().await?;
        }

        Commands::Search { query, source, all, format } => {
            if let Some(format) = format {
                config.format = format;
            }

            let cmd = SearchCommand::new(config);
            let output = if all {
                cmd.execute_all(&query).await?
            } else {
                cmd.execute(&query, source.as_deref()).await?
            };
            println!("{}", output);
        }

        Commands::Sources => {
            println!("Supported sources:\n");
            println!("{:<14} {:<24} {:<18} {:<8}", "Code", "Name", "Host", "Browser");
            println!("{:-<14} {:-<24} {:-<18} {:-<8}", "", "", "", "");

            for source in Source::all() {
                println!(
                    "{:<14} {:<24} {:<18} {:<8}",
                    source.to_string(),
                    source.name(),
                    source.host(),
                    if source.requires_browser() { "yes" } else { "no" }
                );
            }
        }
    }

    Ok(())
}
