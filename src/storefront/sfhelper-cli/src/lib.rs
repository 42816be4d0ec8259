//! CLI for storefront: browse the product catalog from a terminal.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sfhelper_catalog::{CatalogSource, DEFAULT_API_URL, ListQuery, RemoteCatalog};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

mod fetch;
mod logging;
mod plain;
mod screens;
mod state;
mod tui;

pub mod router;

pub use router::{Route, RouteParams};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(version, about = "Browse the product catalog from your terminal", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the product API
    #[arg(long, env = "STOREFRONT_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Read products from a local directory (products.json, products/<id>.json)
    /// instead of the API
    #[arg(long, global = true)]
    pub catalog_source: Option<PathBuf>,

    /// Ask the API to delay each response by this many milliseconds
    #[arg(long, env = "STOREFRONT_DELAY_MS", global = true)]
    pub delay: Option<u64>,

    /// HTTP timeout in seconds
    #[arg(long, env = "STOREFRONT_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Milliseconds between carousel slides
    #[arg(
        long,
        default_value_t = 3000,
        value_parser = clap::value_parser!(u64).range(100..),
        global = true
    )]
    pub carousel_interval: u64,

    /// Print the screen as plain text instead of starting the TUI
    #[arg(long, global = true)]
    pub plain: bool,

    /// Write logs to this file
    #[arg(long, env = "STOREFRONT_LOG", global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// `--catalog-source` takes precedence over `--api-url`.
    pub fn catalog_source(&self) -> CatalogSource {
        match &self.catalog_source {
            Some(dir) => CatalogSource::Local(dir.clone()),
            None => CatalogSource::Remote(RemoteCatalog {
                base_url: self.api_url.clone(),
                delay_ms: self.delay,
                timeout: Duration::from_secs(self.timeout),
            }),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the product list (the default)
    List,

    /// Show one product
    Show {
        /// Product id
        id: String,
    },

    /// Open a route path, e.g. /products or /product-details/5
    Open {
        /// Route path
        path: String,
    },
}

impl Commands {
    /// The route path this command starts at.
    pub fn start_path(&self) -> String {
        match self {
            Commands::List => Route::Products.to_string(),
            Commands::Show { id } => Route::product_details(id.as_str()).to_string(),
            Commands::Open { path } => path.clone(),
        }
    }
}

/// Main entry point for the CLI.
pub fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let Cli { global, command } = cli;
    let path = command.unwrap_or(Commands::List).start_path();
    let interactive = !global.plain && std::io::stdout().is_terminal();

    logging::init(
        logging::LogTarget::choose(global.log_file.as_deref(), global.verbose, interactive),
        global.verbose,
    )?;

    let source = global.catalog_source();
    debug!(?source, %path, interactive, "starting");

    let query = ListQuery::default();
    if interactive {
        tui::run(
            source,
            &path,
            tui::TuiOptions {
                query,
                carousel_interval: Duration::from_millis(global.carousel_interval),
            },
        )
    } else {
        plain::run(&source, &path, &query)
    }
}
