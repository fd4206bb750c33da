// Copyright 2026 Pricewatch Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod cli;
mod config;
mod db;
mod deals;
mod error;
mod extraction;
mod monitor;
mod normalize;
mod scrape;
mod stats;
mod stores;

use config::Settings;

#[derive(Parser)]
#[command(
    name = "pricewatch",
    about = "Pricewatch — track supermarket prices and flag statistically significant deals",
    version,
    after_help = "Run 'pricewatch <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    InitDb,
    /// Add a product to monitor
    Add {
        /// Product URL (Amazon, Carrefour or Zaffari)
        url: String,
        /// Target price (e.g. "80,99" or "80.99")
        target_price: String,
    },
    /// List all monitored products
    List,
    /// Check target hits and σ deal signals (no network)
    Check,
    /// Re-scrape prices for all active products
    Update,
    /// Ranked best-deals view (2σ drops across all windows)
    Deals,
    /// Show triggered alerts
    Alerts,
    /// Show price history for a product
    History {
        /// Product ID
        product_id: i64,
        /// Lookback window in days
        #[arg(long, default_value = "30")]
        days: u32,
    },
    /// Show detailed product information
    Detail {
        /// Product ID
        product_id: i64,
    },
    /// Remove a product from monitoring
    Remove {
        /// Product ID
        product_id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Global flags travel as environment variables so every module can
    // check them without a context struct.
    if cli.json {
        std::env::set_var("PRICEWATCH_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("PRICEWATCH_QUIET", "1");
    }
    if cli.no_color {
        std::env::set_var("PRICEWATCH_NO_COLOR", "1");
    }

    let default_directive = if cli.verbose {
        "pricewatch=debug"
    } else {
        "pricewatch=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env();

    let result = match cli.command {
        Commands::InitDb => {
            let _ = db::Database::open(&settings.db_path)?;
            if !cli::output::is_quiet() {
                println!("  Database initialized at {}", settings.db_path.display());
            }
            Ok(())
        }
        Commands::Add { url, target_price } => {
            cli::add_cmd::run(&settings, &url, &target_price).await
        }
        Commands::List => cli::list_cmd::run(&settings).await,
        Commands::Check => cli::check_cmd::run(&settings).await,
        Commands::Update => cli::update_cmd::run(&settings).await,
        Commands::Deals => cli::deals_cmd::run(&settings).await,
        Commands::Alerts => cli::alerts_cmd::run(&settings).await,
        Commands::History { product_id, days } => {
            cli::history_cmd::run(&settings, product_id, days).await
        }
        Commands::Detail { product_id } => cli::detail_cmd::run(&settings, product_id).await,
        Commands::Remove { product_id, yes } => {
            cli::remove_cmd::run(&settings, product_id, yes).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pricewatch", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error.
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
