//! secmaster CLI: refresh, inspect and export the security reference table.
//!
//! Commands:
//! - `refresh` re-ingests one or more markets into the SQLite store
//! - `list` prints a market's security list
//! - `export` writes a market's security list to CSV
//! - `hours` prints a market's trading sessions

mod config;
mod main_lib;

use std::path::PathBuf;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use secmaster_core::{export_csv, MarketKind};

use config::Config;
use main_lib::{build_state, init_tracing, AppState};

#[derive(Parser)]
#[command(name = "secmaster", about = "Security master for CN, HK, US and BSE listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-ingest markets from their upstreams and replace their rows.
    Refresh {
        /// Markets to refresh (cn, hk, us, bse). Defaults to all.
        #[arg(value_parser = parse_market)]
        markets: Vec<MarketKind>,
    },
    /// Print the stored security list of a market.
    List {
        #[arg(value_parser = parse_market)]
        market: MarketKind,

        /// Print at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Write the security list of a market to a CSV file.
    Export {
        #[arg(value_parser = parse_market)]
        market: MarketKind,

        /// Destination file.
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Print the trading sessions of a market and whether it is open now.
    Hours {
        #[arg(value_parser = parse_market)]
        market: MarketKind,
    },
}

fn parse_market(raw: &str) -> Result<MarketKind, String> {
    raw.parse::<MarketKind>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config.log_format);
    for fallback in &config.fallbacks {
        tracing::warn!("{}", fallback);
    }

    let state = build_state(&config)?;
    match cli.command {
        Commands::Refresh { markets } => refresh(&state, markets).await,
        Commands::List { market, limit } => list(&state, market, limit).await,
        Commands::Export { market, output } => export(&state, market, output).await,
        Commands::Hours { market } => hours(market),
    }
}

async fn refresh(state: &AppState, markets: Vec<MarketKind>) -> anyhow::Result<()> {
    let markets = if markets.is_empty() {
        MarketKind::ALL.to_vec()
    } else {
        markets
    };

    let mut failed = Vec::new();
    for kind in markets {
        let market = state.market(kind)?;
        match market.refresh().await {
            Ok(table) => {
                let rows = market.security_list().await?.len();
                tracing::info!(market = %kind, table = %table, rows, "market refreshed");
            }
            Err(e) => {
                tracing::error!(
                    market = %kind,
                    retry = ?e.retry_class(),
                    error = %e,
                    "market refresh failed"
                );
                failed.push(kind);
            }
        }
    }

    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(MarketKind::as_str).collect();
        bail!("refresh failed for: {}", names.join(", "));
    }
    Ok(())
}

async fn list(state: &AppState, kind: MarketKind, limit: Option<usize>) -> anyhow::Result<()> {
    let list = state.market(kind)?.security_list().await?;
    let shown = limit.unwrap_or(list.len());
    for record in list.iter().take(shown) {
        println!("{}\t{}\t{}\t{}", record.exchange, record.code, record.board, record.name);
    }
    println!("{} of {} securities, loaded {}", shown.min(list.len()), list.len(), list.loaded_at());
    Ok(())
}

async fn export(state: &AppState, kind: MarketKind, output: PathBuf) -> anyhow::Result<()> {
    let list = state.market(kind)?.security_list().await?;
    let written = export_csv(&list, &output)?;
    tracing::info!(market = %kind, rows = written, path = %output.display(), "exported");
    Ok(())
}

fn hours(kind: MarketKind) -> anyhow::Result<()> {
    let hours = kind.trading_hours();
    let state = if hours.is_open_at(Utc::now()) { "open" } else { "closed" };
    println!("{}: {} ({})", kind, hours, state);
    Ok(())
}
