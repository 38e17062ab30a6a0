//! ROE CLI binary.
//!
//! Extracts return on equity from SEC EDGAR company facts and prints JSON.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use roe::{
    BatchConfig, EngineConfig, ExtractionConfig, FiscalPeriod, RateLimitConfig, RoeEngine,
};
use serde::Serialize;
use std::process;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Modules that log at `warn` unless `RUST_LOG` says otherwise.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

#[derive(Parser)]
#[command(name = "roe")]
#[command(about = "Return on equity from SEC EDGAR filings", long_about = None)]
#[command(version)]
struct Cli {
    /// User agent sent to the SEC, e.g. "AppName/1.0 (contact@example.com)"
    #[arg(long, env = "ROE_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Maximum requests per second
    #[arg(long, default_value = "10", global = true)]
    max_requests: usize,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate ROE for one company
    Calc {
        /// Ticker symbol
        ticker: String,

        /// Fiscal period (FY, Q1, Q2, Q3)
        #[arg(short, long, default_value = "FY")]
        period: FiscalPeriod,

        /// Calendar year to anchor annual figures on
        #[arg(long)]
        preferred_year: Option<i32>,
    },

    /// Annual ROE history for one company
    History {
        /// Ticker symbol
        ticker: String,

        /// Number of years to look back (at most 20)
        #[arg(short, long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..=20))]
        years: u32,
    },

    /// Calculate ROE for many companies
    Batch {
        /// Ticker symbols
        #[arg(required = true, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Fiscal period (FY, Q1, Q2, Q3)
        #[arg(short, long, default_value = "FY")]
        period: FiscalPeriod,

        /// Calendar year to anchor annual figures on
        #[arg(long)]
        preferred_year: Option<i32>,

        /// Companies per batch
        #[arg(long, default_value = "10")]
        batch_size: usize,

        /// Pause between batches in milliseconds
        #[arg(long, default_value = "1000")]
        pause_ms: u64,

        /// Retries for transient failures
        #[arg(long, default_value = "2")]
        retries: u32,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = NOISY_MODULES
            .iter()
            .fold(level.to_string(), |acc, module| format!("{acc},{module}=warn"));
        EnvFilter::new(directives)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let Some(user_agent) = cli.user_agent else {
        bail!("a user agent is required: pass --user-agent or set ROE_USER_AGENT");
    };
    let config = EngineConfig::new(user_agent)
        .with_rate_limit(RateLimitConfig::default().with_max_requests(cli.max_requests));

    match cli.command {
        Commands::Calc {
            ticker,
            period,
            preferred_year,
        } => {
            let engine = RoeEngine::new(config.with_extraction(extraction(preferred_year)))?;
            let company = engine
                .resolve_company(&ticker)
                .await
                .with_context(|| format!("resolving {ticker}"))?;
            let result = engine.calculate(&company, period).await?;
            print_json(&result)
        }

        Commands::History { ticker, years } => {
            let extraction = ExtractionConfig::default().with_history_years(years);
            let engine = RoeEngine::new(config.with_extraction(extraction))?;
            let company = engine
                .resolve_company(&ticker)
                .await
                .with_context(|| format!("resolving {ticker}"))?;
            let history = engine.history(&company).await?;
            if history.is_empty() {
                warn!(ticker = %company.ticker, "No full-year history found");
            }
            print_json(&serde_json::json!({
                "ticker": company.ticker,
                "cik": company.cik,
                "company_name": company.name,
                "history": history,
            }))
        }

        Commands::Batch {
            tickers,
            period,
            preferred_year,
            batch_size,
            pause_ms,
            retries,
        } => {
            let batch = BatchConfig::default()
                .with_batch_size(batch_size)
                .with_inter_batch_pause(Duration::from_millis(pause_ms))
                .with_max_retries(retries);
            let engine = RoeEngine::new(
                config
                    .with_extraction(extraction(preferred_year))
                    .with_batch(batch),
            )?;

            let (companies, unknown) = engine.universe(tickers.as_slice()).await?;
            for ticker in &unknown {
                warn!(ticker = %ticker, "Skipping ticker not listed by the SEC");
            }

            let outcome = engine.run_batch(&companies, period).await;
            info!(
                successful = outcome.successes.len(),
                failed = outcome.failures.len(),
                "Batch finished"
            );
            print_json(&outcome)
        }
    }
}

fn extraction(preferred_year: Option<i32>) -> ExtractionConfig {
    match preferred_year {
        Some(year) => ExtractionConfig::default().with_preferred_year(year),
        None => ExtractionConfig::default(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
