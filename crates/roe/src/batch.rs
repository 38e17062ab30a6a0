//! Batch orchestration.
//!
//! Companies are processed one at a time in fixed-size batches. Every network
//! call goes through the shared rate limiter inside the client; the processor
//! itself only uses the limiter to back off before retrying a transient
//! failure. A failure never stops the run, it becomes a [`FailureRecord`].

use chrono::{DateTime, Utc};
use polars::prelude::*;
use roe_core::{CompanyIdentity, FiscalPeriod, Result, RoeError, RoeResult};
use roe_edgar::RateLimiter;
use roe_extract::RoeCalculator;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

use crate::stats::RoeStatistics;

/// Default number of companies per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default pause between batches.
pub const DEFAULT_INTER_BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Default number of retries for a transient failure.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Batch settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Companies per batch.
    pub batch_size: usize,
    /// Sleep between consecutive batches.
    pub inter_batch_pause: Duration,
    /// Retries for transient failures, per company.
    pub max_retries: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_pause: DEFAULT_INTER_BATCH_PAUSE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl BatchConfig {
    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the pause between batches.
    #[must_use]
    pub const fn with_inter_batch_pause(mut self, pause: Duration) -> Self {
        self.inter_batch_pause = pause;
        self
    }

    /// Sets the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(RoeError::InvalidParameter(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Processing state of one company.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompanyState {
    /// Queued.
    Pending,
    /// Being calculated.
    Running,
    /// Produced a result.
    Succeeded,
    /// Produced a failure record.
    Failed,
}

impl fmt::Display for CompanyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// A company that could not be calculated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Ticker symbol.
    pub ticker: String,
    /// Zero-padded CIK.
    pub cik: String,
    /// Company name as supplied.
    pub company_name: String,
    /// Error description.
    pub error_message: String,
    /// Wall time spent on the company, retries included.
    pub processing_time_ms: u64,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    /// Builds a record for `company`.
    #[must_use]
    pub fn new(company: &CompanyIdentity, error: &RoeError, elapsed: Duration) -> Self {
        Self {
            ticker: company.ticker.to_string(),
            cik: company.cik.padded(),
            company_name: company.name.clone(),
            error_message: error.to_string(),
            processing_time_ms: elapsed.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }
}

/// Terminal state of a batch run.
///
/// Successes keep completion order and failures keep input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutcome {
    /// Successful calculations.
    pub successes: Vec<RoeResult>,
    /// Failed companies.
    pub failures: Vec<FailureRecord>,
    /// Statistics over successful ratios.
    pub statistics: RoeStatistics,
}

impl BatchOutcome {
    /// Number of companies processed.
    #[must_use]
    pub fn total_processed(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Share of successful companies as a percentage, 0 for an empty run.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        match self.total_processed() {
            0 => 0.0,
            total => self.successes.len() as f64 / total as f64 * 100.0,
        }
    }

    /// Exports the successful calculations as a DataFrame.
    ///
    /// Columns: `ticker`, `cik`, `company_name`, `fiscal_year`, `net_income`,
    /// `stockholders_equity`, `roe`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = &self.successes;
        let ciks: Vec<String> = rows.iter().map(|r| r.company.cik.padded()).collect();

        let tickers: Vec<&str> = rows.iter().map(|r| r.company.ticker.as_str()).collect();
        let ciks: Vec<&str> = ciks.iter().map(String::as_str).collect();
        let names: Vec<&str> = rows.iter().map(|r| r.company.name.as_str()).collect();
        let years: Vec<i32> = rows.iter().map(|r| r.fiscal_year).collect();
        let net_income: Vec<f64> = rows.iter().map(|r| r.net_income.value()).collect();
        let equity: Vec<f64> = rows
            .iter()
            .map(|r| r.stockholders_equity.value())
            .collect();
        let roe: Vec<f64> = rows.iter().map(|r| r.roe).collect();

        DataFrame::new(vec![
            Column::new("ticker".into(), tickers),
            Column::new("cik".into(), ciks),
            Column::new("company_name".into(), names),
            Column::new("fiscal_year".into(), years),
            Column::new("net_income".into(), net_income),
            Column::new("stockholders_equity".into(), equity),
            Column::new("roe".into(), roe),
        ])
        .map_err(|e| RoeError::Other(e.to_string()))
    }
}

#[derive(Serialize)]
struct ProcessingSummary {
    total_processed: usize,
    successful_calculations: usize,
    failed_calculations: usize,
    success_rate: f64,
    statistics: RoeStatistics,
}

#[derive(Serialize)]
struct BatchRecord<'a> {
    processing_summary: ProcessingSummary,
    successful_roe_calculations: &'a [RoeResult],
    failed_calculations: &'a [FailureRecord],
}

impl Serialize for BatchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        BatchRecord {
            processing_summary: ProcessingSummary {
                total_processed: self.total_processed(),
                successful_calculations: self.successes.len(),
                failed_calculations: self.failures.len(),
                success_rate: self.success_rate(),
                statistics: self.statistics,
            },
            successful_roe_calculations: &self.successes,
            failed_calculations: &self.failures,
        }
        .serialize(serializer)
    }
}

/// Runs the calculator over many companies.
#[derive(Clone, Debug)]
pub struct BatchProcessor {
    calculator: RoeCalculator,
    limiter: Arc<RateLimiter>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Creates a processor. Fails if the batch size is zero.
    pub fn new(
        calculator: RoeCalculator,
        limiter: Arc<RateLimiter>,
        config: BatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            calculator,
            limiter,
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Processes `companies` in batches and collects every outcome.
    #[instrument(skip_all, fields(companies = companies.len(), period = %period))]
    pub async fn run(
        &self,
        companies: &[CompanyIdentity],
        period: FiscalPeriod,
    ) -> BatchOutcome {
        let total_batches = companies.len().div_ceil(self.config.batch_size);
        info!(
            batches = total_batches,
            batch_size = self.config.batch_size,
            "Starting batch run"
        );
        for company in companies {
            debug!(ticker = %company.ticker, state = %CompanyState::Pending, "Queued");
        }

        let mut outcome = BatchOutcome::default();
        for (index, batch) in companies.chunks(self.config.batch_size).enumerate() {
            info!(batch = index + 1, of = total_batches, size = batch.len(), "Processing batch");

            for company in batch {
                let started = Instant::now();
                debug!(ticker = %company.ticker, state = %CompanyState::Running, "Calculating");

                match self.process(company, period).await {
                    Ok(result) => {
                        info!(
                            ticker = %company.ticker,
                            state = %CompanyState::Succeeded,
                            roe = %result.percentage,
                            "Company done"
                        );
                        outcome.successes.push(result);
                    }
                    Err(error) => {
                        warn!(
                            ticker = %company.ticker,
                            state = %CompanyState::Failed,
                            error = %error,
                            "Company failed"
                        );
                        outcome
                            .failures
                            .push(FailureRecord::new(company, &error, started.elapsed()));
                    }
                }
            }

            if index + 1 < total_batches {
                debug!(pause_ms = self.config.inter_batch_pause.as_millis() as u64, "Pausing");
                sleep(self.config.inter_batch_pause).await;
            }
        }

        outcome.statistics = RoeStatistics::from_values(outcome.successes.iter().map(|r| r.roe));
        info!(
            successes = outcome.successes.len(),
            failures = outcome.failures.len(),
            success_rate = outcome.success_rate(),
            "Batch run complete"
        );
        outcome
    }

    async fn process(
        &self,
        company: &CompanyIdentity,
        period: FiscalPeriod,
    ) -> Result<RoeResult> {
        let mut attempt = 0u32;
        loop {
            match self.calculator.calculate(company, period).await {
                Ok(result) => return Ok(result),
                Err(error) if error.is_transient() && attempt < self.config.max_retries => {
                    warn!(
                        ticker = %company.ticker,
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        error = %error,
                        "Transient failure, retrying"
                    );
                    self.limiter
                        .backoff(i32::try_from(attempt).unwrap_or(i32::MAX))
                        .await?;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
