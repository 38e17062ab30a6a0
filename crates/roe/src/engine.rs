//! Engine facade: one rate limiter, one client, one calculator.

use roe_core::{
    CompanyIdentity, FilingsSource, FiscalPeriod, HistoricalRoe, Result, RoeError, RoeResult,
};
use roe_edgar::{ClientConfig, EdgarClient, RateLimitConfig, RateLimiter};
use roe_extract::{ExtractionConfig, RoeCalculator};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::batch::{BatchConfig, BatchOutcome, BatchProcessor};

/// Everything needed to build a [`RoeEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// EDGAR client settings.
    pub client: ClientConfig,
    /// Shared request budget.
    pub rate_limit: RateLimitConfig,
    /// Extraction settings.
    pub extraction: ExtractionConfig,
    /// Batch settings.
    pub batch: BatchConfig,
}

impl EngineConfig {
    /// Default settings with the given user agent.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: ClientConfig::new(user_agent),
            rate_limit: RateLimitConfig::default(),
            extraction: ExtractionConfig::default(),
            batch: BatchConfig::default(),
        }
    }

    /// Replaces the client settings.
    #[must_use]
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Replaces the rate limit.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Replaces the extraction settings.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// Replaces the batch settings.
    #[must_use]
    pub const fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }
}

/// Entry point for single-company and batch ROE extraction.
///
/// # Example
///
/// ```no_run
/// use roe::{EngineConfig, FiscalPeriod, RoeEngine};
///
/// #[tokio::main]
/// async fn main() -> roe::Result<()> {
///     let engine = RoeEngine::new(EngineConfig::new("MyApp/1.0 (contact@example.com)"))?;
///
///     let (companies, unknown) = engine.universe(&["ES", "DUK", "SO"]).await?;
///     assert!(unknown.is_empty());
///
///     let outcome = engine.run_batch(&companies, FiscalPeriod::Annual).await;
///     println!("median ROE {:.4}", outcome.statistics.median_roe);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct RoeEngine {
    source: Arc<dyn FilingsSource>,
    limiter: Arc<RateLimiter>,
    calculator: RoeCalculator,
    batch: BatchProcessor,
}

impl RoeEngine {
    /// Builds an engine backed by SEC EDGAR.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit)?);
        let client = EdgarClient::new(config.client, Arc::clone(&limiter))?;
        Self::with_source(Arc::new(client), limiter, config.extraction, config.batch)
    }

    /// Builds an engine over any source.
    ///
    /// `limiter` drives retry backoff; a source that throttles its own
    /// requests should share the same instance.
    pub fn with_source(
        source: Arc<dyn FilingsSource>,
        limiter: Arc<RateLimiter>,
        extraction: ExtractionConfig,
        batch: BatchConfig,
    ) -> Result<Self> {
        let calculator = RoeCalculator::new(Arc::clone(&source), extraction);
        let batch = BatchProcessor::new(calculator.clone(), Arc::clone(&limiter), batch)?;
        debug!(source = source.name(), "Engine ready");
        Ok(Self {
            source,
            limiter,
            calculator,
            batch,
        })
    }

    /// Returns the calculator.
    #[must_use]
    pub const fn calculator(&self) -> &RoeCalculator {
        &self.calculator
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Looks `ticker` up in the directory.
    #[instrument(skip(self))]
    pub async fn resolve_company(&self, ticker: &str) -> Result<CompanyIdentity> {
        let directory = self.source.fetch_ticker_directory().await?;
        directory
            .lookup(ticker)
            .ok_or_else(|| RoeError::CompanyNotFound(ticker.trim().to_uppercase()))
    }

    /// Resolves many tickers with a single directory fetch.
    ///
    /// Returns the resolved companies in input order and the tickers the
    /// directory does not list. A failed directory fetch is returned as is.
    #[instrument(skip_all, fields(tickers = tickers.len()))]
    pub async fn universe<S: AsRef<str>>(
        &self,
        tickers: &[S],
    ) -> Result<(Vec<CompanyIdentity>, Vec<String>)> {
        let directory = self.source.fetch_ticker_directory().await?;

        let mut companies = Vec::with_capacity(tickers.len());
        let mut unknown = Vec::new();
        for ticker in tickers {
            match directory.lookup(ticker.as_ref()) {
                Some(company) => companies.push(company),
                None => unknown.push(ticker.as_ref().trim().to_uppercase()),
            }
        }

        if !unknown.is_empty() {
            warn!(unknown = ?unknown, "Tickers not in directory");
        }
        info!(resolved = companies.len(), "Resolved universe");
        Ok((companies, unknown))
    }

    /// Calculates ROE for one company.
    pub async fn calculate(
        &self,
        company: &CompanyIdentity,
        period: FiscalPeriod,
    ) -> Result<RoeResult> {
        self.calculator
            .calculate(company, period)
            .await
            .map_err(|e| e.for_company(company.ticker.as_str(), company.cik.padded()))
    }

    /// Builds the historical series for one company over the configured lookback.
    pub async fn history(&self, company: &CompanyIdentity) -> Result<Vec<HistoricalRoe>> {
        let years = self.calculator.config().history_years;
        self.calculator
            .history(company, years)
            .await
            .map_err(|e| e.for_company(company.ticker.as_str(), company.cik.padded()))
    }

    /// Processes many companies; see [`BatchProcessor::run`].
    pub async fn run_batch(
        &self,
        companies: &[CompanyIdentity],
        period: FiscalPeriod,
    ) -> BatchOutcome {
        self.batch.run(companies, period).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use approx::assert_relative_eq;
    use roe_core::{Cik, StaticSource};

    fn engine(source: StaticSource) -> RoeEngine {
        RoeEngine::with_source(
            Arc::new(source),
            Arc::new(RateLimiter::default()),
            ExtractionConfig::default(),
            BatchConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_company() {
        let engine = engine(fixtures::source());

        let company = engine.resolve_company("es").await.unwrap();
        assert_eq!(company.ticker.as_str(), "ES");
        assert_eq!(company.cik, Cik::new(72741));

        let err = engine.resolve_company("zzzz").await.unwrap_err();
        assert_eq!(err, RoeError::CompanyNotFound("ZZZZ".to_string()));
    }

    #[tokio::test]
    async fn test_universe_splits_unknown_tickers() {
        let engine = engine(fixtures::source());

        let (companies, unknown) = engine.universe(&["SO", "XYZ", "ES"]).await.unwrap();
        let tickers: Vec<&str> = companies.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["SO", "ES"]);
        assert_eq!(unknown, vec!["XYZ".to_string()]);
    }

    #[tokio::test]
    async fn test_calculate_matches_reference_figure() {
        let engine = engine(fixtures::source());
        let company = engine.resolve_company("ES").await.unwrap();

        let result = engine.calculate(&company, FiscalPeriod::Annual).await.unwrap();
        assert_eq!(result.percentage, "8.79%");
        assert_relative_eq!(result.roe, 2_854_000_000.0 / 32_456_000_000.0);
        assert_eq!(result.company.sic_code.as_deref(), Some("4911"));
    }

    #[tokio::test]
    async fn test_single_company_errors_name_the_company() {
        let engine = engine(fixtures::source());
        let company = fixtures::identity("NOPE");

        let err = engine
            .calculate(&company, FiscalPeriod::Annual)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("NOPE (CIK 0000999999): "), "{err}");
        assert!(!err.is_transient());
        assert!(matches!(err.root(), RoeError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_history_uses_configured_lookback() {
        let engine = engine(fixtures::source());
        let company = fixtures::identity("DUK");

        let history = engine.history(&company).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].fiscal_year, 2023);
    }
}
