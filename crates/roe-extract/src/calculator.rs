//! Return-on-equity calculation.

use chrono::{Datelike, Utc};
use roe_core::{
    CompanyIdentity, FactsDocument, FilingsSource, FiscalPeriod, HistoricalRoe, Observation,
    ResolvedMetric, Result, RoeError, RoeResult, Submissions, filing_url,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::period::{select, select_for_year};
use crate::quality::{Assessment, assess};
use crate::tags::TagPriority;
use crate::year::{choose_target_year, full_years};

/// Default EDGAR archive location used for filing links.
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Default number of years in a historical series.
pub const DEFAULT_HISTORY_YEARS: u32 = 20;

/// Extraction settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionConfig {
    /// Calendar year to anchor annual calculations on, if any.
    pub preferred_year: Option<i32>,
    /// Number of years covered by [`RoeCalculator::history`].
    pub history_years: u32,
    /// Net income fallbacks.
    pub net_income_tags: TagPriority,
    /// Equity fallbacks.
    pub equity_tags: TagPriority,
    /// Base of filing archive links.
    pub archive_base_url: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            preferred_year: None,
            history_years: DEFAULT_HISTORY_YEARS,
            net_income_tags: TagPriority::net_income(),
            equity_tags: TagPriority::stockholders_equity(),
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Anchors annual calculations on `year`.
    #[must_use]
    pub const fn with_preferred_year(mut self, year: i32) -> Self {
        self.preferred_year = Some(year);
        self
    }

    /// Sets the historical lookback, capped at [`DEFAULT_HISTORY_YEARS`].
    #[must_use]
    pub const fn with_history_years(mut self, years: u32) -> Self {
        self.history_years = if years > DEFAULT_HISTORY_YEARS {
            DEFAULT_HISTORY_YEARS
        } else {
            years
        };
        self
    }

    /// Replaces the net income fallbacks.
    #[must_use]
    pub fn with_net_income_tags(mut self, tags: TagPriority) -> Self {
        self.net_income_tags = tags;
        self
    }

    /// Replaces the equity fallbacks.
    #[must_use]
    pub fn with_equity_tags(mut self, tags: TagPriority) -> Self {
        self.equity_tags = tags;
        self
    }

    /// Sets the archive base for filing links.
    #[must_use]
    pub fn with_archive_base_url(mut self, url: impl Into<String>) -> Self {
        self.archive_base_url = url.into();
        self
    }
}

/// Computes traceable ROE figures from a [`FilingsSource`].
///
/// Every result carries the tags, observations, accession number and filing
/// link it was built from.
#[derive(Clone, Debug)]
pub struct RoeCalculator {
    source: Arc<dyn FilingsSource>,
    config: ExtractionConfig,
}

impl RoeCalculator {
    /// Creates a calculator reading from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn FilingsSource>, config: ExtractionConfig) -> Self {
        Self { source, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Returns the underlying source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn FilingsSource> {
        &self.source
    }

    /// Fetches submissions and facts concurrently, then computes the ratio.
    #[instrument(skip(self, company), fields(ticker = %company.ticker, cik = %company.cik))]
    pub async fn calculate(
        &self,
        company: &CompanyIdentity,
        period: FiscalPeriod,
    ) -> Result<RoeResult> {
        let (submissions, facts) = futures::try_join!(
            self.source.fetch_submissions(company.cik),
            self.source.fetch_facts(company.cik)
        )?;

        let result = self.compute(company, &submissions, &facts, period)?;
        info!(
            fiscal_year = result.fiscal_year,
            roe = %result.percentage,
            flags = result.quality_flags.len(),
            "Calculated ROE"
        );
        Ok(result)
    }

    /// Computes the ratio from documents already in hand.
    pub fn compute(
        &self,
        company: &CompanyIdentity,
        submissions: &Submissions,
        facts: &FactsDocument,
        period: FiscalPeriod,
    ) -> Result<RoeResult> {
        let income_series = self.config.net_income_tags.resolve(facts)?;
        let equity_series = self.config.equity_tags.resolve(facts)?;

        let year_choice = if period.is_annual() {
            choose_target_year(&income_series.observations, self.config.preferred_year)
        } else {
            None
        };
        let target_year = year_choice.map(|c| c.year);

        let income = select(&income_series.observations, period, target_year)?;
        let equity = select(&equity_series.observations, period, target_year)?;

        let net_income = ResolvedMetric::new(
            income_series.tag.clone(),
            with_filing_form(income, submissions),
        );
        let stockholders_equity = ResolvedMetric::new(
            equity_series.tag.clone(),
            with_filing_form(equity, submissions),
        );

        let ni = net_income.value();
        let eq = stockholders_equity.value();
        if eq.is_nan() || eq <= 0.0 {
            return Err(RoeError::InvalidData(format!(
                "Stockholders' equity must be positive, got {eq} ({} filed {})",
                stockholders_equity.tag, stockholders_equity.observation.filed
            )));
        }

        let roe = ni / eq;
        let fiscal_year = target_year
            .or(income.fiscal_year)
            .unwrap_or_else(|| income.end.year());

        let quality_flags = assess(&Assessment {
            net_income: &net_income,
            equity: &stockholders_equity,
            net_income_tags: &self.config.net_income_tags,
            period,
            year_choice: year_choice.as_ref(),
        });
        if !quality_flags.is_empty() {
            debug!(flags = ?quality_flags, "Data quality flags raised");
        }

        Ok(RoeResult {
            company: fill_identity(company, submissions, facts),
            fiscal_year,
            fiscal_period: period,
            filing_url: filing_url(
                &self.config.archive_base_url,
                company.cik,
                &net_income.observation.accession,
            ),
            percentage: format!("{:.2}%", roe * 100.0),
            formula: format!("Net Income / Stockholders' Equity = {ni} / {eq}"),
            roe,
            net_income,
            stockholders_equity,
            extracted_at: Utc::now(),
            quality_flags,
        })
    }

    /// Fetches facts and builds a historical series over `years` years.
    ///
    /// Only the facts fetch can fail; see [`Self::history_from_facts`].
    #[instrument(skip(self, company), fields(ticker = %company.ticker, cik = %company.cik))]
    pub async fn history(
        &self,
        company: &CompanyIdentity,
        years: u32,
    ) -> Result<Vec<HistoricalRoe>> {
        let facts = self.source.fetch_facts(company.cik).await?;
        Ok(self.history_from_facts(&facts, years))
    }

    /// Best-effort annual series ending at the latest full year, ascending.
    ///
    /// The lookback never exceeds [`DEFAULT_HISTORY_YEARS`]. Years without a calendar-year match for both quantities, or with
    /// non-positive equity, are left out.
    #[must_use]
    pub fn history_from_facts(&self, facts: &FactsDocument, years: u32) -> Vec<HistoricalRoe> {
        let (income_series, equity_series) = match (
            self.config.net_income_tags.resolve(facts),
            self.config.equity_tags.resolve(facts),
        ) {
            (Ok(income), Ok(equity)) => (income, equity),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "No history available");
                return Vec::new();
            }
        };

        let Some(&latest) = full_years(&income_series.observations).last() else {
            return Vec::new();
        };
        let span = years.min(DEFAULT_HISTORY_YEARS);
        if span < years {
            debug!(requested = years, span, "Capping history lookback");
        }
        let first = latest.saturating_sub(span.cast_signed()).saturating_add(1);

        let candidates: BTreeSet<i32> = income_series
            .observations
            .iter()
            .map(|o| o.end.year())
            .filter(|year| (first..=latest).contains(year))
            .collect();

        let series: Vec<HistoricalRoe> = candidates
            .into_iter()
            .filter_map(|year| {
                let income = select_for_year(&income_series.observations, year)?;
                let equity = select_for_year(&equity_series.observations, year)?;
                if equity.value.is_nan() || equity.value <= 0.0 {
                    debug!(year, equity = equity.value, "Skipping year with non-positive equity");
                    return None;
                }
                Some(HistoricalRoe {
                    fiscal_year: year,
                    net_income: income.value,
                    stockholders_equity: equity.value,
                    roe: income.value / equity.value,
                    net_income_tag: income_series.tag.clone(),
                    equity_tag: equity_series.tag.clone(),
                    accession_number: income.accession.clone(),
                })
            })
            .collect();

        debug!(years = series.len(), first, latest, "Built ROE history");
        series
    }
}

fn with_filing_form(observation: &Observation, submissions: &Submissions) -> Observation {
    let mut observation = observation.clone();
    if observation.form.is_none() {
        observation.form = submissions
            .filing(&observation.accession)
            .map(|f| f.form.clone());
    }
    observation
}

fn fill_identity(
    company: &CompanyIdentity,
    submissions: &Submissions,
    facts: &FactsDocument,
) -> CompanyIdentity {
    let mut company = company.clone();
    if company.name.trim().is_empty() {
        company.name = if submissions.name.is_empty() {
            facts.entity_name.clone()
        } else {
            submissions.name.clone()
        };
    }
    if company.sic_code.is_none() {
        company.sic_code = submissions.sic.clone();
    }
    company
}
