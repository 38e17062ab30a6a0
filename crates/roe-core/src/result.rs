//! Extraction results.
//!
//! - [`ResolvedMetric`] - One tag and the single observation chosen from it
//! - [`RoeResult`] - Fully traceable return-on-equity record
//! - [`QualityFlag`] - Data-quality observations attached to a result
//! - [`HistoricalRoe`] - One year of a best-effort history

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::facts::Observation;
use crate::period::FiscalPeriod;
use crate::types::CompanyIdentity;

/// A tag together with the single observation selected from its series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetric {
    /// Fully-qualified tag name.
    pub tag: String,
    /// The selected observation.
    pub observation: Observation,
}

impl ResolvedMetric {
    /// Creates a resolved metric.
    #[must_use]
    pub fn new(tag: impl Into<String>, observation: Observation) -> Self {
        Self {
            tag: tag.into(),
            observation,
        }
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.observation.value
    }
}

/// Data-quality observations recorded alongside a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    /// Net income came from a tag other than the primary one.
    NetIncomeFallbackTag,
    /// Equity includes non-controlling interests.
    EquityIncludesNoncontrollingInterest,
    /// A selected value comes from an amended filing.
    AmendedFiling,
    /// Net income is negative; the ratio is negative.
    NegativeNetIncome,
    /// Net income and equity observations end on different dates.
    PeriodEndMismatch,
    /// The configured preferred year had no full-year data.
    PreferredYearUnavailable,
    /// The preferred year was used although a later full year exists.
    PreferredYearBehindLatest,
    /// An annual figure was taken from a form other than a 10-K.
    NonAnnualForm,
}

impl QualityFlag {
    /// Returns the serialized name of the flag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NetIncomeFallbackTag => "net_income_fallback_tag",
            Self::EquityIncludesNoncontrollingInterest => {
                "equity_includes_noncontrolling_interest"
            }
            Self::AmendedFiling => "amended_filing",
            Self::NegativeNetIncome => "negative_net_income",
            Self::PeriodEndMismatch => "period_end_mismatch",
            Self::PreferredYearUnavailable => "preferred_year_unavailable",
            Self::PreferredYearBehindLatest => "preferred_year_behind_latest",
            Self::NonAnnualForm => "non_annual_form",
        }
    }
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return on equity for one company and period, with full provenance.
///
/// Serializes to the published result schema (`ticker`, `cik`, ...,
/// `data_quality_flags`).
#[derive(Clone, Debug, PartialEq)]
pub struct RoeResult {
    /// The company.
    pub company: CompanyIdentity,
    /// Fiscal year the ratio describes.
    pub fiscal_year: i32,
    /// Fiscal period the ratio describes.
    pub fiscal_period: FiscalPeriod,
    /// Selected net income.
    pub net_income: ResolvedMetric,
    /// Selected stockholders' equity.
    pub stockholders_equity: ResolvedMetric,
    /// Net income divided by equity, unrounded.
    pub roe: f64,
    /// Ratio as a percentage with two decimals (e.g. `8.79%`).
    pub percentage: String,
    /// Formula with both raw values.
    pub formula: String,
    /// Archive URL of the income filing.
    pub filing_url: String,
    /// When the result was produced.
    pub extracted_at: DateTime<Utc>,
    /// Data-quality flags.
    pub quality_flags: Vec<QualityFlag>,
}

impl RoeResult {
    /// Date of the filing the net income was taken from.
    #[must_use]
    pub const fn filing_date(&self) -> NaiveDate {
        self.net_income.observation.filed
    }

    /// Accession number of the filing the net income was taken from.
    #[must_use]
    pub fn accession_number(&self) -> &str {
        &self.net_income.observation.accession
    }

    /// Returns true if the result carries `flag`.
    #[must_use]
    pub fn has_flag(&self, flag: QualityFlag) -> bool {
        self.quality_flags.contains(&flag)
    }
}

#[derive(Serialize)]
struct MetricRecord<'a> {
    value: f64,
    tag: &'a str,
    unit: &'a str,
}

impl<'a> From<&'a ResolvedMetric> for MetricRecord<'a> {
    fn from(metric: &'a ResolvedMetric) -> Self {
        Self {
            value: metric.observation.value,
            tag: &metric.tag,
            unit: &metric.observation.unit,
        }
    }
}

#[derive(Serialize)]
struct CalculationRecord<'a> {
    formula: &'a str,
    value: f64,
    percentage: &'a str,
}

#[derive(Serialize)]
struct RoeRecord<'a> {
    ticker: &'a str,
    cik: String,
    company_name: &'a str,
    sic_code: Option<&'a str>,
    fiscal_year: i32,
    fiscal_period: FiscalPeriod,
    filing_date: NaiveDate,
    accession_number: &'a str,
    filing_url: &'a str,
    net_income: MetricRecord<'a>,
    stockholders_equity: MetricRecord<'a>,
    roe_calculation: CalculationRecord<'a>,
    extraction_timestamp: DateTime<Utc>,
    data_quality_flags: &'a [QualityFlag],
}

impl Serialize for RoeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RoeRecord {
            ticker: self.company.ticker.as_str(),
            cik: self.company.cik.padded(),
            company_name: &self.company.name,
            sic_code: self.company.sic_code.as_deref(),
            fiscal_year: self.fiscal_year,
            fiscal_period: self.fiscal_period,
            filing_date: self.filing_date(),
            accession_number: self.accession_number(),
            filing_url: &self.filing_url,
            net_income: (&self.net_income).into(),
            stockholders_equity: (&self.stockholders_equity).into(),
            roe_calculation: CalculationRecord {
                formula: &self.formula,
                value: self.roe,
                percentage: &self.percentage,
            },
            extraction_timestamp: self.extracted_at,
            data_quality_flags: &self.quality_flags,
        }
        .serialize(serializer)
    }
}

/// One year of a historical ROE series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRoe {
    /// Fiscal (calendar) year.
    pub fiscal_year: i32,
    /// Net income for the year.
    pub net_income: f64,
    /// Equity at year end.
    pub stockholders_equity: f64,
    /// Net income divided by equity.
    pub roe: f64,
    /// Tag the income was read from.
    pub net_income_tag: String,
    /// Tag the equity was read from.
    pub equity_tag: String,
    /// Accession number of the income filing.
    pub accession_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cik;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> RoeResult {
        let income = Observation::new(
            2_854_000_000.0,
            date(2023, 12, 31),
            "0000072741-24-000010",
            date(2024, 2, 14),
        )
        .with_start(date(2023, 1, 1))
        .with_fiscal(2023, FiscalPeriod::Annual)
        .with_form("10-K");
        let equity = Observation::new(
            32_456_000_000.0,
            date(2023, 12, 31),
            "0000072741-24-000010",
            date(2024, 2, 14),
        );

        RoeResult {
            company: CompanyIdentity::new("ES", Cik::new(72741), "EVERSOURCE ENERGY")
                .with_sic("4911"),
            fiscal_year: 2023,
            fiscal_period: FiscalPeriod::Annual,
            net_income: ResolvedMetric::new("us-gaap:NetIncomeLoss", income),
            stockholders_equity: ResolvedMetric::new("us-gaap:StockholdersEquity", equity),
            roe: 2_854_000_000.0 / 32_456_000_000.0,
            percentage: "8.79%".to_string(),
            formula: "Net Income / Stockholders' Equity = 2854000000 / 32456000000".to_string(),
            filing_url: "https://www.sec.gov/Archives/edgar/data/72741/000007274124000010"
                .to_string(),
            extracted_at: DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            quality_flags: vec![QualityFlag::AmendedFiling],
        }
    }

    #[test]
    fn test_result_serializes_to_published_schema() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "accession_number",
                "cik",
                "company_name",
                "data_quality_flags",
                "extraction_timestamp",
                "filing_date",
                "filing_url",
                "fiscal_period",
                "fiscal_year",
                "net_income",
                "roe_calculation",
                "sic_code",
                "stockholders_equity",
                "ticker",
            ]
        );

        assert_eq!(value["cik"], "0000072741");
        assert_eq!(value["fiscal_period"], "FY");
        assert_eq!(value["filing_date"], "2024-02-14");
        assert_eq!(value["accession_number"], "0000072741-24-000010");
        assert_eq!(value["net_income"]["tag"], "us-gaap:NetIncomeLoss");
        assert_eq!(value["net_income"]["unit"], "USD");
        assert_eq!(value["stockholders_equity"]["value"], 32_456_000_000.0);
        assert_eq!(value["roe_calculation"]["percentage"], "8.79%");
        assert_eq!(value["data_quality_flags"][0], "amended_filing");
        assert!(
            value["extraction_timestamp"]
                .as_str()
                .unwrap()
                .starts_with("2024-03-01T12:00:00")
        );
    }

    #[test]
    fn test_flag_names_match_serde() {
        for flag in [
            QualityFlag::NetIncomeFallbackTag,
            QualityFlag::EquityIncludesNoncontrollingInterest,
            QualityFlag::PreferredYearBehindLatest,
        ] {
            assert_eq!(
                serde_json::to_value(flag).unwrap(),
                serde_json::Value::String(flag.as_str().to_string())
            );
        }
    }
}
