//! SEC API response types and their conversion into domain types.

use chrono::NaiveDate;
use roe_core::{
    Cik, DirectoryEntry, FactsDocument, FilingRef, FiscalPeriod, Observation, Submissions, Ticker,
    TickerDirectory,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Company ticker information from SEC JSON.
///
/// The file is an object keyed by row index:
/// `{"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}`
#[derive(Debug, Deserialize)]
pub(crate) struct CompanyTickerInfo {
    /// CIK as a number (SEC returns this as an integer despite the name)
    cik_str: u64,
    ticker: String,
    title: String,
}

/// Converts the keyed ticker file into a directory in row order.
pub(crate) fn into_directory(rows: HashMap<String, CompanyTickerInfo>) -> TickerDirectory {
    let mut rows: Vec<(String, CompanyTickerInfo)> = rows.into_iter().collect();
    rows.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
    rows.into_iter()
        .map(|(_, info)| DirectoryEntry {
            cik: Cik::new(info.cik_str),
            ticker: Ticker::new(info.ticker),
            title: info.title,
        })
        .collect()
}

/// Company submissions/filings metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionsResponse {
    #[serde(default)]
    cik: Option<Cik>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sic: Option<String>,
    #[serde(default)]
    sic_description: Option<String>,
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default)]
    filings: FilingsContainer,
}

#[derive(Debug, Default, Deserialize)]
struct FilingsContainer {
    #[serde(default)]
    recent: FilingsRecent,
}

/// Column-oriented recent filing history.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilingsRecent {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    report_date: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
}

impl SubmissionsResponse {
    pub(crate) fn into_submissions(self, requested: Cik) -> Submissions {
        let recent = self.filings.recent;
        let filings = recent
            .accession_number
            .iter()
            .enumerate()
            .map(|(i, accession)| FilingRef {
                accession: accession.clone(),
                filing_date: recent.filing_date.get(i).and_then(|d| parse_date(d)),
                report_date: recent.report_date.get(i).and_then(|d| parse_date(d)),
                form: recent.form.get(i).cloned().unwrap_or_default(),
                primary_document: recent
                    .primary_document
                    .get(i)
                    .filter(|d| !d.is_empty())
                    .cloned(),
            })
            .collect();

        Submissions {
            cik: self.cik.unwrap_or(requested),
            name: self.name,
            sic: self.sic.filter(|s| !s.is_empty()),
            sic_description: self.sic_description.filter(|s| !s.is_empty()),
            tickers: self.tickers,
            filings,
        }
    }
}

/// Response from the SEC EDGAR Company Facts API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyFactsResponse {
    #[serde(default)]
    cik: Option<Cik>,
    #[serde(default)]
    entity_name: String,
    /// Facts organized by taxonomy and tag
    #[serde(default)]
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// Facts for a specific XBRL tag.
#[derive(Debug, Deserialize)]
struct TagFacts {
    /// Units (USD, shares, etc.) containing the actual fact values
    #[serde(default)]
    units: HashMap<String, Vec<FactValue>>,
}

/// A single fact value with metadata.
///
/// Everything is optional here; entries missing what an observation needs
/// are dropped during conversion instead of failing the document.
#[derive(Debug, Deserialize)]
struct FactValue {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    val: Option<f64>,
    #[serde(default)]
    accn: Option<String>,
    #[serde(default)]
    fy: Option<i32>,
    #[serde(default)]
    fp: Option<String>,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    filed: Option<String>,
    #[serde(default)]
    frame: Option<String>,
}

impl FactValue {
    fn into_observation(self, unit: &str) -> Option<Observation> {
        let end = parse_date(self.end.as_deref()?)?;
        let filed = parse_date(self.filed.as_deref()?)?;
        let accession = self.accn.filter(|a| !a.is_empty())?;
        let start = match self.start.as_deref() {
            Some(s) => Some(parse_date(s)?),
            None => None,
        };

        Some(Observation {
            value: self.val?,
            unit: unit.to_string(),
            start,
            end,
            fiscal_year: self.fy,
            fiscal_period: self.fp.as_deref().and_then(FiscalPeriod::from_label),
            form: self.form,
            accession,
            filed,
            frame: self.frame,
        })
    }
}

impl CompanyFactsResponse {
    /// Converts into a [`FactsDocument`], returning it with the number of
    /// dropped entries.
    pub(crate) fn into_document(self, requested: Cik) -> (FactsDocument, usize) {
        let mut document = FactsDocument::new(self.cik.unwrap_or(requested), self.entity_name);
        let mut dropped = 0;

        for (taxonomy, tags) in self.facts {
            for (tag, tag_facts) in tags {
                let units = document
                    .facts
                    .entry(taxonomy.clone())
                    .or_default()
                    .entry(tag)
                    .or_default();
                for (unit, values) in tag_facts.units {
                    let total = values.len();
                    let observations: Vec<Observation> = values
                        .into_iter()
                        .filter_map(|v| v.into_observation(&unit))
                        .collect();
                    dropped += total - observations.len();
                    units.insert(unit, observations);
                }
            }
        }

        (document, dropped)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_keeps_row_order() {
        let rows: HashMap<String, CompanyTickerInfo> = serde_json::from_str(
            r#"{
                "10": {"cik_str": 92122, "ticker": "SO", "title": "SOUTHERN CO"},
                "2": {"cik_str": 1326160, "ticker": "DUK", "title": "Duke Energy CORP"},
                "0": {"cik_str": 753308, "ticker": "NEE", "title": "NEXTERA ENERGY INC"}
            }"#,
        )
        .unwrap();

        let directory = into_directory(rows);
        let tickers: Vec<&str> = directory.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["NEE", "DUK", "SO"]);
    }

    #[test]
    fn test_submissions_zip_columns() {
        let response: SubmissionsResponse = serde_json::from_str(
            r#"{
                "cik": "1326160",
                "name": "Duke Energy CORP",
                "sic": "4931",
                "sicDescription": "Electric & Other Services Combined",
                "tickers": ["DUK"],
                "filings": {"recent": {
                    "accessionNumber": ["0001326160-24-000012", "0001326160-23-000101"],
                    "filingDate": ["2024-02-27", "2023-11-03"],
                    "reportDate": ["2023-12-31", ""],
                    "form": ["10-K", "10-Q"],
                    "primaryDocument": ["duk-20231231.htm", ""]
                }}
            }"#,
        )
        .unwrap();

        let submissions = response.into_submissions(Cik::new(1));
        assert_eq!(submissions.cik, Cik::new(1326160));
        assert_eq!(submissions.sic.as_deref(), Some("4931"));
        assert_eq!(submissions.filings.len(), 2);

        let annual = submissions.filing("0001326160-24-000012").unwrap();
        assert_eq!(annual.form, "10-K");
        assert_eq!(annual.report_date, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(annual.primary_document.as_deref(), Some("duk-20231231.htm"));

        let quarterly = submissions.filing("0001326160-23-000101").unwrap();
        assert!(quarterly.report_date.is_none());
        assert!(quarterly.primary_document.is_none());
    }

    #[test]
    fn test_facts_drop_malformed_entries() {
        let response: CompanyFactsResponse = serde_json::from_str(
            r#"{
                "cik": 72741,
                "entityName": "EVERSOURCE ENERGY",
                "facts": {"us-gaap": {"NetIncomeLoss": {
                    "label": "Net Income (Loss)",
                    "units": {"USD": [
                        {"start": "2023-01-01", "end": "2023-12-31", "val": 1000,
                         "accn": "0000072741-24-000010", "fy": 2023, "fp": "FY",
                         "form": "10-K", "filed": "2024-02-14", "frame": "CY2023"},
                        {"start": "2023-01-01", "end": "2023-12-31", "val": 1000,
                         "fy": 2023, "fp": "FY", "form": "10-K", "filed": "2024-02-14"},
                        {"end": "not-a-date", "val": 5, "accn": "x", "filed": "2024-02-14"},
                        {"end": "2023-09-30", "val": 7, "accn": "y", "fy": null,
                         "fp": "Q4", "filed": "2023-11-01"}
                    ]}
                }}}
            }"#,
        )
        .unwrap();

        let (document, dropped) = response.into_document(Cik::new(72741));
        assert_eq!(dropped, 2);
        assert_eq!(document.entity_name, "EVERSOURCE ENERGY");

        let observations = document.observations("NetIncomeLoss", "USD").unwrap();
        assert_eq!(observations.len(), 2);

        let full_year = &observations[0];
        assert_eq!(full_year.value, 1000.0);
        assert_eq!(full_year.unit, "USD");
        assert_eq!(full_year.fiscal_period, Some(FiscalPeriod::Annual));
        assert_eq!(full_year.frame.as_deref(), Some("CY2023"));
        assert!(full_year.is_full_calendar_year(2023));

        let unlabelled = &observations[1];
        assert!(unlabelled.fiscal_year.is_none());
        assert!(unlabelled.fiscal_period.is_none());
        assert!(unlabelled.start.is_none());
    }
}
