//! Company reference types.
//!
//! This module defines the identity side of the data model:
//!
//! - [`Ticker`] - Trading symbol
//! - [`Cik`] - SEC Central Index Key
//! - [`CompanyIdentity`] - Resolved company reference
//! - [`TickerDirectory`] - Ticker to CIK directory
//! - [`Submissions`] - Per-company filing metadata

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RoeError;

/// A trading symbol/ticker.
///
/// Tickers are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker, trimming whitespace and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key.
///
/// Stored numerically; [`Cik::padded`] and `Display` render the fixed
/// 10-digit zero-padded form used by the EDGAR APIs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cik(u64);

impl Cik {
    /// Largest value that fits the 10-digit form.
    pub const MAX: u64 = 9_999_999_999;

    /// Creates a CIK from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the 10-digit zero-padded form (e.g. `0000320193`).
    #[must_use]
    pub fn padded(&self) -> String {
        format!("{:010}", self.0)
    }

    /// Returns the unpadded decimal form used in archive paths.
    #[must_use]
    pub fn unpadded(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

impl FromStr for Cik {
    type Err = RoeError;

    /// Accepts padded or unpadded digits, optionally prefixed with `CIK`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("CIK")
            .or_else(|| trimmed.strip_prefix("cik"))
            .unwrap_or(trimmed);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RoeError::InvalidParameter(format!("Invalid CIK: {s}")));
        }

        let value: u64 = digits
            .parse()
            .map_err(|_| RoeError::InvalidParameter(format!("Invalid CIK: {s}")))?;
        if value > Self::MAX {
            return Err(RoeError::InvalidParameter(format!(
                "CIK does not fit 10 digits: {s}"
            )));
        }
        Ok(Self(value))
    }
}

impl Serialize for Cik {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.padded())
    }
}

impl<'de> Deserialize<'de> for Cik {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Builds the archive URL of a filing: `{base}/{cik unpadded}/{accession without hyphens}`.
#[must_use]
pub fn filing_url(archive_base: &str, cik: Cik, accession: &str) -> String {
    format!(
        "{}/{}/{}",
        archive_base.trim_end_matches('/'),
        cik.unpadded(),
        accession.replace('-', "")
    )
}

/// Resolved company reference.
///
/// Supplied by the classification collaborator or resolved from the ticker
/// directory. Never mutated by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyIdentity {
    /// Ticker symbol.
    pub ticker: Ticker,
    /// SEC CIK.
    pub cik: Cik,
    /// Display name.
    pub name: String,
    /// Standard Industrial Classification code.
    pub sic_code: Option<String>,
}

impl CompanyIdentity {
    /// Creates a new identity with required fields.
    #[must_use]
    pub fn new(ticker: impl Into<Ticker>, cik: Cik, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            cik,
            name: name.into(),
            sic_code: None,
        }
    }

    /// Sets the SIC code.
    #[must_use]
    pub fn with_sic(mut self, sic_code: impl Into<String>) -> Self {
        self.sic_code = Some(sic_code.into());
        self
    }
}

impl fmt::Display for CompanyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (CIK {})", self.ticker, self.cik)
    }
}

/// One entry of the ticker directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// SEC CIK.
    pub cik: Cik,
    /// Ticker symbol.
    pub ticker: Ticker,
    /// Registrant name.
    pub title: String,
}

/// Ticker to CIK directory as published by the SEC.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerDirectory {
    entries: Vec<DirectoryEntry>,
}

impl TickerDirectory {
    /// Creates a directory from its entries.
    #[must_use]
    pub const fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter()
    }

    /// Looks up a ticker (case-insensitive) and returns the company identity.
    ///
    /// The directory carries no SIC code; it is filled later from submissions.
    #[must_use]
    pub fn lookup(&self, ticker: &str) -> Option<CompanyIdentity> {
        let wanted = Ticker::new(ticker);
        self.entries
            .iter()
            .find(|e| e.ticker == wanted)
            .map(|e| CompanyIdentity::new(e.ticker.clone(), e.cik, e.title.clone()))
    }
}

impl FromIterator<DirectoryEntry> for TickerDirectory {
    fn from_iter<I: IntoIterator<Item = DirectoryEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A filing listed in a company's submission history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRef {
    /// Accession number (e.g. `0001326160-24-000012`).
    pub accession: String,
    /// Date the filing was accepted.
    pub filing_date: Option<NaiveDate>,
    /// Period of report.
    pub report_date: Option<NaiveDate>,
    /// Form type (e.g. `10-K`).
    pub form: String,
    /// Primary document file name.
    pub primary_document: Option<String>,
}

/// Per-company submission metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submissions {
    /// SEC CIK.
    pub cik: Cik,
    /// Registrant name.
    pub name: String,
    /// SIC code.
    pub sic: Option<String>,
    /// SIC description.
    pub sic_description: Option<String>,
    /// Tickers registered for the company.
    pub tickers: Vec<String>,
    /// Recent filings, most recent first as published.
    pub filings: Vec<FilingRef>,
}

impl Submissions {
    /// Creates submissions metadata with no filing history.
    #[must_use]
    pub fn new(cik: Cik, name: impl Into<String>) -> Self {
        Self {
            cik,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the SIC code.
    #[must_use]
    pub fn with_sic(mut self, sic: impl Into<String>) -> Self {
        self.sic = Some(sic.into());
        self
    }

    /// Appends a filing to the history.
    #[must_use]
    pub fn with_filing(mut self, filing: FilingRef) -> Self {
        self.filings.push(filing);
        self
    }

    /// Finds a filing by accession number.
    #[must_use]
    pub fn filing(&self, accession: &str) -> Option<&FilingRef> {
        self.filings.iter().find(|f| f.accession == accession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cik_padding() {
        let cik = Cik::new(320193);
        assert_eq!(cik.padded(), "0000320193");
        assert_eq!(cik.to_string(), "0000320193");
        assert_eq!(cik.unpadded(), "320193");
    }

    #[test]
    fn test_cik_parsing() {
        assert_eq!("0000320193".parse::<Cik>(), Ok(Cik::new(320193)));
        assert_eq!("320193".parse::<Cik>(), Ok(Cik::new(320193)));
        assert_eq!("CIK0000320193".parse::<Cik>(), Ok(Cik::new(320193)));
        assert!("".parse::<Cik>().is_err());
        assert!("12ab".parse::<Cik>().is_err());
        assert!("12345678901".parse::<Cik>().is_err());
    }

    #[test]
    fn test_cik_serde() {
        let json = serde_json::to_string(&Cik::new(72741)).unwrap();
        assert_eq!(json, "\"0000072741\"");

        let from_number: Cik = serde_json::from_str("72741").unwrap();
        let from_text: Cik = serde_json::from_str("\"0000072741\"").unwrap();
        assert_eq!(from_number, from_text);
    }

    #[test]
    fn test_ticker_uppercased() {
        assert_eq!(Ticker::new(" duk ").as_str(), "DUK");
    }

    #[test]
    fn test_filing_url_strips_hyphens_and_padding() {
        let url = filing_url(
            "https://www.sec.gov/Archives/edgar/data/",
            Cik::new(1326160),
            "0001326160-24-000012",
        );
        assert_eq!(
            url,
            "https://www.sec.gov/Archives/edgar/data/1326160/000132616024000012"
        );
    }

    #[test]
    fn test_directory_lookup_is_case_insensitive() {
        let directory: TickerDirectory = vec![
            DirectoryEntry {
                cik: Cik::new(1326160),
                ticker: Ticker::new("DUK"),
                title: "Duke Energy CORP".to_string(),
            },
            DirectoryEntry {
                cik: Cik::new(92122),
                ticker: Ticker::new("SO"),
                title: "SOUTHERN CO".to_string(),
            },
        ]
        .into_iter()
        .collect();

        let identity = directory.lookup("so").unwrap();
        assert_eq!(identity.cik, Cik::new(92122));
        assert_eq!(identity.name, "SOUTHERN CO");
        assert!(identity.sic_code.is_none());
        assert!(directory.lookup("XYZ").is_none());
    }
}
