//! Canned companies shared by the crate's tests.

use chrono::NaiveDate;
use roe_core::{
    Cik, CompanyIdentity, DirectoryEntry, FactsDocument, FiscalPeriod, Observation, StaticSource,
    Submissions, Ticker, TickerDirectory,
};

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// (ticker, cik, name, net income, equity) for FY2023.
pub(crate) const COMPANIES: &[(&str, u64, &str, f64, f64)] = &[
    ("ES", 72741, "EVERSOURCE ENERGY", 2_854_000_000.0, 32_456_000_000.0),
    ("DUK", 1326160, "Duke Energy CORP", 2_841_000_000.0, 49_322_000_000.0),
    ("SO", 92122, "SOUTHERN CO", 3_976_000_000.0, 33_208_000_000.0),
];

pub(crate) fn facts(cik: u64, name: &str, net_income: f64, equity: f64) -> FactsDocument {
    let accession = format!("{cik:010}-24-000001");
    let filed = date(2024, 2, 20);
    FactsDocument::new(Cik::new(cik), name)
        .with_series(
            "us-gaap:NetIncomeLoss",
            [Observation::new(net_income, date(2023, 12, 31), &accession, filed)
                .with_start(date(2023, 1, 1))
                .with_fiscal(2023, FiscalPeriod::Annual)
                .with_form("10-K")],
        )
        .with_series(
            "us-gaap:StockholdersEquity",
            [Observation::new(equity, date(2023, 12, 31), &accession, filed)
                .with_fiscal(2023, FiscalPeriod::Annual)
                .with_form("10-K")],
        )
}

pub(crate) fn identity(ticker: &str) -> CompanyIdentity {
    COMPANIES
        .iter()
        .find(|c| c.0 == ticker)
        .map(|&(t, cik, name, ..)| CompanyIdentity::new(t, Cik::new(cik), name))
        .unwrap_or_else(|| CompanyIdentity::new(ticker, Cik::new(999_999), "UNLISTED"))
}

/// Source serving every company in [`COMPANIES`].
pub(crate) fn source() -> StaticSource {
    let directory: TickerDirectory = COMPANIES
        .iter()
        .map(|&(ticker, cik, name, ..)| DirectoryEntry {
            cik: Cik::new(cik),
            ticker: Ticker::new(ticker),
            title: name.to_string(),
        })
        .collect();

    COMPANIES.iter().fold(
        StaticSource::new().with_directory(directory),
        |source, &(_, cik, name, ni, eq)| {
            source
                .with_submissions(Submissions::new(Cik::new(cik), name).with_sic("4911"))
                .with_facts(facts(cik, name, ni, eq))
        },
    )
}
