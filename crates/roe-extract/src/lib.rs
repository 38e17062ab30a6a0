#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/roe/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Extraction engine for return on equity.
//!
//! Given a company-facts document, the engine picks a tag for each quantity,
//! narrows every tag's observations to one authoritative value, and divides.
//!
//! # Example
//!
//! ```no_run
//! use roe_core::{Cik, CompanyIdentity, FiscalPeriod};
//! use roe_edgar::{ClientConfig, EdgarClient, RateLimiter};
//! use roe_extract::{ExtractionConfig, RoeCalculator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let limiter = Arc::new(RateLimiter::default());
//!     let client = EdgarClient::new(ClientConfig::new("MyApp/1.0 (contact@example.com)"), limiter)?;
//!     let calculator = RoeCalculator::new(Arc::new(client), ExtractionConfig::default());
//!
//!     let company = CompanyIdentity::new("DUK", Cik::new(1326160), "Duke Energy");
//!     let result = calculator.calculate(&company, FiscalPeriod::Annual).await?;
//!     println!("{}: {}", result.company, result.percentage);
//!
//!     Ok(())
//! }
//! ```

/// ROE calculator and historical series.
pub mod calculator;
/// Tiered period selection.
pub mod period;
/// Data-quality flags.
pub mod quality;
/// Tag fallback lists and resolution.
pub mod tags;
/// Target year policy.
pub mod year;

pub use calculator::{
    DEFAULT_ARCHIVE_BASE_URL, DEFAULT_HISTORY_YEARS, ExtractionConfig, RoeCalculator,
};
pub use period::{YEAR_TIERS, YearTier, select, select_for_year};
pub use quality::{Assessment, assess};
pub use tags::{EQUITY_TAGS, NET_INCOME_TAGS, TagPriority, resolve};
pub use year::{YearChoice, choose_target_year, full_years};
