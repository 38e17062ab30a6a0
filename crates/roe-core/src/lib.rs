#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/roe/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for return-on-equity extraction.
//!
//! This crate provides the foundational abstractions shared by the client,
//! the extraction engine and the batch orchestrator:
//!
//! - [`FilingsSource`](provider::FilingsSource) - Upstream data boundary
//! - [`FactsDocument`](facts::FactsDocument) - Tagged facts for one company
//! - [`CompanyIdentity`](types::CompanyIdentity) - Resolved company reference
//! - [`RoeResult`](result::RoeResult) - Traceable ratio result
//! - [`RoeError`](error::RoeError) - Error taxonomy

/// Error types for extraction operations.
pub mod error;
/// Tagged facts and observations.
pub mod facts;
/// In-memory filings source.
pub mod memory;
/// Fiscal period definitions.
pub mod period;
/// Source trait for upstream data.
pub mod provider;
/// Extraction results and quality flags.
pub mod result;
/// Company reference types.
pub mod types;

// Re-export commonly used items at crate root
pub use error::{Result, RoeError};
pub use facts::{DEFAULT_TAXONOMY, FactsDocument, MONETARY_UNIT, Observation, TagSeries};
pub use memory::StaticSource;
pub use period::FiscalPeriod;
pub use provider::FilingsSource;
pub use result::{HistoricalRoe, QualityFlag, ResolvedMetric, RoeResult};
pub use types::{
    Cik, CompanyIdentity, DirectoryEntry, FilingRef, Submissions, Ticker, TickerDirectory,
    filing_url,
};
