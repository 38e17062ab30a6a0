#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/roe/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Return-on-equity extraction from SEC filings.
//!
//! This crate re-exports the core types, the EDGAR client and the extraction
//! engine, and adds the [`RoeEngine`] facade and the [`BatchProcessor`].
//!
//! # Example
//!
//! ```no_run
//! use roe::{EngineConfig, FiscalPeriod, RoeEngine};
//!
//! #[tokio::main]
//! async fn main() -> roe::Result<()> {
//!     let engine = RoeEngine::new(EngineConfig::new("MyApp/1.0 (contact@example.com)"))?;
//!
//!     let company = engine.resolve_company("ES").await?;
//!     let result = engine.calculate(&company, FiscalPeriod::Annual).await?;
//!     println!("{}: {} ({})", result.company, result.percentage, result.filing_url);
//!
//!     Ok(())
//! }
//! ```

/// Batch orchestration.
pub mod batch;
/// Engine facade.
pub mod engine;
/// Summary statistics.
pub mod stats;

#[cfg(test)]
mod fixtures;

// Core types and traits
pub use roe_core::*;

// EDGAR client
pub use roe_edgar::{ClientConfig, EdgarClient, RateLimitConfig, RateLimiter};

// Extraction engine
pub use roe_extract::{ExtractionConfig, RoeCalculator, TagPriority};

pub use batch::{BatchConfig, BatchOutcome, BatchProcessor, CompanyState, FailureRecord};
pub use engine::{EngineConfig, RoeEngine};
pub use stats::RoeStatistics;
