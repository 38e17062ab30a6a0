#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/roe/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR client for return-on-equity extraction.
//!
//! This crate provides access to the three EDGAR resources the engine needs:
//!
//! - Ticker to CIK directory (`company_tickers.json`)
//! - Company submissions (SIC code, filing history)
//! - Company facts (every XBRL fact a company has reported)
//!
//! All traffic goes through a shared [`RateLimiter`].
//!
//! # Example
//!
//! ```no_run
//! use roe_core::{Cik, FilingsSource};
//! use roe_edgar::{ClientConfig, EdgarClient, RateLimiter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let limiter = Arc::new(RateLimiter::default());
//!     let client = EdgarClient::new(ClientConfig::new("MyApp/1.0 (contact@example.com)"), limiter)?;
//!
//!     let directory = client.fetch_ticker_directory().await?;
//!     let duke = directory.lookup("DUK").ok_or("DUK not listed")?;
//!
//!     let facts = client.fetch_facts(duke.cik).await?;
//!     println!("{} facts for {}", facts.observation_count(), facts.entity_name);
//!
//!     Ok(())
//! }
//! ```

/// HTTP client for the EDGAR APIs.
pub mod client;
/// Sliding-window rate limiter.
pub mod rate_limiter;
mod wire;

pub use client::{COMPANY_TICKERS_URL, ClientConfig, EDGAR_BASE_URL, EdgarClient};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
