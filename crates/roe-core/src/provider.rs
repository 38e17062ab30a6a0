//! Source trait for upstream filings data.
//!
//! [`FilingsSource`] is the boundary between the extraction engine and the
//! upstream API. The HTTP client implements it; tests substitute
//! [`StaticSource`](crate::memory::StaticSource).

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    facts::FactsDocument,
    types::{Cik, Submissions, TickerDirectory},
};

/// Read-only access to the three upstream resources.
///
/// Implementations perform no retries; that decision belongs to the caller.
#[async_trait]
pub trait FilingsSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g. "SEC EDGAR").
    fn name(&self) -> &str;

    /// Fetches the ticker to CIK directory.
    async fn fetch_ticker_directory(&self) -> Result<TickerDirectory>;

    /// Fetches submission metadata for a company.
    async fn fetch_submissions(&self, cik: Cik) -> Result<Submissions>;

    /// Fetches every tagged fact reported by a company.
    async fn fetch_facts(&self, cik: Cik) -> Result<FactsDocument>;
}
