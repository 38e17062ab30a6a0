//! In-memory filings source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, instrument};

use crate::{
    error::{Result, RoeError},
    facts::FactsDocument,
    provider::FilingsSource,
    types::{Cik, Submissions, TickerDirectory},
};

/// Canned [`FilingsSource`] for tests and offline runs.
///
/// Serves documents registered up front. A missing document yields a
/// `Http` error with status 404. Failures can be scripted per CIK
/// to exercise retry paths, and every fetch is counted.
#[derive(Debug, Default)]
pub struct StaticSource {
    directory: TickerDirectory,
    submissions: HashMap<Cik, Submissions>,
    facts: HashMap<Cik, FactsDocument>,
    scripted_failures: Mutex<HashMap<Cik, Vec<RoeError>>>,
    requests: AtomicUsize,
}

impl StaticSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ticker directory.
    #[must_use]
    pub fn with_directory(mut self, directory: TickerDirectory) -> Self {
        self.directory = directory;
        self
    }

    /// Registers submissions for the CIK they carry.
    #[must_use]
    pub fn with_submissions(mut self, submissions: Submissions) -> Self {
        self.submissions.insert(submissions.cik, submissions);
        self
    }

    /// Registers a facts document for the CIK it carries.
    #[must_use]
    pub fn with_facts(mut self, facts: FactsDocument) -> Self {
        self.facts.insert(facts.cik, facts);
        self
    }

    /// Queues an error returned by the next facts fetch for `cik`.
    ///
    /// Queued errors are consumed in order; once exhausted the registered
    /// document is served again.
    #[must_use]
    pub fn with_failure(self, cik: Cik, error: RoeError) -> Self {
        if let Ok(mut failures) = self.scripted_failures.lock() {
            failures.entry(cik).or_default().push(error);
        }
        self
    }

    /// Returns the number of fetches served so far, failures included.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn take_failure(&self, cik: Cik) -> Option<RoeError> {
        let mut failures = self.scripted_failures.lock().ok()?;
        let queue = failures.get_mut(&cik)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }
}

fn not_found(resource: &str, cik: Cik) -> RoeError {
    RoeError::Http {
        status: 404,
        message: format!("Failed to fetch {resource} for CIK {cik}: 404 Not Found"),
    }
}

#[async_trait]
impl FilingsSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_ticker_directory(&self) -> Result<TickerDirectory> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.directory.clone())
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn fetch_submissions(&self, cik: Cik) -> Result<Submissions> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.submissions
            .get(&cik)
            .cloned()
            .ok_or_else(|| not_found("submissions", cik))
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn fetch_facts(&self, cik: Cik) -> Result<FactsDocument> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.take_failure(cik) {
            debug!(error = %error, "Serving scripted failure");
            return Err(error);
        }
        self.facts
            .get(&cik)
            .cloned()
            .ok_or_else(|| not_found("company facts", cik))
    }
}
