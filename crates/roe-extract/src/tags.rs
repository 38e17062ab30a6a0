//! Tag fallback lists and resolution.
//!
//! Different companies report the same concept under different XBRL tags.
//! A [`TagPriority`] lists the acceptable tags for one concept, most
//! standardized first; [`resolve`] returns the first one that carries data.

use roe_core::{FactsDocument, MONETARY_UNIT, Result, RoeError, TagSeries, facts::split_tag};
use tracing::{debug, trace};

/// Net income tags, in priority order.
pub const NET_INCOME_TAGS: &[&str] = &[
    "us-gaap:NetIncomeLoss",
    "us-gaap:IncomeLossFromContinuingOperations",
    "us-gaap:NetIncomeLossAvailableToCommonStockholdersBasic",
    "us-gaap:ProfitLoss",
];

/// Stockholders' equity tags, in priority order.
pub const EQUITY_TAGS: &[&str] = &[
    "us-gaap:StockholdersEquity",
    "us-gaap:StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
];

/// Ordered candidate tags for one concept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagPriority {
    label: String,
    candidates: Vec<String>,
}

impl TagPriority {
    /// Creates a priority list; candidates may be bare or `taxonomy:Name`.
    #[must_use]
    pub fn new<S: Into<String>>(
        label: impl Into<String>,
        candidates: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            label: label.into(),
            candidates: candidates.into_iter().map(|c| qualify(&c.into())).collect(),
        }
    }

    /// Net income fallbacks.
    #[must_use]
    pub fn net_income() -> Self {
        Self::new("Net Income", NET_INCOME_TAGS.iter().copied())
    }

    /// Stockholders' equity fallbacks.
    #[must_use]
    pub fn stockholders_equity() -> Self {
        Self::new("Stockholders' Equity", EQUITY_TAGS.iter().copied())
    }

    /// Appends a lower-priority candidate.
    #[must_use]
    pub fn with_candidate(mut self, tag: &str) -> Self {
        self.candidates.push(qualify(tag));
        self
    }

    /// Human readable concept name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Candidates in priority order, fully qualified.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Returns true if `tag` is the first candidate.
    #[must_use]
    pub fn is_primary(&self, tag: &str) -> bool {
        self.candidates.first().is_some_and(|c| *c == qualify(tag))
    }

    /// Resolves this list against a facts document.
    pub fn resolve(&self, facts: &FactsDocument) -> Result<TagSeries> {
        resolve(facts, &self.candidates, &self.label)
    }
}

/// Returns the `taxonomy:Name` form of a tag.
#[must_use]
pub fn qualify(tag: &str) -> String {
    let (taxonomy, name) = split_tag(tag);
    format!("{taxonomy}:{name}")
}

/// Returns the first candidate with a non-empty monetary series.
///
/// Later candidates are never looked at once one matches. Fails with
/// `TagNotFound` naming `label` and every candidate when none match.
pub fn resolve<S: AsRef<str>>(
    facts: &FactsDocument,
    candidates: &[S],
    label: &str,
) -> Result<TagSeries> {
    let found = candidates.iter().find_map(|candidate| {
        let series = facts
            .series(candidate.as_ref(), MONETARY_UNIT)
            .filter(|s| !s.is_empty());
        if series.is_none() {
            trace!(tag = candidate.as_ref(), "No monetary data for tag");
        }
        series
    });

    match found {
        Some(series) => {
            debug!(
                label,
                tag = %series.tag,
                observations = series.observations.len(),
                "Resolved tag"
            );
            Ok(series)
        }
        None => Err(RoeError::TagNotFound {
            label: label.to_string(),
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        }),
    }
}
