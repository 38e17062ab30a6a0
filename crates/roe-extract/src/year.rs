//! Target year policy.
//!
//! An annual ROE is anchored on one calendar year. The default is the latest
//! year with a full-year income observation. A preferred year can be
//! configured to anchor on an expected 10-K cycle; when it disagrees with the
//! data the choice is flagged instead of silently resolved.

use chrono::Datelike;
use roe_core::{Observation, QualityFlag};
use std::collections::BTreeSet;

/// Outcome of the target year policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearChoice {
    /// The year selection will target.
    pub year: i32,
    /// The latest year with a full-year observation.
    pub latest_available: i32,
    /// The configured preferred year, if any.
    pub preferred: Option<i32>,
}

impl YearChoice {
    /// Flags describing disagreement between the preferred and chosen year.
    #[must_use]
    pub fn flags(&self) -> Vec<QualityFlag> {
        match self.preferred {
            Some(preferred) if preferred != self.year => {
                vec![QualityFlag::PreferredYearUnavailable]
            }
            Some(_) if self.latest_available > self.year => {
                vec![QualityFlag::PreferredYearBehindLatest]
            }
            _ => Vec::new(),
        }
    }
}

/// Years covered by a full calendar-year flow observation, ascending.
#[must_use]
pub fn full_years(observations: &[Observation]) -> BTreeSet<i32> {
    observations
        .iter()
        .filter(|o| o.is_full_calendar_year(o.end.year()))
        .map(|o| o.end.year())
        .collect()
}

/// Chooses the target year for an annual calculation.
///
/// Returns `None` when no full-year observation exists, in which case
/// selection relies on fiscal labels alone.
#[must_use]
pub fn choose_target_year(
    observations: &[Observation],
    preferred: Option<i32>,
) -> Option<YearChoice> {
    let years = full_years(observations);
    let latest_available = *years.last()?;

    let year = match preferred {
        Some(p) if years.contains(&p) => p,
        _ => latest_available,
    };

    Some(YearChoice {
        year,
        latest_available,
        preferred,
    })
}
