//! Period selection.
//!
//! Facts documents mix flow quantities (income, reported over a date range)
//! and point-in-time quantities (equity, reported as of a date) in one shape,
//! and amended filings repeat earlier periods. Selection runs in tiers:
//!
//! 1. Annual with a target year: the full calendar year `Y-01-01..Y-12-31`.
//! 2. Annual with a target year: anything ending on `Y-12-31`.
//! 3. Otherwise: the fiscal period label, newest fiscal year first, falling
//!    back to any December 31 observation for annual requests.
//!
//! Within a tier the latest filing wins, so restatements supersede originals.
//! Ties on filing date go to the later entry in API order.

use roe_core::{FiscalPeriod, Observation, Result, RoeError};
use tracing::trace;

/// A selection tier applied against a target year.
#[derive(Clone, Copy, Debug)]
pub struct YearTier {
    /// Tier name, used in logs.
    pub name: &'static str,
    /// Predicate deciding whether an observation belongs to the tier.
    pub matches: fn(&Observation, i32) -> bool,
}

/// Year tiers in priority order.
pub const YEAR_TIERS: &[YearTier] = &[
    YearTier {
        name: "full_year_flow",
        matches: Observation::is_full_calendar_year,
    },
    YearTier {
        name: "year_end_instant",
        matches: Observation::ends_on_year_end,
    },
];

fn latest_filed<'a>(candidates: impl Iterator<Item = &'a Observation>) -> Option<&'a Observation> {
    candidates.max_by_key(|o| o.filed)
}

/// Selects the observation for calendar year `year` using the year tiers only.
///
/// Returns `None` rather than falling back to another year.
#[must_use]
pub fn select_for_year(observations: &[Observation], year: i32) -> Option<&Observation> {
    YEAR_TIERS.iter().find_map(|tier| {
        let selected = latest_filed(observations.iter().filter(|o| (tier.matches)(o, year)));
        if let Some(obs) = selected {
            trace!(tier = tier.name, year, accession = %obs.accession, "Year tier matched");
        }
        selected
    })
}

/// Selects by fiscal period label, newest fiscal year and filing first.
fn select_by_label(observations: &[Observation], period: FiscalPeriod) -> Option<&Observation> {
    let labelled: Vec<&Observation> = observations
        .iter()
        .filter(|o| o.fiscal_year.is_some() && o.fiscal_period == Some(period))
        .collect();

    let candidates = if labelled.is_empty() && period.is_annual() {
        observations
            .iter()
            .filter(|o| o.ends_on_december_31())
            .collect()
    } else {
        labelled
    };

    candidates
        .into_iter()
        .max_by(|a, b| {
            a.fiscal_year
                .cmp(&b.fiscal_year)
                .then_with(|| a.filed.cmp(&b.filed))
        })
}

/// Selects the single authoritative observation for a period.
///
/// The year tiers apply only to annual requests with a target year; when they
/// find nothing selection continues with the fiscal label. Fails with
/// `PeriodNotFound` when every tier comes up empty.
pub fn select(
    observations: &[Observation],
    period: FiscalPeriod,
    target_year: Option<i32>,
) -> Result<&Observation> {
    if period.is_annual()
        && let Some(year) = target_year
        && let Some(obs) = select_for_year(observations, year)
    {
        return Ok(obs);
    }

    select_by_label(observations, period).ok_or(RoeError::PeriodNotFound {
        period,
        year: target_year,
    })
}
