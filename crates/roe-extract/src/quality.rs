//! Data-quality flags for a calculated ratio.

use roe_core::{FiscalPeriod, QualityFlag, ResolvedMetric};

use crate::tags::TagPriority;
use crate::year::YearChoice;

/// Inputs to [`assess`].
#[derive(Clone, Copy, Debug)]
pub struct Assessment<'a> {
    /// Selected net income.
    pub net_income: &'a ResolvedMetric,
    /// Selected equity.
    pub equity: &'a ResolvedMetric,
    /// Income fallback list used for resolution.
    pub net_income_tags: &'a TagPriority,
    /// Requested period.
    pub period: FiscalPeriod,
    /// Target year policy outcome, for annual requests.
    pub year_choice: Option<&'a YearChoice>,
}

/// Collects the flags that apply, without duplicates, in a stable order.
#[must_use]
pub fn assess(input: &Assessment<'_>) -> Vec<QualityFlag> {
    let income = &input.net_income.observation;
    let equity = &input.equity.observation;
    let mut flags = Vec::new();

    if !input.net_income_tags.is_primary(&input.net_income.tag) {
        flags.push(QualityFlag::NetIncomeFallbackTag);
    }
    if input.equity.tag.contains("NoncontrollingInterest") {
        flags.push(QualityFlag::EquityIncludesNoncontrollingInterest);
    }
    if income.is_amendment() || equity.is_amendment() {
        flags.push(QualityFlag::AmendedFiling);
    }
    if income.value < 0.0 {
        flags.push(QualityFlag::NegativeNetIncome);
    }
    if income.end != equity.end {
        flags.push(QualityFlag::PeriodEndMismatch);
    }
    if input.period.is_annual()
        && [income, equity]
            .iter()
            .any(|o| o.form.as_deref().is_some_and(|f| !f.starts_with("10-K")))
    {
        flags.push(QualityFlag::NonAnnualForm);
    }
    if let Some(choice) = input.year_choice {
        for flag in choice.flags() {
            if !flags.contains(&flag) {
                flags.push(flag);
            }
        }
    }

    flags
}
