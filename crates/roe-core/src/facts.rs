//! Tagged financial facts.
//!
//! A [`FactsDocument`] holds every reported value for one company, keyed by
//! taxonomy, tag and unit. Each value is an [`Observation`]; the observations
//! for one tag and unit form a [`TagSeries`].

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::period::FiscalPeriod;
use crate::types::Cik;

/// Unit key for monetary facts.
pub const MONETARY_UNIT: &str = "USD";

/// Taxonomy assumed for unqualified tag names.
pub const DEFAULT_TAXONOMY: &str = "us-gaap";

/// A single reported fact value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Raw reported value.
    pub value: f64,
    /// Unit of the value (e.g. `USD`).
    pub unit: String,
    /// Start of the covered period. `None` for point-in-time facts.
    pub start: Option<NaiveDate>,
    /// End of the covered period, or the as-of date for point-in-time facts.
    pub end: NaiveDate,
    /// Fiscal year of the filing that reported the value.
    pub fiscal_year: Option<i32>,
    /// Fiscal period of the filing that reported the value.
    pub fiscal_period: Option<FiscalPeriod>,
    /// Form type of the filing (e.g. `10-K`, `10-K/A`).
    pub form: Option<String>,
    /// Accession number of the filing.
    pub accession: String,
    /// Date the filing was made.
    pub filed: NaiveDate,
    /// Calendar frame assigned by EDGAR (e.g. `CY2023`).
    pub frame: Option<String>,
}

impl Observation {
    /// Creates a point-in-time USD observation with required fields.
    #[must_use]
    pub fn new(value: f64, end: NaiveDate, accession: impl Into<String>, filed: NaiveDate) -> Self {
        Self {
            value,
            unit: MONETARY_UNIT.to_string(),
            start: None,
            end,
            fiscal_year: None,
            fiscal_period: None,
            form: None,
            accession: accession.into(),
            filed,
            frame: None,
        }
    }

    /// Sets the coverage start date, making this a flow observation.
    #[must_use]
    pub const fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the fiscal year and period labels.
    #[must_use]
    pub const fn with_fiscal(mut self, fiscal_year: i32, fiscal_period: FiscalPeriod) -> Self {
        self.fiscal_year = Some(fiscal_year);
        self.fiscal_period = Some(fiscal_period);
        self
    }

    /// Sets the form type.
    #[must_use]
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Returns true if the observation covers exactly calendar year `year`.
    #[must_use]
    pub fn is_full_calendar_year(&self, year: i32) -> bool {
        self.start.is_some_and(|s| is_year_start(s, year)) && is_year_end(self.end, year)
    }

    /// Returns true if the observation ends on December 31 of `year`.
    #[must_use]
    pub fn ends_on_year_end(&self, year: i32) -> bool {
        is_year_end(self.end, year)
    }

    /// Returns true if the observation ends on any December 31.
    #[must_use]
    pub fn ends_on_december_31(&self) -> bool {
        self.end.month() == 12 && self.end.day() == 31
    }

    /// Returns true if the reporting form is an amendment (`/A`).
    #[must_use]
    pub fn is_amendment(&self) -> bool {
        self.form.as_deref().is_some_and(|f| f.ends_with("/A"))
    }
}

fn is_year_start(date: NaiveDate, year: i32) -> bool {
    date.year() == year && date.month() == 1 && date.day() == 1
}

fn is_year_end(date: NaiveDate, year: i32) -> bool {
    date.year() == year && date.month() == 12 && date.day() == 31
}

/// Observations reported under one tag and unit, in API order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagSeries {
    /// Fully-qualified tag name (e.g. `us-gaap:NetIncomeLoss`).
    pub tag: String,
    /// Unit shared by all observations.
    pub unit: String,
    /// Observations, in the order the API returned them.
    pub observations: Vec<Observation>,
}

impl TagSeries {
    /// Returns the tag name without its taxonomy prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        split_tag(&self.tag).1
    }

    /// Returns true if the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Splits `taxonomy:Name` into its parts, defaulting to [`DEFAULT_TAXONOMY`].
#[must_use]
pub fn split_tag(tag: &str) -> (&str, &str) {
    tag.split_once(':').unwrap_or((DEFAULT_TAXONOMY, tag))
}

/// Units of one tag, keyed by unit name.
pub type UnitMap = HashMap<String, Vec<Observation>>;

/// Every tagged fact reported by one company.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactsDocument {
    /// SEC CIK.
    pub cik: Cik,
    /// Entity name as reported.
    pub entity_name: String,
    /// Facts keyed by taxonomy, then tag, then unit.
    pub facts: HashMap<String, HashMap<String, UnitMap>>,
}

impl FactsDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new(cik: Cik, entity_name: impl Into<String>) -> Self {
        Self {
            cik,
            entity_name: entity_name.into(),
            facts: HashMap::new(),
        }
    }

    /// Appends observations under a (possibly qualified) tag.
    ///
    /// Each observation is filed under its own unit.
    pub fn insert(&mut self, tag: &str, observations: impl IntoIterator<Item = Observation>) {
        let (taxonomy, name) = split_tag(tag);
        let units = self
            .facts
            .entry(taxonomy.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default();
        for obs in observations {
            units.entry(obs.unit.clone()).or_default().push(obs);
        }
    }

    /// Builder form of [`FactsDocument::insert`].
    #[must_use]
    pub fn with_series(
        mut self,
        tag: &str,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Self {
        self.insert(tag, observations);
        self
    }

    /// Returns the observations for a tag and unit, if present.
    #[must_use]
    pub fn observations(&self, tag: &str, unit: &str) -> Option<&[Observation]> {
        let (taxonomy, name) = split_tag(tag);
        self.facts
            .get(taxonomy)?
            .get(name)?
            .get(unit)
            .map(Vec::as_slice)
    }

    /// Returns the series for a tag and unit as an owned [`TagSeries`].
    #[must_use]
    pub fn series(&self, tag: &str, unit: &str) -> Option<TagSeries> {
        let (taxonomy, name) = split_tag(tag);
        self.observations(tag, unit).map(|obs| TagSeries {
            tag: format!("{taxonomy}:{name}"),
            unit: unit.to_string(),
            observations: obs.to_vec(),
        })
    }

    /// Returns the total number of observations across all tags and units.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.facts
            .values()
            .flat_map(HashMap::values)
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }
}
