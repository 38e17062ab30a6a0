//! Fiscal period definitions.
//!
//! This module defines [`FiscalPeriod`], the reporting period label attached
//! to every tagged observation in a facts document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RoeError;

/// Fiscal period label of a reported fact.
///
/// EDGAR labels annual facts `FY` and quarterly facts `Q1`..`Q3`. A fourth
/// quarter is never reported directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalPeriod {
    /// Full fiscal year.
    #[default]
    #[serde(rename = "FY")]
    Annual,
    /// First quarter.
    Q1,
    /// Second quarter.
    Q2,
    /// Third quarter.
    Q3,
}

impl FiscalPeriod {
    /// All periods, annual first.
    pub const ALL: [Self; 4] = [Self::Annual, Self::Q1, Self::Q2, Self::Q3];

    /// Returns the EDGAR label for this period.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Annual => "FY",
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
        }
    }

    /// Parses an EDGAR period label, returning `None` for anything unrecognised.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "FY" | "ANNUAL" => Some(Self::Annual),
            "Q1" => Some(Self::Q1),
            "Q2" => Some(Self::Q2),
            "Q3" => Some(Self::Q3),
            _ => None,
        }
    }

    /// Returns true for the full fiscal year.
    #[must_use]
    pub const fn is_annual(&self) -> bool {
        matches!(self, Self::Annual)
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FiscalPeriod {
    type Err = RoeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
            .ok_or_else(|| RoeError::InvalidParameter(format!("Unknown fiscal period: {s}")))
    }
}
