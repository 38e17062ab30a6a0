//! Error types for extraction operations.
//!
//! This module defines [`RoeError`] which covers every failure that can occur
//! while fetching filings, resolving tags, selecting periods or computing a
//! ratio.

use thiserror::Error;

use crate::period::FiscalPeriod;

/// Errors that can occur during extraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoeError {
    /// Transport failures: connection, timeout or truncated body.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// What was being fetched.
        message: String,
    },

    /// The upstream payload could not be parsed into the expected structure.
    #[error("Decode error: {0}")]
    Decode(String),

    /// None of the candidate tags carry usable monetary data.
    #[error("No usable tag for {label}; tried {}", .candidates.join(", "))]
    TagNotFound {
        /// Human readable metric name (e.g. "Net Income").
        label: String,
        /// The exhausted candidate list, in priority order.
        candidates: Vec<String>,
    },

    /// No observation matches the requested period.
    #[error("No observation for fiscal period {period}{}", .year.map(|y| format!(" (target year {y})")).unwrap_or_default())]
    PeriodNotFound {
        /// The requested fiscal period.
        period: FiscalPeriod,
        /// The target year, if one was requested.
        year: Option<i32>,
    },

    /// The selected data cannot support a meaningful ratio.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The ticker is not present in the ticker directory.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An error raised while processing a specific company.
    #[error("{ticker} (CIK {cik}): {source}")]
    Company {
        /// Ticker of the company being processed.
        ticker: String,
        /// Zero-padded CIK of the company being processed.
        cik: String,
        /// The underlying error.
        #[source]
        source: Box<RoeError>,
    },

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl RoeError {
    /// Returns true if retrying the same request may succeed.
    ///
    /// Transport failures, `429 Too Many Requests` and 5xx statuses are
    /// transient. Other statuses and everything else describe the request or
    /// the data itself and will fail the same way on every attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Company { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Wraps this error with the identity of the company being processed.
    #[must_use]
    pub fn for_company(self, ticker: impl Into<String>, cik: impl Into<String>) -> Self {
        Self::Company {
            ticker: ticker.into(),
            cik: cik.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through company context.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Company { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias using [`RoeError`].
pub type Result<T> = std::result::Result<T, RoeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_not_found_message_names_candidates() {
        let err = RoeError::TagNotFound {
            label: "Net Income".to_string(),
            candidates: vec!["NetIncomeLoss".to_string(), "ProfitLoss".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "No usable tag for Net Income; tried NetIncomeLoss, ProfitLoss"
        );
    }

    #[test]
    fn test_period_not_found_message() {
        let err = RoeError::PeriodNotFound {
            period: FiscalPeriod::Annual,
            year: Some(2023),
        };
        assert_eq!(
            err.to_string(),
            "No observation for fiscal period FY (target year 2023)"
        );

        let err = RoeError::PeriodNotFound {
            period: FiscalPeriod::Q2,
            year: None,
        };
        assert_eq!(err.to_string(), "No observation for fiscal period Q2");
    }

    #[test]
    fn test_company_context_prefixes_message() {
        let err =
            RoeError::InvalidData("equity is zero".to_string()).for_company("DUK", "0001326160");
        assert_eq!(
            err.to_string(),
            "DUK (CIK 0001326160): Invalid data: equity is zero"
        );
        assert!(matches!(err.root(), RoeError::InvalidData(_)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(RoeError::Network("timeout".into()).is_transient());
        assert!(
            RoeError::Network("503".into())
                .for_company("SO", "0000092122")
                .is_transient()
        );
        assert!(!RoeError::Decode("bad json".into()).is_transient());
        assert!(!RoeError::InvalidData("equity".into()).is_transient());
    }

    #[test]
    fn test_http_status_classification() {
        let http = |status| RoeError::Http {
            status,
            message: "company facts for CIK 72741".to_string(),
        };

        assert!(http(429).is_transient());
        assert!(http(500).is_transient());
        assert!(http(503).is_transient());
        assert!(!http(400).is_transient());
        assert!(!http(403).is_transient());
        assert!(!http(404).is_transient());
        assert!(!http(404).for_company("ES", "0000072741").is_transient());
        assert_eq!(
            http(404).to_string(),
            "HTTP 404: company facts for CIK 72741"
        );
    }
}
