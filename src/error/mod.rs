//! Error types for salus-report.
//!
//! Each concern owns its own error enum:
//! - `ContractViolation`: misuse of the `ScanResult` producer interface
//! - `ReportError`: rejected insertions into a `Report`
//! - `RenderError`: serialization failures while rendering a payload
//! - `ExportError`: delivery failures, always naming the failing destination

mod export;

pub use export::{ExportError, TransportError};

use thiserror::Error;

/// Programmer error in how a scanner adapter drives its `ScanResult`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("Verdict of scanner {scanner} was read before it was set")]
    VerdictUnset { scanner: String },

    #[error("Verdict of scanner {scanner} was already set")]
    VerdictAlreadySet { scanner: String },
}

/// Error raised when a `ScanResult` cannot be added to a `Report`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Report already holds a result for scanner {0}")]
    DuplicateScanner(String),

    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A single scanner finding could not be normalized. Never aborts a render;
    /// the finding is logged and skipped.
    #[error("Malformed finding from {scanner}: {reason}")]
    MalformedFinding { scanner: String, reason: String },
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_display() {
        let err = ContractViolation::VerdictUnset {
            scanner: "Semgrep".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Verdict of scanner Semgrep was read before it was set"
        );

        let err = ContractViolation::VerdictAlreadySet {
            scanner: "Brakeman".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Verdict of scanner Brakeman was already set"
        );
    }

    #[test]
    fn test_report_error_display() {
        let err = ReportError::DuplicateScanner("Semgrep".to_string());
        assert_eq!(
            err.to_string(),
            "Report already holds a result for scanner Semgrep"
        );
    }

    #[test]
    fn test_report_error_from_contract_violation_is_transparent() {
        let err: ReportError = ContractViolation::VerdictUnset {
            scanner: "Gosec".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Verdict of scanner Gosec was read before it was set"
        );
    }

    #[test]
    fn test_render_error_malformed_finding() {
        let err = RenderError::MalformedFinding {
            scanner: "Semgrep".to_string(),
            reason: "missing spans".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed finding from Semgrep: missing spans"
        );
    }
}
