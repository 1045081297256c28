//! Scanner-specific conversion of raw findings into canonical issues.

use super::semgrep::SemgrepNormalizer;
use crate::error::RenderError;
use crate::report::ScanResult;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// A normalized, deduplicated finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalIssue {
    pub id: String,
    pub name: String,
    /// Severity as declared by the scanner, before SARIF level mapping.
    pub level: String,
    pub details: String,
    pub uri: String,
    pub start_line: usize,
    pub start_column: usize,
    pub help_url: String,
    pub code: Option<String>,
}

/// Maps a scanner's declared severity to a SARIF level.
///
/// Matching is case-insensitive; anything unrecognized becomes `note`.
pub fn default_sarif_level(severity: &str) -> &'static str {
    match severity.to_ascii_lowercase().as_str() {
        "medium" | "moderate" | "warning" => "warning",
        "high" | "critical" | "error" => "error",
        _ => "note",
    }
}

pub trait IssueNormalizer: Send + Sync {
    /// Driver name emitted in the SARIF run.
    fn tool_name(&self) -> &str;

    fn tool_uri(&self) -> &str;

    /// Raw findings in emission order.
    fn raw_findings<'a>(&self, result: &'a ScanResult) -> Vec<&'a Value>;

    fn normalize_finding(&self, finding: &Value) -> Result<CanonicalIssue, RenderError>;

    fn sarif_level(&self, severity: &str) -> &'static str {
        default_sarif_level(severity)
    }

    /// Normalize every raw finding of `result`.
    ///
    /// Findings whose id was already emitted in this call are dropped.
    /// Malformed findings are logged and skipped.
    fn normalize(&self, result: &ScanResult) -> Vec<CanonicalIssue> {
        let mut seen = HashSet::new();
        let mut issues = Vec::new();

        for finding in self.raw_findings(result) {
            match self.normalize_finding(finding) {
                Ok(issue) => {
                    if seen.insert(issue.id.clone()) {
                        issues.push(issue);
                    }
                }
                Err(e) => {
                    warn!(
                        scanner = %result.scanner_name(),
                        error = %e,
                        "Omitting finding from SARIF output"
                    );
                }
            }
        }

        issues
    }
}

/// Normalizers keyed by scanner name.
#[derive(Clone)]
pub struct NormalizerRegistry {
    normalizers: HashMap<String, Arc<dyn IssueNormalizer>>,
}

impl NormalizerRegistry {
    /// Registry without any normalizer.
    pub fn empty() -> Self {
        Self {
            normalizers: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        scanner_name: impl Into<String>,
        normalizer: impl IssueNormalizer + 'static,
    ) {
        self.normalizers
            .insert(scanner_name.into(), Arc::new(normalizer));
    }

    pub fn get(&self, scanner_name: &str) -> Option<&dyn IssueNormalizer> {
        self.normalizers.get(scanner_name).map(|n| n.as_ref())
    }
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("Semgrep", SemgrepNormalizer::new());
        registry
    }
}

impl std::fmt::Debug for NormalizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut scanners: Vec<&String> = self.normalizers.keys().collect();
        scanners.sort();
        f.debug_struct("NormalizerRegistry")
            .field("scanners", &scanners)
            .finish()
    }
}
