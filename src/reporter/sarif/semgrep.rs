use super::normalizer::{CanonicalIssue, IssueNormalizer, default_sarif_level};
use crate::error::RenderError;
use crate::report::ScanResult;
use serde_json::Value;

const SEMGREP_URI: &str = "https://semgrep.dev/";
const RULE_SYNTAX_URL: &str = "https://semgrep.dev/docs/writing-rules/rule-syntax/";

/// Converts Semgrep pattern hits (`info.hits`) and non-fatal tool warnings
/// (`warn.semgrep_non_fatal`) into canonical issues.
pub struct SemgrepNormalizer;

impl SemgrepNormalizer {
    pub fn new() -> Self {
        Self
    }

    fn malformed(reason: impl Into<String>) -> RenderError {
        RenderError::MalformedFinding {
            scanner: "Semgrep".to_string(),
            reason: reason.into(),
        }
    }

    fn parse_hit(&self, hit: &Value) -> Result<CanonicalIssue, RenderError> {
        let id = non_empty(hit, "pattern")
            .or_else(|| non_empty(hit, "msg"))
            .ok_or_else(|| Self::malformed("hit has neither pattern nor msg"))?;
        let location = hit
            .get("hit")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Self::malformed(format!("hit for {} has no location", id))
            })?;

        // <file>:<line>:<code preview>; the preview may itself contain ':'
        let mut parts = location.splitn(3, ':');
        let uri = parts.next().unwrap_or_default();
        let start_line = parts
            .next()
            .and_then(|line| line.trim().parse::<usize>().ok())
            .ok_or_else(|| {
                Self::malformed(format!("hit location {:?} has no line", location))
            })?;
        let code = parts.next().map(str::to_string);

        Ok(CanonicalIssue {
            id: id.clone(),
            name: id,
            level: "HIGH".to_string(),
            details: format!(
                "Pattern: {}\nMessage:{}\nForbidden:{}\nRequired:{}\nHit: {}",
                field_text(hit, "pattern"),
                field_text(hit, "msg"),
                field_text(hit, "forbidden"),
                field_text(hit, "required"),
                location
            ),
            uri: uri.to_string(),
            start_line,
            start_column: 1,
            help_url: RULE_SYNTAX_URL.to_string(),
            code,
        })
    }

    fn parse_warning(&self, warning: &Value) -> Result<CanonicalIssue, RenderError> {
        let kind = non_empty(warning, "type")
            .ok_or_else(|| Self::malformed("warning has no type"))?;
        let span = warning
            .get("spans")
            .and_then(Value::as_array)
            .and_then(|spans| spans.first())
            .ok_or_else(|| Self::malformed(format!("warning {} has no spans", kind)))?;
        let uri = span
            .get("file")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Self::malformed(format!("warning {} span has no file", kind))
            })?;
        let start = span.get("start");
        let start_line = start
            .and_then(|start| start.get("line"))
            .and_then(as_position)
            .ok_or_else(|| {
                Self::malformed(format!("warning {} span has no line", kind))
            })?;
        let start_column = start
            .and_then(|start| start.get("col").or_else(|| start.get("column")))
            .and_then(as_position)
            .ok_or_else(|| {
                Self::malformed(format!("warning {} span has no column", kind))
            })?;

        Ok(CanonicalIssue {
            id: kind.clone(),
            name: kind,
            level: field_text(warning, "level"),
            details: field_text(warning, "message"),
            uri: uri.to_string(),
            start_line,
            start_column,
            help_url: RULE_SYNTAX_URL.to_string(),
            code: None,
        })
    }
}

impl Default for SemgrepNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueNormalizer for SemgrepNormalizer {
    fn tool_name(&self) -> &str {
        "Semgrep"
    }

    fn tool_uri(&self) -> &str {
        SEMGREP_URI
    }

    fn raw_findings<'a>(&self, result: &'a ScanResult) -> Vec<&'a Value> {
        result
            .info_entries("hits")
            .iter()
            .chain(result.warn_entries("semgrep_non_fatal"))
            .collect()
    }

    fn normalize_finding(&self, finding: &Value) -> Result<CanonicalIssue, RenderError> {
        if !finding.is_object() {
            return Err(Self::malformed("finding is not an object"));
        }
        if finding.get("type").is_some() {
            self.parse_warning(finding)
        } else {
            self.parse_hit(finding)
        }
    }

    fn sarif_level(&self, severity: &str) -> &'static str {
        match severity {
            "warning" | "warn" => "warning",
            _ => default_sarif_level(severity),
        }
    }
}

fn non_empty(finding: &Value, key: &str) -> Option<String> {
    finding
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Field rendered as text; absent and null fields render empty.
fn field_text(finding: &Value, key: &str) -> String {
    match finding.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn as_position(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
