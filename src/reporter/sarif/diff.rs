use super::normalizer::CanonicalIssue;
use serde_json::Value;
use std::collections::HashSet;

/// Results of a previously rendered SARIF log, used to suppress known issues.
#[derive(Debug, Default)]
pub struct SarifBaseline {
    known: HashSet<(String, String, String, String)>,
}

impl SarifBaseline {
    /// Index the results of `log`. Results missing a rule id are ignored.
    pub fn from_log(log: &Value) -> Self {
        let mut known = HashSet::new();
        let runs = log.get("runs").and_then(Value::as_array);

        for run in runs.into_iter().flatten() {
            let tool = text_at(run, "/tool/driver/name");
            let results = run.get("results").and_then(Value::as_array);
            for result in results.into_iter().flatten() {
                let rule_id = text_at(result, "/ruleId");
                if rule_id.is_empty() {
                    continue;
                }
                known.insert((
                    tool.clone(),
                    rule_id,
                    text_at(
                        result,
                        "/locations/0/physicalLocation/artifactLocation/uri",
                    ),
                    text_at(result, "/message/text"),
                ));
            }
        }

        Self { known }
    }

    pub fn contains(&self, tool: &str, issue: &CanonicalIssue) -> bool {
        self.known.contains(&(
            tool.to_string(),
            issue.id.clone(),
            issue.uri.clone(),
            issue.details.clone(),
        ))
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

fn text_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
