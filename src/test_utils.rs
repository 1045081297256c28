#[cfg(test)]
pub mod fixtures {
    use crate::error::{RenderError, TransportError};
    use crate::export::{Transport, TransportResponse};
    use crate::report::{Report, ScanResult};
    use crate::reporter::sarif::normalizer::{CanonicalIssue, IssueNormalizer};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    pub fn passing_scan(name: &str) -> ScanResult {
        let mut result = ScanResult::new(name);
        result.mark_pass().unwrap();
        result
    }

    pub fn failing_scan(name: &str) -> ScanResult {
        let mut result = ScanResult::new(name);
        result.mark_fail().unwrap();
        result
    }

    /// Report with one failed required scan and five top-level errors.
    pub fn eva_report() -> Report {
        let mut report = Report::new()
            .with_version("2.13.4")
            .with_project_name("eva00")
            .with_custom_info("test unit");

        let mut result = ScanResult::new("DerpScanner");
        result.record_info("asdf", "qwerty");
        result.mark_fail().unwrap();
        report.add_scan_result(result, true).unwrap();

        for _ in 0..5 {
            report.add_error(json!({"message": "derp"}));
        }
        report
    }

    pub fn semgrep_hit(pattern: &str, hit: &str) -> Value {
        json!({
            "pattern": pattern,
            "msg": "Forbidden pattern found",
            "forbidden": true,
            "required": false,
            "hit": hit
        })
    }

    pub fn semgrep_warning(kind: &str, level: &str, file: &str, line: u64, col: u64) -> Value {
        json!({
            "type": kind,
            "level": level,
            "message": format!("{} in {}", kind, file),
            "spans": [{"file": file, "start": {"line": line, "col": col}}]
        })
    }

    /// Normalizer over string entries recorded under the `findings` info key.
    ///
    /// Each string becomes an issue with that id; anything else is malformed.
    pub struct FindingListNormalizer;

    impl IssueNormalizer for FindingListNormalizer {
        fn tool_name(&self) -> &str {
            "FindingList"
        }

        fn tool_uri(&self) -> &str {
            "https://example.com/finding-list"
        }

        fn raw_findings<'a>(&self, result: &'a ScanResult) -> Vec<&'a Value> {
            result.info_entries("findings").iter().collect()
        }

        fn normalize_finding(&self, finding: &Value) -> Result<CanonicalIssue, RenderError> {
            let id = finding
                .as_str()
                .ok_or_else(|| RenderError::MalformedFinding {
                    scanner: "FindingList".to_string(),
                    reason: "finding is not a string".to_string(),
                })?;
            Ok(CanonicalIssue {
                id: id.to_string(),
                name: id.to_string(),
                level: "HIGH".to_string(),
                details: format!("{} found", id),
                uri: "Cargo.lock".to_string(),
                start_line: 1,
                start_column: 1,
                help_url: String::new(),
                code: None,
            })
        }
    }

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub uri: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }
    }

    /// Transport that records every request and answers with a fixed outcome.
    pub struct RecordingTransport {
        outcome: Result<u16, String>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl RecordingTransport {
        pub fn replying(status: u16) -> Self {
            Self {
                outcome: Ok(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                outcome: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn post(
            &self,
            uri: &str,
            headers: &[(&str, &str)],
            body: Vec<u8>,
        ) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                uri: uri.to_string(),
                headers: headers
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
                body: String::from_utf8(body).unwrap(),
            });
            match &self.outcome {
                Ok(status) => Ok(TransportResponse { status: *status }),
                Err(message) => Err(TransportError::Other(message.clone())),
            }
        }
    }
}
