//! Delivery of rendered reports to HTTP endpoints and local files.

pub mod destination;
pub mod request;
pub mod transport;

pub use destination::{Destination, PostParams, Target};
pub use transport::{HttpTransport, Transport, TransportResponse};

use crate::error::{ExportError, ExportResult, TransportError};
use crate::report::{Report, ReportFilters};
use crate::reporter::sarif::normalizer::NormalizerRegistry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// What to do when one destination fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPolicy {
    /// Attempt every destination, then return the first failure.
    #[default]
    AttemptAll,
    /// Stop at the first failure.
    FailFast,
}

pub struct Exporter<T: Transport = HttpTransport> {
    transport: T,
    policy: ExportPolicy,
    registry: NormalizerRegistry,
}

impl Exporter<HttpTransport> {
    /// Exporter using the default reqwest transport.
    pub fn http() -> Result<Self, TransportError> {
        Ok(Self::new(HttpTransport::new()?))
    }
}

impl<T: Transport> Exporter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: ExportPolicy::default(),
            registry: NormalizerRegistry::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Normalizers used when a destination asks for SARIF.
    pub fn with_registry(mut self, registry: NormalizerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> ExportPolicy {
        self.policy
    }

    /// Deliver an already rendered payload to one destination.
    pub fn deliver(&self, payload: &str, destination: &Destination) -> ExportResult<()> {
        match destination.target() {
            Target::Http(uri) => self.post(uri, payload, destination),
            Target::File(path) => write_file(path, payload),
        }
    }

    /// Render and deliver `report` to each of its configured destinations.
    pub fn export(&self, report: &Report, filters: &ReportFilters) -> ExportResult<()> {
        self.export_to(report, report.report_uris(), filters)
    }

    /// Render and deliver `report` to `destinations`, in order.
    ///
    /// Each destination is rendered and delivered on its own; a failure never
    /// affects what another destination receives.
    pub fn export_to(
        &self,
        report: &Report,
        destinations: &[Destination],
        filters: &ReportFilters,
    ) -> ExportResult<()> {
        let mut first_failure = None;

        for destination in destinations {
            if let Err(e) = self.render_and_deliver(report, destination, filters) {
                warn!(destination = %e.destination(), error = %e, "Report delivery failed");
                if self.policy == ExportPolicy::FailFast {
                    return Err(e);
                }
                if first_failure.is_none() {
                    first_failure = Some(e);
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn render_and_deliver(
        &self,
        report: &Report,
        destination: &Destination,
        filters: &ReportFilters,
    ) -> ExportResult<()> {
        let mut options = destination.render_options();
        options.registry = self.registry.clone();
        let payload = report
            .render(destination.format, &options, filters)
            .map_err(|source| ExportError::Render {
                uri: destination.uri.clone(),
                source,
            })?;
        self.deliver(&payload, destination)
    }

    fn post(&self, uri: &str, payload: &str, destination: &Destination) -> ExportResult<()> {
        let format = destination.format;
        let body = request::build_body(payload, format, destination.post.as_ref()).map_err(
            |source| ExportError::Render {
                uri: uri.to_string(),
                source,
            },
        )?;
        let headers = [
            ("Content-Type", format.content_type()),
            ("X-Scanner", format.x_scanner()),
        ];

        debug!(uri, format = %format, bytes = body.len(), "Posting report");
        let response = self
            .transport
            .post(uri, &headers, body.into_bytes())
            .map_err(|e| ExportError::Transport {
                uri: uri.to_string(),
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(ExportError::HttpStatus {
                uri: uri.to_string(),
                status: response.status,
            });
        }

        info!(uri, status = response.status, "Report delivered");
        Ok(())
    }
}

fn write_file(path: &Path, payload: &str) -> ExportResult<()> {
    fs::write(path, payload).map_err(|source| ExportError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ScanResult;
    use crate::reporter::ReportFormat;
    use crate::test_utils::fixtures::{
        FindingListNormalizer, RecordingTransport, eva_report, passing_scan,
    };
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn test_deliver_posts_with_format_headers() {
        let exporter = Exporter::new(RecordingTransport::replying(202));
        let destination = Destination::new("https://nerv.tk3/salus-report", ReportFormat::Sarif);

        exporter.deliver("{}", &destination).unwrap();

        let requests = exporter.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].uri, "https://nerv.tk3/salus-report");
        assert_eq!(requests[0].header("Content-Type"), Some("application/json"));
        assert_eq!(requests[0].header("X-Scanner"), Some("salus_sarif"));
        assert_eq!(requests[0].body, "{}");
    }

    #[test]
    fn test_deliver_wraps_body() {
        let exporter = Exporter::new(RecordingTransport::replying(200));
        let post = PostParams::new("salus_report").with_param("repo", "Random Repo");
        let destination = Destination::new("http://localhost/report", ReportFormat::Json)
            .with_post(post);

        exporter
            .deliver("{\"passed\": true}", &destination)
            .unwrap();

        let requests = exporter.transport().requests();
        let body: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body["repo"], "Random Repo");
        assert_eq!(body["salus_report"]["passed"], true);
    }

    #[test]
    fn test_non_2xx_is_http_status_error() {
        let exporter = Exporter::new(RecordingTransport::replying(404));
        let destination = Destination::new("https://nerv.tk3/salus-report", ReportFormat::Json);

        let err = exporter.deliver("{}", &destination).unwrap_err();
        match &err {
            ExportError::HttpStatus { uri, status } => {
                assert_eq!(uri, "https://nerv.tk3/salus-report");
                assert_eq!(*status, 404);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "Salus report to https://nerv.tk3/salus-report had response status 404."
        );
    }

    #[test]
    fn test_transport_failure_is_wrapped() {
        let exporter = Exporter::new(RecordingTransport::failing("connection reset"));
        let destination = Destination::new("https://nerv.tk3/salus-report", ReportFormat::Txt);

        let err = exporter.deliver("report", &destination).unwrap_err();
        match err {
            ExportError::Transport { uri, message } => {
                assert_eq!(uri, "https://nerv.tk3/salus-report");
                assert_eq!(message, "connection reset");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_deliver_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        let destination = Destination::new(path.display().to_string(), ReportFormat::Txt);

        Exporter::new(RecordingTransport::replying(200))
            .deliver("hello", &destination)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_missing_parent_directory_is_write_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let destination = Destination::new(path.display().to_string(), ReportFormat::Json);

        let err = Exporter::new(RecordingTransport::replying(200))
            .deliver("{}", &destination)
            .unwrap_err();

        assert!(matches!(err, ExportError::WriteFile { .. }));
        assert_eq!(err.destination(), path.display().to_string());
        assert!(err.to_string().starts_with("Cannot write file "));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_attempt_all_tries_every_destination() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("report.json");
        let destinations = vec![
            Destination::new(
                dir.path().join("nope").join("a.json").display().to_string(),
                ReportFormat::Json,
            ),
            Destination::new("https://nerv.tk3/first", ReportFormat::Yaml),
            Destination::new(good.display().to_string(), ReportFormat::Json),
        ];
        let exporter = Exporter::new(RecordingTransport::replying(500));

        let err = exporter
            .export_to(&eva_report(), &destinations, &ReportFilters::new())
            .unwrap_err();

        assert!(matches!(err, ExportError::WriteFile { .. }));
        assert_eq!(exporter.transport().requests().len(), 1);
        assert!(good.exists());
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("report.json");
        let destinations = vec![
            Destination::new("https://nerv.tk3/first", ReportFormat::Json),
            Destination::new(good.display().to_string(), ReportFormat::Json),
        ];
        let exporter =
            Exporter::new(RecordingTransport::replying(503)).with_policy(ExportPolicy::FailFast);

        let err = exporter
            .export_to(&eva_report(), &destinations, &ReportFilters::new())
            .unwrap_err();

        assert!(matches!(err, ExportError::HttpStatus { status: 503, .. }));
        assert!(!good.exists());
    }

    #[test]
    fn test_export_uses_report_destinations() {
        let report = eva_report().with_report_uris(vec![
            Destination::new("https://nerv.tk3/json", ReportFormat::Json),
            Destination::new("https://nerv.tk3/txt", ReportFormat::Txt).with_verbose(true),
        ]);
        let exporter = Exporter::new(RecordingTransport::replying(200));

        report
            .export_report(&exporter, &ReportFilters::new())
            .unwrap();

        let requests = exporter.transport().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].header("Content-Type"), Some("application/json"));
        assert_eq!(requests[1].header("Content-Type"), Some("text/plain"));
        assert!(requests[1].body.contains("==== DerpScanner: FAILED"));
    }

    #[test]
    fn test_sarif_export_uses_registered_normalizer() {
        let mut trivy = ScanResult::new("Trivy");
        trivy.record_info("findings", "CVE-2024-0001");
        trivy.record_info("findings", "CVE-2024-0001");
        trivy.mark_fail().unwrap();
        let mut report = eva_report();
        report.add_scan_result(trivy, true).unwrap();
        report
            .add_scan_result(passing_scan("Semgrep"), true)
            .unwrap();

        let mut registry = NormalizerRegistry::default();
        registry.register("Trivy", FindingListNormalizer);
        let exporter = Exporter::new(RecordingTransport::replying(200)).with_registry(registry);
        let destination = Destination::new("https://nerv.tk3/sarif", ReportFormat::Sarif);

        exporter
            .export_to(&report, &[destination], &ReportFilters::new())
            .unwrap();

        let requests = exporter.transport().requests();
        let sarif: Value = serde_json::from_str(&requests[0].body).unwrap();
        let runs = sarif["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0]["tool"]["driver"]["name"], "FindingList");
        assert_eq!(runs[0]["results"].as_array().unwrap().len(), 1);
        assert_eq!(runs[0]["results"][0]["ruleId"], "CVE-2024-0001");
        assert_eq!(runs[0]["results"][0]["level"], "error");
    }

    #[test]
    fn test_default_registry_ignores_unknown_scanners() {
        let mut trivy = ScanResult::new("Trivy");
        trivy.record_info("findings", "CVE-2024-0001");
        trivy.mark_fail().unwrap();
        let mut report = Report::new();
        report.add_scan_result(trivy, true).unwrap();
        let exporter = Exporter::new(RecordingTransport::replying(200));
        let destination = Destination::new("https://nerv.tk3/sarif", ReportFormat::Sarif);

        exporter
            .export_to(&report, &[destination], &ReportFilters::new())
            .unwrap();

        let requests = exporter.transport().requests();
        let sarif: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert!(sarif["runs"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: ExportPolicy = serde_json::from_str("\"fail_fast\"").unwrap();
        assert_eq!(policy, ExportPolicy::FailFast);
        assert_eq!(ExportPolicy::default(), ExportPolicy::AttemptAll);
    }
}
