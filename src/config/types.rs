use crate::error::TransportError;
use crate::export::{Destination, ExportPolicy, Exporter, HttpTransport};
use crate::report::Report;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub report_uris: Vec<Destination>,
    pub export_policy: ExportPolicy,
    /// Seconds before an HTTP delivery is abandoned. Defaults to 30.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ExportConfig {
    /// Attach the configured destinations to `report`.
    pub fn apply(&self, report: Report) -> Report {
        report.with_report_uris(self.report_uris.clone())
    }

    pub fn exporter(&self) -> Result<Exporter<HttpTransport>, TransportError> {
        let transport = match self.timeout_secs {
            Some(secs) => HttpTransport::with_timeout(Duration::from_secs(secs))?,
            None => HttpTransport::new()?,
        };
        Ok(Exporter::new(transport).with_policy(self.export_policy))
    }
}
