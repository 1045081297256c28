//! Aggregates per-scanner results into one report, decides the overall verdict,
//! renders the report as JSON, YAML, text or SARIF and delivers it to HTTP
//! endpoints or local files.

pub mod config;
pub mod error;
pub mod export;
pub mod report;
pub mod reporter;

#[cfg(test)]
pub mod test_utils;

pub use config::{ConfigError, ExportConfig};
pub use error::{
    ContractViolation, ExportError, ExportResult, RenderError, RenderResult, ReportError,
    TransportError,
};
pub use export::{Destination, ExportPolicy, Exporter, HttpTransport, PostParams, Transport};
pub use report::{Report, ReportFilters, ScanEntry, ScanResult};
pub use reporter::{
    RenderOptions, ReportFormat, Reporter, json::JsonReporter, json::YamlReporter,
    sarif::IssueNormalizer, sarif::NormalizerRegistry, sarif::SarifOptions, sarif::SarifReporter,
    terminal::TerminalReporter,
};
