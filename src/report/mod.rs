//! Report aggregation.
//!
//! A [`Report`] collects the finished [`ScanResult`] of every scanner that ran,
//! together with cross-scanner errors and project metadata, and computes the
//! overall verdict. It is the unit that gets rendered and exported.

pub mod filters;
pub mod scan_result;

pub use filters::ReportFilters;
pub use scan_result::ScanResult;

use crate::error::{ExportResult, RenderResult, ReportError};
use crate::export::{Destination, Exporter, Transport};
use crate::reporter::sarif::SarifOptions;
use crate::reporter::{RenderOptions, ReportFormat};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Version stamped on reports unless overridden.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A scan result as held by a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    result: ScanResult,
    required: bool,
    passed: bool,
}

impl ScanEntry {
    pub fn result(&self) -> &ScanResult {
        &self.result
    }

    /// Whether a failure of this scan fails the whole report.
    pub fn required(&self) -> bool {
        self.required
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    version: String,
    project_name: Option<String>,
    custom_info: Option<Value>,
    config: Option<Value>,
    scans: Vec<ScanEntry>,
    index: HashMap<String, usize>,
    errors: Vec<Map<String, Value>>,
    report_uris: Vec<Destination>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    pub fn new() -> Self {
        Self {
            version: VERSION.to_string(),
            project_name: None,
            custom_info: None,
            config: None,
            scans: Vec::new(),
            index: HashMap::new(),
            errors: Vec::new(),
            report_uris: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn with_custom_info(mut self, custom_info: impl Into<Value>) -> Self {
        self.custom_info = Some(custom_info.into());
        self
    }

    pub fn with_config(mut self, config: impl Into<Value>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Destinations this report is exported to.
    pub fn with_report_uris(mut self, report_uris: Vec<Destination>) -> Self {
        self.report_uris = report_uris;
        self
    }

    /// Add a finished scan result.
    ///
    /// Fails if the result has no verdict yet or if a result for the same
    /// scanner is already present.
    pub fn add_scan_result(
        &mut self,
        result: ScanResult,
        required: bool,
    ) -> Result<(), ReportError> {
        if self.index.contains_key(result.scanner_name()) {
            return Err(ReportError::DuplicateScanner(
                result.scanner_name().to_string(),
            ));
        }
        let passed = result.passed()?;
        debug!(scanner = %result.scanner_name(), required, passed, "Adding scan result");
        self.index
            .insert(result.scanner_name().to_string(), self.scans.len());
        self.scans.push(ScanEntry {
            result,
            required,
            passed,
        });
        Ok(())
    }

    /// Add or overwrite the result for a scanner that ran again.
    ///
    /// An overwritten entry keeps its original position.
    pub fn replace_scan_result(
        &mut self,
        result: ScanResult,
        required: bool,
    ) -> Result<(), ReportError> {
        let passed = result.passed()?;
        let entry = ScanEntry {
            result,
            required,
            passed,
        };
        match self.index.get(entry.result.scanner_name()) {
            Some(&position) => {
                debug!(scanner = %entry.result.scanner_name(), "Replacing scan result");
                self.scans[position] = entry;
            }
            None => {
                self.index
                    .insert(entry.result.scanner_name().to_string(), self.scans.len());
                self.scans.push(entry);
            }
        }
        Ok(())
    }

    /// Record a cross-scanner error. Non-object values become `{"message": value}`.
    pub fn add_error(&mut self, fields: impl Into<Value>) {
        self.errors.push(scan_result::into_record(fields.into()));
    }

    /// True iff every required scan passed. Vacuously true without scans.
    pub fn passed(&self) -> bool {
        self.scans
            .iter()
            .filter(|entry| entry.required)
            .all(|entry| entry.passed)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    pub fn custom_info(&self) -> Option<&Value> {
        self.custom_info.as_ref()
    }

    pub fn config(&self) -> Option<&Value> {
        self.config.as_ref()
    }

    /// Scan entries in insertion order.
    pub fn scans(&self) -> &[ScanEntry] {
        &self.scans
    }

    pub fn scan(&self, scanner_name: &str) -> Option<&ScanEntry> {
        self.index
            .get(scanner_name)
            .map(|&position| &self.scans[position])
    }

    pub fn errors(&self) -> &[Map<String, Value>] {
        &self.errors
    }

    pub fn report_uris(&self) -> &[Destination] {
        &self.report_uris
    }

    /// Configuration files listed under `config.sources.valid`.
    ///
    /// `None` when the config carries no `sources` section at all.
    pub fn config_sources(&self) -> Option<Vec<&str>> {
        let sources = self.config.as_ref()?.get("sources")?;
        Some(
            sources
                .get("valid")
                .and_then(Value::as_array)
                .map(|valid| valid.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default(),
        )
    }

    /// Structured report after the hash filter has been applied.
    pub fn to_h(&self, filters: &ReportFilters) -> Value {
        filters.apply_hash(self.hash())
    }

    fn hash(&self) -> Value {
        let mut hsh = Map::new();
        hsh.insert("version".into(), Value::from(self.version.as_str()));
        if let Some(name) = &self.project_name {
            hsh.insert("project_name".into(), Value::from(name.as_str()));
        }
        hsh.insert("passed".into(), Value::Bool(self.passed()));

        let scans: Map<String, Value> = self
            .scans
            .iter()
            .map(|entry| {
                (
                    entry.result.scanner_name().to_string(),
                    entry.result.to_value(entry.passed),
                )
            })
            .collect();
        hsh.insert("scans".into(), Value::Object(scans));
        hsh.insert(
            "errors".into(),
            Value::Array(self.errors.iter().cloned().map(Value::Object).collect()),
        );
        if let Some(custom_info) = &self.custom_info {
            hsh.insert("custom_info".into(), custom_info.clone());
        }
        if let Some(config) = &self.config {
            hsh.insert("config".into(), config.clone());
        }
        Value::Object(hsh)
    }

    /// Render this report in `format`.
    pub fn render(
        &self,
        format: ReportFormat,
        options: &RenderOptions,
        filters: &ReportFilters,
    ) -> RenderResult<String> {
        format.reporter(options).report(self, filters)
    }

    pub fn to_json(&self, filters: &ReportFilters) -> RenderResult<String> {
        self.render(ReportFormat::Json, &RenderOptions::default(), filters)
    }

    pub fn to_yaml(&self, filters: &ReportFilters) -> RenderResult<String> {
        self.render(ReportFormat::Yaml, &RenderOptions::default(), filters)
    }

    pub fn to_s(&self, verbose: bool, filters: &ReportFilters) -> RenderResult<String> {
        let options = RenderOptions {
            verbose,
            ..RenderOptions::default()
        };
        self.render(ReportFormat::Txt, &options, filters)
    }

    pub fn to_sarif(&self, sarif: SarifOptions, filters: &ReportFilters) -> RenderResult<String> {
        let options = RenderOptions {
            sarif,
            ..RenderOptions::default()
        };
        self.render(ReportFormat::Sarif, &options, filters)
    }

    /// Deliver this report to every configured destination.
    pub fn export_report<T: Transport>(
        &self,
        exporter: &Exporter<T>,
        filters: &ReportFilters,
    ) -> ExportResult<()> {
        exporter.export(self, filters)
    }
}
