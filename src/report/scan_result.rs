//! Canonical per-scanner outcome record.

use crate::error::ContractViolation;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Outcome of one scanner run.
///
/// A scanner adapter owns its `ScanResult` for the duration of the run, appends
/// info, warnings, errors and dependencies, sets the verdict exactly once and
/// then moves the result into a [`Report`](crate::Report).
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    scanner_name: String,
    verdict: Option<bool>,
    info: Map<String, Value>,
    warn: Map<String, Value>,
    errors: Vec<Map<String, Value>>,
    dependencies: Vec<Value>,
    running_time: Option<f64>,
}

impl ScanResult {
    pub fn new(scanner_name: impl Into<String>) -> Self {
        Self {
            scanner_name: scanner_name.into(),
            verdict: None,
            info: Map::new(),
            warn: Map::new(),
            errors: Vec::new(),
            dependencies: Vec::new(),
            running_time: None,
        }
    }

    pub fn scanner_name(&self) -> &str {
        &self.scanner_name
    }

    /// Append `value` to the info category, creating the category if needed.
    pub fn record_info(&mut self, category: impl Into<String>, value: impl Into<Value>) {
        append(&mut self.info, category.into(), value.into());
    }

    /// Append `value` to the warning category, creating the category if needed.
    pub fn record_warning(&mut self, category: impl Into<String>, value: impl Into<Value>) {
        append(&mut self.warn, category.into(), value.into());
    }

    /// Append a scanner-local error. Errors are data and never change the verdict.
    ///
    /// Non-object values are stored as `{"message": value}`.
    pub fn record_error(&mut self, fields: impl Into<Value>) {
        self.errors.push(into_record(fields.into()));
    }

    pub fn record_dependency(&mut self, info: impl Into<Value>) {
        self.dependencies.push(info.into());
    }

    /// Store the elapsed running time, rounded to hundredths of a second.
    pub fn set_running_time(&mut self, elapsed: Duration) {
        self.running_time = Some((elapsed.as_secs_f64() * 100.0).round() / 100.0);
    }

    pub fn mark_pass(&mut self) -> Result<(), ContractViolation> {
        self.set_verdict(true)
    }

    pub fn mark_fail(&mut self) -> Result<(), ContractViolation> {
        self.set_verdict(false)
    }

    fn set_verdict(&mut self, passed: bool) -> Result<(), ContractViolation> {
        if self.verdict.is_some() {
            return Err(ContractViolation::VerdictAlreadySet {
                scanner: self.scanner_name.clone(),
            });
        }
        debug!(scanner = %self.scanner_name, passed, "Scan verdict recorded");
        self.verdict = Some(passed);
        Ok(())
    }

    pub fn passed(&self) -> Result<bool, ContractViolation> {
        self.verdict.ok_or_else(|| ContractViolation::VerdictUnset {
            scanner: self.scanner_name.clone(),
        })
    }

    pub fn info(&self) -> &Map<String, Value> {
        &self.info
    }

    pub fn warn(&self) -> &Map<String, Value> {
        &self.warn
    }

    /// Entries recorded under one info category, in insertion order.
    pub fn info_entries(&self, category: &str) -> &[Value] {
        entries(&self.info, category)
    }

    /// Entries recorded under one warning category, in insertion order.
    pub fn warn_entries(&self, category: &str) -> &[Value] {
        entries(&self.warn, category)
    }

    pub fn errors(&self) -> &[Map<String, Value>] {
        &self.errors
    }

    pub fn dependencies(&self) -> &[Value] {
        &self.dependencies
    }

    /// Running time in seconds, if the adapter recorded one.
    pub fn running_time(&self) -> Option<f64> {
        self.running_time
    }

    /// Structured form of this result, as emitted under `scans` in a report.
    pub fn to_h(&self) -> Result<Value, ContractViolation> {
        Ok(self.to_value(self.passed()?))
    }

    pub(crate) fn to_value(&self, passed: bool) -> Value {
        let mut hsh = Map::new();
        hsh.insert(
            "scanner_name".into(),
            Value::from(self.scanner_name.as_str()),
        );
        hsh.insert("passed".into(), Value::Bool(passed));
        hsh.insert("warn".into(), Value::Object(self.warn.clone()));
        hsh.insert("info".into(), Value::Object(self.info.clone()));
        hsh.insert(
            "errors".into(),
            Value::Array(self.errors.iter().cloned().map(Value::Object).collect()),
        );
        if !self.dependencies.is_empty() {
            hsh.insert(
                "dependencies".into(),
                Value::Array(self.dependencies.clone()),
            );
        }
        if let Some(running_time) = self.running_time {
            hsh.insert("running_time".into(), Value::from(running_time));
        }
        Value::Object(hsh)
    }
}

fn append(categories: &mut Map<String, Value>, category: String, value: Value) {
    let slot = categories
        .entry(category)
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(list) = slot {
        list.push(value);
    }
}

fn entries<'a>(categories: &'a Map<String, Value>, category: &str) -> &'a [Value] {
    match categories.get(category) {
        Some(Value::Array(list)) => list.as_slice(),
        _ => &[],
    }
}

/// Normalize an error payload into a key/value record.
pub(crate) fn into_record(fields: Value) -> Map<String, Value> {
    match fields {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("message".into(), other);
            map
        }
    }
}
