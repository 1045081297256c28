use crate::error::RenderResult;
use crate::report::{Report, ReportFilters};
use crate::reporter::Reporter;

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &Report, filters: &ReportFilters) -> RenderResult<String> {
        Ok(serde_json::to_string_pretty(&report.to_h(filters))?)
    }
}

pub struct YamlReporter;

impl YamlReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for YamlReporter {
    fn report(&self, report: &Report, filters: &ReportFilters) -> RenderResult<String> {
        Ok(serde_yaml::to_string(&report.to_h(filters))?)
    }
}
