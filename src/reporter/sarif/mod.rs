//! SARIF 2.1.0 rendering.
//!
//! Every scan whose scanner has a registered [`IssueNormalizer`] becomes one
//! run. Scans without a normalizer are left out of the log.

pub mod diff;
pub mod normalizer;
pub mod semgrep;

pub use diff::SarifBaseline;
pub use normalizer::{CanonicalIssue, IssueNormalizer, NormalizerRegistry, default_sarif_level};
pub use semgrep::SemgrepNormalizer;

use crate::error::RenderResult;
use crate::report::{Report, ReportFilters, ScanEntry};
use crate::reporter::Reporter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

pub const SARIF_VERSION: &str = "2.1.0";
pub const SARIF_SCHEMA: &str =
    "https://docs.oasis-open.org/sarif/sarif/v2.1.0/csprd01/schemas/sarif-schema-2.1.0";
const SRCROOT: &str = "%SRCROOT%";
const RESERVED_KEYS: [&str; 3] = ["version", "$schema", "runs"];

/// SARIF render settings carried by a destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SarifOptions {
    /// Emitted as `originalUriBaseIds.%SRCROOT%`; artifact uris become relative to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    /// Previously rendered SARIF log; used by the diff format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Value>,
    /// Extra top-level fields merged into the log envelope.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct SarifLog {
    pub version: &'static str,
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub runs: Vec<SarifRun>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
    pub invocations: Vec<SarifInvocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_uri_base_ids: Option<BTreeMap<String, SarifArtifactLocation>>,
}

#[derive(Debug, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub full_description: SarifMessage,
    pub help_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub rule_index: usize,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_base_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
    pub start_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<SarifMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifInvocation {
    pub execution_successful: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_execution_notifications: Vec<SarifNotification>,
}

#[derive(Debug, Serialize)]
pub struct SarifNotification {
    pub descriptor: SarifDescriptor,
    pub level: String,
    pub message: SarifMessage,
}

#[derive(Debug, Serialize)]
pub struct SarifDescriptor {
    pub id: String,
}

pub struct SarifReporter {
    registry: NormalizerRegistry,
    options: SarifOptions,
    diff: bool,
}

impl SarifReporter {
    pub fn new(options: SarifOptions) -> Self {
        Self {
            registry: NormalizerRegistry::default(),
            options,
            diff: false,
        }
    }

    /// Reporter that leaves out issues already present in `options.baseline`.
    pub fn diff(options: SarifOptions) -> Self {
        Self {
            diff: true,
            ..Self::new(options)
        }
    }

    pub fn with_registry(mut self, registry: NormalizerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn build_log(&self, report: &Report) -> RenderResult<SarifLog> {
        let baseline = if self.diff {
            self.options.baseline.as_ref().map(SarifBaseline::from_log)
        } else {
            None
        };

        let mut runs = Vec::new();
        for entry in report.scans() {
            let scanner = entry.result().scanner_name();
            let Some(normalizer) = self.registry.get(scanner) else {
                debug!(scanner, "No SARIF normalizer registered, skipping scan");
                continue;
            };

            let mut issues = normalizer.normalize(entry.result());
            if let Some(baseline) = &baseline {
                issues.retain(|issue| !baseline.contains(normalizer.tool_name(), issue));
            }
            runs.push(self.build_run(normalizer, entry, &issues)?);
        }

        let extra = self
            .options
            .extra
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(SarifLog {
            version: SARIF_VERSION,
            schema: SARIF_SCHEMA,
            runs,
            extra,
        })
    }

    fn build_run(
        &self,
        normalizer: &dyn IssueNormalizer,
        entry: &ScanEntry,
        issues: &[CanonicalIssue],
    ) -> RenderResult<SarifRun> {
        let uri_base_id = self
            .options
            .source_root
            .as_ref()
            .map(|_| SRCROOT.to_string());

        let rules = issues
            .iter()
            .map(|issue| SarifRule {
                id: issue.id.clone(),
                name: issue.name.clone(),
                full_description: SarifMessage {
                    text: issue.details.clone(),
                },
                help_uri: issue.help_url.clone(),
            })
            .collect();

        let results = issues
            .iter()
            .enumerate()
            .map(|(rule_index, issue)| SarifResult {
                rule_id: issue.id.clone(),
                rule_index,
                level: normalizer.sarif_level(&issue.level).to_string(),
                message: SarifMessage {
                    text: issue.details.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: issue.uri.clone(),
                            uri_base_id: uri_base_id.clone(),
                        },
                        region: SarifRegion {
                            start_line: issue.start_line.max(1),
                            start_column: issue.start_column.max(1),
                            snippet: issue
                                .code
                                .as_ref()
                                .map(|code| SarifMessage { text: code.clone() }),
                        },
                    },
                }],
            })
            .collect();

        let original_uri_base_ids = self.options.source_root.as_ref().map(|root| {
            BTreeMap::from([(
                SRCROOT.to_string(),
                SarifArtifactLocation {
                    uri: root.clone(),
                    uri_base_id: None,
                },
            )])
        });

        Ok(SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: normalizer.tool_name().to_string(),
                    information_uri: normalizer.tool_uri().to_string(),
                    rules,
                },
            },
            results,
            invocations: vec![build_invocation(entry)?],
            original_uri_base_ids,
        })
    }
}

impl Reporter for SarifReporter {
    fn report(&self, report: &Report, filters: &ReportFilters) -> RenderResult<String> {
        let log = self.build_log(report)?;
        Ok(filters.apply_sarif(serde_json::to_string_pretty(&log)?))
    }
}

fn build_invocation(entry: &ScanEntry) -> RenderResult<SarifInvocation> {
    let errors = entry.result().errors();
    let mut notifications = Vec::new();
    if !errors.is_empty() {
        notifications.push(SarifNotification {
            descriptor: SarifDescriptor { id: String::new() },
            level: "error".to_string(),
            message: SarifMessage {
                text: format!(
                    "==== Salus Errors\n{}",
                    serde_json::to_string_pretty(errors)?
                ),
            },
        });
    }

    Ok(SarifInvocation {
        execution_successful: entry.passed(),
        tool_execution_notifications: notifications,
    })
}
