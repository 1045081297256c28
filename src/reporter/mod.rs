pub mod json;
pub mod sarif;
pub mod terminal;

use crate::error::RenderResult;
use crate::report::{Report, ReportFilters};
use json::{JsonReporter, YamlReporter};
use sarif::{NormalizerRegistry, SarifOptions, SarifReporter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use terminal::TerminalReporter;

/// Renders a report into one output format, applying that format's filter hook.
pub trait Reporter {
    fn report(&self, report: &Report, filters: &ReportFilters) -> RenderResult<String>;
}

/// Supported output formats. Unknown names are rejected when a destination is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Json,
    Yaml,
    Txt,
    Sarif,
    SarifDiff,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
            ReportFormat::Txt => "txt",
            ReportFormat::Sarif => "sarif",
            ReportFormat::SarifDiff => "sarif_diff",
        }
    }

    /// Content-Type used when posting this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json | ReportFormat::Sarif | ReportFormat::SarifDiff => {
                "application/json"
            }
            ReportFormat::Yaml => "text/x-yaml",
            ReportFormat::Txt => "text/plain",
        }
    }

    /// Value of the `X-Scanner` header used when posting this format.
    pub fn x_scanner(&self) -> &'static str {
        match self {
            ReportFormat::Json | ReportFormat::Yaml | ReportFormat::Txt => "salus",
            ReportFormat::Sarif => "salus_sarif",
            ReportFormat::SarifDiff => "salus_sarif_diff",
        }
    }

    /// Whether the rendered payload is a structured document rather than free text.
    pub fn is_structured(&self) -> bool {
        !matches!(self, ReportFormat::Txt)
    }

    pub fn reporter(&self, options: &RenderOptions) -> Box<dyn Reporter> {
        match self {
            ReportFormat::Json => Box::new(JsonReporter::new()),
            ReportFormat::Yaml => Box::new(YamlReporter::new()),
            ReportFormat::Txt => Box::new(
                TerminalReporter::new(options.verbose).with_colors(options.use_colors),
            ),
            ReportFormat::Sarif => Box::new(
                SarifReporter::new(options.sarif.clone()).with_registry(options.registry.clone()),
            ),
            ReportFormat::SarifDiff => Box::new(
                SarifReporter::diff(options.sarif.clone()).with_registry(options.registry.clone()),
            ),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown report format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for ReportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "yaml" => Ok(ReportFormat::Yaml),
            "txt" => Ok(ReportFormat::Txt),
            "sarif" => Ok(ReportFormat::Sarif),
            "sarif_diff" => Ok(ReportFormat::SarifDiff),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Format-specific render settings.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Inline each scan's info, warnings and errors in the text report.
    pub verbose: bool,
    /// Colour status words in the text report.
    pub use_colors: bool,
    pub sarif: SarifOptions,
    /// Normalizers consulted by the SARIF formats.
    pub registry: NormalizerRegistry,
}
