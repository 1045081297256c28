use crate::reporter::sarif::SarifOptions;
use crate::reporter::{RenderOptions, ReportFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Where and how a rendered report is delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub uri: String,
    pub format: ReportFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostParams>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sarif_options: Option<SarifOptions>,
}

/// Wraps the payload in an object before posting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostParams {
    #[serde(rename = "salus_report_param_name")]
    pub param_name: String,
    #[serde(default)]
    pub additional_params: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Http(&'a str),
    File(&'a Path),
}

impl Destination {
    pub fn new(uri: impl Into<String>, format: ReportFormat) -> Self {
        Self {
            uri: uri.into(),
            format,
            post: None,
            verbose: false,
            sarif_options: None,
        }
    }

    pub fn with_post(mut self, post: PostParams) -> Self {
        self.post = Some(post);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_sarif_options(mut self, options: SarifOptions) -> Self {
        self.sarif_options = Some(options);
        self
    }

    /// HTTP for `http://` and `https://` uris, a local file otherwise.
    pub fn target(&self) -> Target<'_> {
        if self.uri.starts_with("http://") || self.uri.starts_with("https://") {
            Target::Http(&self.uri)
        } else {
            Target::File(Path::new(&self.uri))
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            verbose: self.verbose,
            use_colors: false,
            sarif: self.sarif_options.clone().unwrap_or_default(),
            ..RenderOptions::default()
        }
    }
}

impl PostParams {
    pub fn new(param_name: impl Into<String>) -> Self {
        Self {
            param_name: param_name.into(),
            additional_params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_params.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target() {
        let http = Destination::new("https://nerv.tk3/salus-report", ReportFormat::Json);
        assert_eq!(http.target(), Target::Http("https://nerv.tk3/salus-report"));

        let file = Destination::new("./out/report.json", ReportFormat::Json);
        assert_eq!(file.target(), Target::File(Path::new("./out/report.json")));

        let file_scheme = Destination::new("file://report.json", ReportFormat::Json);
        assert!(matches!(file_scheme.target(), Target::File(_)));
    }

    #[test]
    fn test_deserialize_full_directive() {
        let destination: Destination = serde_json::from_value(json!({
            "uri": "https://nerv.tk3/salus-report",
            "format": "sarif",
            "verbose": true,
            "post": {
                "salus_report_param_name": "sarif_report",
                "additional_params": {"repo": "Random Repo"}
            },
            "sarif_options": {"source_root": "/src"}
        }))
        .unwrap();

        assert_eq!(destination.format, ReportFormat::Sarif);
        assert!(destination.verbose);
        let post = destination.post.as_ref().unwrap();
        assert_eq!(post.param_name, "sarif_report");
        assert_eq!(post.additional_params["repo"], "Random Repo");
        assert_eq!(
            destination.render_options().sarif.source_root.as_deref(),
            Some("/src")
        );
    }

    #[test]
    fn test_deserialize_minimal_directive() {
        let destination: Destination =
            serde_yaml::from_str("uri: report.txt\nformat: txt\n").unwrap();
        assert_eq!(
            destination,
            Destination::new("report.txt", ReportFormat::Txt)
        );
        let options = destination.render_options();
        assert!(!options.verbose);
        assert!(!options.use_colors);
        assert_eq!(options.sarif, SarifOptions::default());
    }

    #[test]
    fn test_deserialize_rejects_unknown_format() {
        let result = serde_yaml::from_str::<Destination>("uri: report.html\nformat: html\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_requires_uri() {
        let result = serde_json::from_value::<Destination>(json!({"format": "json"}));
        assert!(result.is_err());
    }
}
