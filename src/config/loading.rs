use std::fs;
use std::path::Path;
use tracing::debug;

use super::error::ConfigError;
use super::types::ExportConfig;

/// Files searched for in a project root, in order.
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    ".salus-report.yaml",
    ".salus-report.yml",
    ".salus-report.json",
    ".salus-report.toml",
];

impl ExportConfig {
    /// Load a configuration file, choosing the parser by extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            "json" => serde_json::from_str(&content).map_err(|source| ConfigError::ParseJson {
                path: path.to_path_buf(),
                source,
            }),
            "toml" => toml::from_str(&content).map_err(|source| ConfigError::ParseToml {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// Load the first config file found in `project_root`.
    ///
    /// Falls back to the default (no destinations) when none exists. A file
    /// that exists but cannot be parsed is an error.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let path = project_root.join(name);
            if path.exists() {
                debug!(path = %path.display(), "Loading export config");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }
}
