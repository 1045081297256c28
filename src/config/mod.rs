//! Export configuration.
//!
//! Lists the destinations a report goes to and how delivery failures are
//! handled. Loaded from YAML, JSON or TOML.

mod error;
mod loading;
mod types;

pub use error::ConfigError;
pub use loading::CONFIG_FILE_NAMES;
pub use types::ExportConfig;
