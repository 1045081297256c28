//! Delivery failures.

use std::path::PathBuf;
use thiserror::Error;

use super::RenderError;

/// Uniform delivery failure. Every variant carries the destination it belongs to.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The endpoint answered with a non-2xx status.
    #[error("Salus report to {uri} had response status {status}.")]
    HttpStatus { uri: String, status: u16 },

    /// The request never produced a response.
    #[error("Could not send Salus report to {uri}: {message}")]
    Transport { uri: String, message: String },

    /// The report file could not be written.
    #[error("Cannot write file {} - {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload for this destination could not be rendered.
    #[error("Failed to render Salus report for {uri}: {source}")]
    Render {
        uri: String,
        #[source]
        source: RenderError,
    },
}

/// Failure of the underlying HTTP transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl ExportError {
    /// The URI or path of the destination that failed.
    pub fn destination(&self) -> String {
        match self {
            Self::HttpStatus { uri, .. }
            | Self::Transport { uri, .. }
            | Self::Render { uri, .. } => uri.clone(),
            Self::WriteFile { path, .. } => path.display().to_string(),
        }
    }
}
