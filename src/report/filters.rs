//! Post-render filter hooks.
//!
//! Deployments use these to redact or augment a report without touching the
//! renderers. Every hook defaults to the identity transform.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type HashFilter = dyn Fn(Value) -> Value + Send + Sync;
type StringFilter = dyn Fn(String) -> String + Send + Sync;

#[derive(Clone, Default)]
pub struct ReportFilters {
    hash: Option<Arc<HashFilter>>,
    sarif: Option<Arc<StringFilter>>,
    text: Option<Arc<StringFilter>>,
}

impl ReportFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform applied to the structured report before JSON/YAML serialization.
    pub fn with_hash_filter(
        mut self,
        filter: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.hash = Some(Arc::new(filter));
        self
    }

    /// Transform applied to the serialized SARIF log (plain and diff).
    pub fn with_sarif_filter(
        mut self,
        filter: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        self.sarif = Some(Arc::new(filter));
        self
    }

    /// Transform applied to the tabular text report.
    pub fn with_text_filter(
        mut self,
        filter: impl Fn(String) -> String + Send + Sync + 'static,
    ) -> Self {
        self.text = Some(Arc::new(filter));
        self
    }

    pub fn apply_hash(&self, hsh: Value) -> Value {
        match &self.hash {
            Some(filter) => filter(hsh),
            None => hsh,
        }
    }

    pub fn apply_sarif(&self, sarif: String) -> String {
        match &self.sarif {
            Some(filter) => filter(sarif),
            None => sarif,
        }
    }

    pub fn apply_text(&self, text: String) -> String {
        match &self.text {
            Some(filter) => filter(text),
            None => text,
        }
    }
}

impl fmt::Debug for ReportFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportFilters")
            .field("hash", &self.hash.is_some())
            .field("sarif", &self.sarif.is_some())
            .field("text", &self.text.is_some())
            .finish()
    }
}
