//! HTTP request bodies.

use super::destination::PostParams;
use crate::error::RenderResult;
use crate::reporter::ReportFormat;
use serde_json::Value;

/// Body posted for `payload`.
///
/// Without post parameters the payload is sent as is. Otherwise the payload is
/// stored under `param_name` next to the additional parameters; structured
/// payloads are embedded as values, text as a string.
pub fn build_body(
    payload: &str,
    format: ReportFormat,
    post: Option<&PostParams>,
) -> RenderResult<String> {
    let Some(post) = post else {
        return Ok(payload.to_string());
    };

    let mut body = post.additional_params.clone();
    body.insert(post.param_name.clone(), embedded(payload, format));

    match format {
        ReportFormat::Yaml => Ok(serde_yaml::to_string(&body)?),
        _ => Ok(serde_json::to_string_pretty(&body)?),
    }
}

fn embedded(payload: &str, format: ReportFormat) -> Value {
    let parsed = if !format.is_structured() {
        None
    } else if format == ReportFormat::Yaml {
        serde_yaml::from_str(payload).ok()
    } else {
        serde_json::from_str(payload).ok()
    };
    parsed.unwrap_or_else(|| Value::String(payload.to_string()))
}
