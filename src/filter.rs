//! Filter/normalize stage for the orchestrator feed.
//!
//! Only records with a non-blank `github` handle survive. The handle is
//! emitted exactly as received; the profile URL is built from the record's
//! `id`.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, SpotlightError};
use crate::models::{VipEntry, VipInfo};

/// Check that the payload is a sequence and borrow its records.
pub fn ensure_sequence<'a>(payload: &'a Value, origin: &str) -> Result<&'a [Value]> {
    match payload {
        Value::Array(items) => Ok(items.as_slice()),
        other => Err(SpotlightError::MalformedResponse {
            origin: origin.to_string(),
            detail: format!("expected a JSON array, got {}", kind(other)),
        }),
    }
}

/// The record's `github` handle when it is a string with non-whitespace content.
pub fn github_handle(record: &Value) -> Option<&str> {
    record
        .get("github")
        .and_then(Value::as_str)
        .filter(|handle| !handle.trim().is_empty())
}

/// `{explorer_url}/accounts/{id}/orchestrating`. A record without a usable
/// `id` cannot be linked and fails the whole payload.
pub fn profile_url(explorer_url: &str, record: &Value, origin: &str) -> Result<String> {
    let id = match record.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        other => {
            return Err(SpotlightError::MalformedResponse {
                origin: origin.to_string(),
                detail: format!(
                    "record for {:?} has no usable id (got {})",
                    github_handle(record).unwrap_or_default(),
                    other.map(kind).unwrap_or("nothing")
                ),
            });
        }
    };
    Ok(format!(
        "{}/accounts/{id}/orchestrating",
        explorer_url.trim_end_matches('/')
    ))
}

/// List variant: `[{github, profile_url}]` in payload order.
pub fn vip_entries(records: &[Value], explorer_url: &str, origin: &str) -> Result<Vec<VipEntry>> {
    records
        .iter()
        .filter_map(|record| {
            let handle = github_handle(record)?;
            Some(profile_url(explorer_url, record, origin).map(|profile_url| VipEntry {
                github: handle.to_string(),
                profile_url,
            }))
        })
        .collect()
}

/// Keyed variant: `{login: {name, url}}`. A repeated handle keeps its first
/// position and takes the later record's values.
pub fn vip_index(
    records: &[Value],
    explorer_url: &str,
    origin: &str,
) -> Result<IndexMap<String, VipInfo>> {
    records
        .iter()
        .filter_map(|record| {
            let handle = github_handle(record)?;
            let info = profile_url(explorer_url, record, origin).map(|url| VipInfo {
                name: record
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                url,
            });
            Some(info.map(|info| (handle.to_string(), info)))
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
