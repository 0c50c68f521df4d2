//! Projection and filtering of upstream records into caller-facing shapes.

use serde::Serialize;
use serde_json::Value;

use crate::fields::{LANGUAGE_PROPS, MEETING_PROPS};
use crate::reconcile::value_to_text;

/// Public shape of one meeting record. Built per response, never persisted.
#[derive(Debug, Serialize)]
pub struct MeetingRecord {
    pub id: Option<String>,
    pub meeting: Option<String>,
    pub languages: Option<String>,
    /// Full property map, for callers that need fields we do not project.
    pub properties: Value,
}

/// Pick the first non-empty property by the fixed priority list.
/// The structured-record mirror of [`crate::reconcile::resolve`].
pub fn pick(properties: &Value, priority: &[&str]) -> Option<String> {
    priority
        .iter()
        .filter_map(|key| properties.get(*key).and_then(value_to_text))
        .next()
}

/// Project one upstream CRM record into its public shape.
pub fn project_meeting(record: &Value) -> MeetingRecord {
    let properties = record.get("properties").cloned().unwrap_or(Value::Null);
    MeetingRecord {
        id: record.get("id").and_then(value_to_text),
        meeting: pick(&properties, MEETING_PROPS),
        languages: pick(&properties, LANGUAGE_PROPS),
        properties,
    }
}

/// Case-insensitive substring containment, OR-combined over `candidates`.
/// An absent value matches nothing.
pub fn contains_any(value: Option<&str>, candidates: &[String]) -> bool {
    let Some(value) = value else {
        return false;
    };
    let haystack = value.to_lowercase();
    candidates
        .iter()
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

/// Apply caller filters to projected records. Distinct filter fields are
/// AND-combined; relative record order is preserved, never re-sorted.
pub fn apply_filters(
    records: Vec<MeetingRecord>,
    meeting: Option<&str>,
    languages: &[String],
) -> Vec<MeetingRecord> {
    records
        .into_iter()
        .filter(|record| match meeting {
            Some(needle) => contains_any(record.meeting.as_deref(), &[needle.to_string()]),
            None => true,
        })
        .filter(|record| {
            languages.is_empty() || contains_any(record.languages.as_deref(), languages)
        })
        .collect()
}

/// Split a comma-separated filter parameter into trimmed non-empty values.
pub fn split_filter_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
