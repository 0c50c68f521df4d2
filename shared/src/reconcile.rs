//! Reconciliation of loosely-named input fields.
//!
//! Form builders and no-code tools submit payloads whose key names drift:
//! `"age"`, `"Agent age"`, `"Agent age:"`, `"agent_age"`. Each semantic
//! field is resolved by trying an ordered list of known spellings (kept as
//! data in [`crate::fields`]) and taking the first usable value.

use serde_json::{Map, Value};

/// Sentinel value treated as equivalent to absence when the caller's policy
/// asks for it. Intake forms emit it for questions the user skipped.
pub const PENDING_SENTINEL: &str = "pending";

/// Resolve one semantic field from `inputs`.
///
/// Candidate keys are tried in order; the first whose value normalizes to a
/// non-empty string wins. Values are always trimmed, and empty-after-trim
/// counts as absent. With `exclude_pending`, a value equal to
/// [`PENDING_SENTINEL`] (case-insensitively) also counts as absent.
pub fn resolve(
    inputs: &Map<String, Value>,
    candidates: &[&str],
    exclude_pending: bool,
) -> Option<String> {
    for key in candidates {
        let Some(value) = inputs.get(*key) else {
            continue;
        };
        let Some(text) = value_to_text(value) else {
            continue;
        };
        if exclude_pending && text.eq_ignore_ascii_case(PENDING_SENTINEL) {
            continue;
        }
        return Some(text);
    }
    None
}

/// Normalize a JSON value to a trimmed non-empty string, or absence.
/// Objects, arrays, and nulls never resolve.
pub fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
