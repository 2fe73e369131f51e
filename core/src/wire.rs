//! Normalization rules shared by every wire/model mapping.
//!
//! Reading: null or absent optional strings become `""`, and list fields that
//! are not JSON arrays become empty. Writing: empty strings go out as `null`.

use serde::Serializer;
use serde_json::Value;

pub(crate) fn text_or_empty(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Keep the string elements of an array; anything else is an empty list.
pub(crate) fn string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn empty_as_null<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_empty() {
        serializer.serialize_none()
    } else {
        serializer.serialize_some(value)
    }
}
