//! Query-string assembly for list endpoints.

use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the unreserved set of RFC 3986.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Ordered `key=value` pairs; absent values are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl Display) -> &mut Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn push_opt<V: Display>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Skips `None` and empty strings, the way blank filter inputs are dropped.
    pub fn push_text(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `path` alone when empty, `path?k=v&...` otherwise.
    pub fn append_to(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_string();
        }
        let encoded: Vec<String> = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, QUERY_VALUE)))
            .collect();
        format!("{path}?{}", encoded.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_leaves_path_untouched() {
        assert_eq!(Query::new().append_to("/api/v1/tasks"), "/api/v1/tasks");
    }

    #[test]
    fn values_are_percent_encoded_in_order() {
        let mut query = Query::new();
        query
            .push("skip", 0)
            .push_text("assignee", Some("山田 太郎"))
            .push_text("name", Some(""))
            .push_opt::<i64>("limit", None)
            .push("project_ids", "1,2");
        assert_eq!(
            query.append_to("/api/v1/projects"),
            "/api/v1/projects?skip=0&assignee=%E5%B1%B1%E7%94%B0%20%E5%A4%AA%E9%83%8E&project_ids=1%2C2"
        );
    }
}
