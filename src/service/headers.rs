use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{GitbeakerError, Result};

pub type Headers = IndexMap<String, String>;

/// Collects header pairs in insertion order until `finish` hands out the
/// final map.
#[derive(Debug, Default)]
pub struct HeaderSet {
    entries: Headers,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.entries.insert(name.to_owned(), value.into());
        self
    }

    /// Appends to an existing header, starting from `prefix` when the header
    /// is not set yet.
    pub fn append(&mut self, name: &str, prefix: &str, value: &str) -> &mut Self {
        self.entries
            .entry(name.to_owned())
            .or_insert_with(|| prefix.to_owned())
            .push_str(value);
        self
    }

    pub fn finish(self) -> Headers {
        self.entries
    }
}

/// Converts a header table into a `reqwest` header map.
///
/// # Errors
///
/// Returns [`GitbeakerError::InvalidHeader`] if a name or value is not legal
/// in an HTTP header.
pub fn to_header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| GitbeakerError::InvalidHeader(format!("{name}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| GitbeakerError::InvalidHeader(format!("{name}: {e}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let mut set = HeaderSet::new();
        set.insert("user-agent", "gitbeaker")
            .insert("private-token", "abc");

        let headers = set.finish();

        let names: Vec<_> = headers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["user-agent", "private-token"]);
    }

    #[test]
    fn test_append_starts_from_prefix() {
        let mut set = HeaderSet::new();
        set.append("cookie", "cookie: ", "a=1; ");
        set.append("cookie", "cookie: ", "b=2; ");

        let headers = set.finish();

        assert_eq!(headers["cookie"], "cookie: a=1; b=2; ");
    }

    #[test]
    fn test_to_header_map_is_case_insensitive() {
        let mut set = HeaderSet::new();
        set.insert("X-CSRF-Token", "csrf").insert("Sudo", "42");

        let map = to_header_map(&set.finish()).unwrap();

        assert_eq!(map.get("x-csrf-token").unwrap(), "csrf");
        assert_eq!(map.get("sudo").unwrap(), "42");
    }

    #[test]
    fn test_to_header_map_rejects_invalid_value() {
        let mut set = HeaderSet::new();
        set.insert("private-token", "line\nbreak");

        let err = to_header_map(&set.finish()).unwrap_err();

        assert!(matches!(err, GitbeakerError::InvalidHeader(_)));
    }
}
