//! Convenience builder for HTTP query strings.
//!
//! Pairs keep their insertion order, and values are percent-encoded exactly once
//! when the query is rendered. Only RFC 3986 unreserved characters are left
//! unencoded.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Render the pairs as `key=value&key=value`, percent-encoding the values.
    ///
    /// Returns `None` when no parameter was added so callers can omit the `?`.
    #[must_use]
    pub fn encode(&self) -> Option<String> {
        if self.pairs.is_empty() {
            return None;
        }

        let rendered = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        Some(rendered)
    }
}
