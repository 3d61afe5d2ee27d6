//! Convenience builder for HTTP query parameters.
//!
//! Besides explicit key/value pairs, a builder can be produced from a JSON
//! payload. GET requests carry their payload this way, since the API reads
//! GET input from the query string.

use crate::Error;
use serde_json::Value;
use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: impl Into<String>, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key.into(), value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Display,
    {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Builder-style [`QueryParams::push`].
    #[must_use]
    pub fn with<T: Display>(mut self, key: impl Into<String>, value: T) -> Self {
        self.push(key, value);
        self
    }

    /// Flatten a JSON object into query pairs.
    ///
    /// Strings are used verbatim, numbers and booleans in their JSON text
    /// form, arrays as repeated keys, and nested objects as JSON text. Null
    /// members are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if `payload` is not an object or null.
    pub fn from_payload(payload: &Value) -> Result<Self, Error> {
        let mut params = Self::new();
        match payload {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    params.push_value(key, value);
                }
            }
            other => {
                return Err(Error::validation(format!(
                    "GET payload must be a JSON object, got {other}"
                )));
            }
        }
        Ok(params)
    }

    fn push_value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::String(s) => self.push(key, s),
            Value::Array(items) => {
                for item in items {
                    self.push_value(key, item);
                }
            }
            other => self.push(key, other),
        }
    }

    /// Combine with explicit parameters; keys in `explicit` replace any
    /// pairs with the same key.
    #[must_use]
    pub fn merged_with(mut self, explicit: &Self) -> Self {
        self.pairs
            .retain(|(key, _)| !explicit.pairs.iter().any(|(k, _)| k == key));
        self.pairs.extend(explicit.pairs.iter().cloned());
        self
    }

    /// Borrow the collected key/value pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;
    use serde_json::json;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("name", Option::<String>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn from_payload_flattens_values() {
        let params = QueryParams::from_payload(&json!({
            "name": "web",
            "limit": 10,
            "apply": true,
            "skip": null,
            "tags": ["a", "b"]
        }))
        .unwrap();

        let pairs = params.into_pairs();
        assert!(pairs.contains(&pair("name", "web")));
        assert!(pairs.contains(&pair("limit", "10")));
        assert!(pairs.contains(&pair("apply", "true")));
        assert!(pairs.contains(&pair("tags", "a")));
        assert!(pairs.contains(&pair("tags", "b")));
        assert!(!pairs.iter().any(|(k, _)| k == "skip"));
    }

    #[test]
    fn from_payload_rejects_non_objects() {
        assert!(QueryParams::from_payload(&json!([1, 2])).is_err());
        assert!(QueryParams::from_payload(&json!(null)).unwrap().is_empty());
    }

    #[test]
    fn explicit_params_take_precedence() {
        let payload = QueryParams::new().with("limit", 5).with("query", "lan");
        let explicit = QueryParams::new().with("limit", 50);

        let merged = payload.merged_with(&explicit);
        assert_eq!(merged.pairs(), [pair("query", "lan"), pair("limit", "50")]);
    }
}
