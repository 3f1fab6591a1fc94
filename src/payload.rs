//! Defensive accessors over loosely-typed Trakt payloads.
//!
//! Trakt responses are not guaranteed to be field-complete. Every lookup
//! here tolerates a missing key, a `null`, or a value of the wrong type and
//! falls back to a caller-supplied default.

use serde_json::Value;

static NULL: Value = Value::Null;

pub trait PayloadExt {
    /// Nested value at `key`, or `null`.
    fn field(&self, key: &str) -> &Value;

    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str;

    fn u64_or(&self, key: &str, default: u64) -> u64;

    fn f64_or(&self, key: &str, default: f64) -> f64;

    /// Array at `key`, or an empty slice.
    fn list(&self, key: &str) -> &[Value];

    /// Scalar at `key` rendered for display (`"N/A"` style default when absent).
    fn display_or(&self, key: &str, default: &str) -> String;
}

impl PayloadExt for Value {
    fn field(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }

    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(Value::as_u64).unwrap_or(default)
    }

    fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    fn list(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn display_or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }
}
