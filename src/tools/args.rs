//! Argument extraction for tool calls.
//!
//! Arguments arrive as an untyped JSON object. These helpers validate the
//! shapes the tool schemas advertise and report violations as
//! `ToolError::InvalidArgument`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::ToolError;

static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("numeric id pattern is valid"));

fn arg<'a>(args: &'a Value, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

/// Required non-empty string.
pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    let value = arg(args, key)
        .ok_or_else(|| ToolError::InvalidArgument(format!("missing required argument '{}'", key)))?;
    let s = value
        .as_str()
        .ok_or_else(|| ToolError::InvalidArgument(format!("'{}' must be a string", key)))?;
    if s.trim().is_empty() {
        return Err(ToolError::InvalidArgument(format!(
            "'{}' must not be empty",
            key
        )));
    }
    Ok(s)
}

/// Required Trakt ID: a string of digits. Bare JSON integers are accepted too.
pub fn numeric_id(args: &Value, key: &str) -> Result<String, ToolError> {
    let value = arg(args, key)
        .ok_or_else(|| ToolError::InvalidArgument(format!("missing required argument '{}'", key)))?;
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_u64() => n.to_string(),
        _ => {
            return Err(ToolError::InvalidArgument(format!(
                "'{}' must be a numeric Trakt ID string",
                key
            )));
        }
    };
    if !NUMERIC_ID.is_match(&raw) {
        return Err(ToolError::InvalidArgument(format!(
            "'{}' must match ^[0-9]+$ (got '{}')",
            key, raw
        )));
    }
    if raw.parse::<u64>().is_err() {
        return Err(ToolError::InvalidArgument(format!(
            "'{}' is too large to be a Trakt ID (got '{}')",
            key, raw
        )));
    }
    Ok(raw)
}

/// Integer within `[min, max]`; `default` when absent.
pub fn int_in_range(
    args: &Value,
    key: &str,
    min: u32,
    max: u32,
    default: Option<u32>,
) -> Result<u32, ToolError> {
    let value = match (arg(args, key), default) {
        (Some(v), _) => v,
        (None, Some(d)) => return Ok(d),
        (None, None) => {
            return Err(ToolError::InvalidArgument(format!(
                "missing required argument '{}'",
                key
            )));
        }
    };

    let n = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| ToolError::InvalidArgument(format!("'{}' must be an integer", key)))?;

    if n < i64::from(min) || n > i64::from(max) {
        return Err(ToolError::InvalidArgument(format!(
            "'{}' must be between {} and {} (got {})",
            key, min, max, n
        )));
    }
    // In range, so it fits.
    Ok(n as u32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_required_str() {
        let args = json!({"query": "Dark", "blank": "  ", "num": 3});
        assert_eq!(required_str(&args, "query").unwrap(), "Dark");
        assert!(required_str(&args, "blank").is_err());
        assert!(required_str(&args, "num").is_err());
        assert!(required_str(&args, "missing").is_err());
        assert!(required_str(&Value::Null, "query").is_err());
    }

    #[test]
    fn test_numeric_id() {
        assert_eq!(numeric_id(&json!({"id": "123"}), "id").unwrap(), "123");
        assert_eq!(numeric_id(&json!({"id": 456}), "id").unwrap(), "456");
        assert!(numeric_id(&json!({"id": "12a"}), "id").is_err());
        assert!(numeric_id(&json!({"id": ""}), "id").is_err());
        assert!(numeric_id(&json!({"id": "tt0944947"}), "id").is_err());
        assert!(numeric_id(&json!({"id": -5}), "id").is_err());
        assert!(numeric_id(&json!({}), "id").is_err());
    }

    #[test]
    fn test_numeric_id_overflow_is_invalid_argument() {
        let err = numeric_id(&json!({"id": "99999999999999999999999"}), "id").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
        assert_eq!(
            numeric_id(&json!({"id": "18446744073709551615"}), "id").unwrap(),
            "18446744073709551615"
        );
    }

    #[test]
    fn test_int_in_range() {
        assert_eq!(int_in_range(&json!({}), "limit", 1, 20, Some(10)).unwrap(), 10);
        assert_eq!(int_in_range(&json!({"limit": null}), "limit", 1, 20, Some(10)).unwrap(), 10);
        assert_eq!(int_in_range(&json!({"limit": 20}), "limit", 1, 20, Some(10)).unwrap(), 20);
        assert_eq!(int_in_range(&json!({"limit": 5.0}), "limit", 1, 20, Some(10)).unwrap(), 5);
        assert!(int_in_range(&json!({"limit": 0}), "limit", 1, 20, Some(10)).is_err());
        assert!(int_in_range(&json!({"limit": 21}), "limit", 1, 20, Some(10)).is_err());
        assert!(int_in_range(&json!({"limit": 2.5}), "limit", 1, 20, Some(10)).is_err());
        assert!(int_in_range(&json!({"limit": "5"}), "limit", 1, 20, Some(10)).is_err());
    }

    #[test]
    fn test_required_int() {
        assert_eq!(int_in_range(&json!({"season": 0}), "season", 0, u32::MAX, None).unwrap(), 0);
        assert!(int_in_range(&json!({"season": -1}), "season", 0, u32::MAX, None).is_err());
        assert!(int_in_range(&json!({}), "season", 0, u32::MAX, None).is_err());
    }
}
