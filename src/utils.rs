//! Utility functions for record ids, payload normalization, and logging.
//!
//! This module provides helper functions used throughout the application:
//! - Record id synthesis for events that carry no id
//! - Exact-decimal normalization of arbitrary JSON payloads
//! - String truncation for log fields

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Build the fallback id for a generic record written at `now`.
///
/// # Examples
///
/// ```ignore
/// // 2023-11-14T22:13:20Z
/// assert_eq!(synthesize_record_id(now), "record-1700000000");
/// ```
pub fn synthesize_record_id(now: DateTime<Utc>) -> String {
    format!("record-{}", now.timestamp())
}

/// Normalize a payload so that every number is held as an exact decimal.
///
/// The payload is encoded to JSON text and decoded again. The crate enables
/// `serde_json`'s `arbitrary_precision` feature, so decoded numbers keep
/// their literal text (`3.14` stays `3.14`, big integers keep every digit)
/// instead of being squeezed through `f64`. Objects and arrays keep their
/// shape.
///
/// # Errors
///
/// Returns the `serde_json` error if the payload cannot be encoded or decoded.
pub fn normalize_data(data: &Value) -> Result<Value, serde_json::Error> {
    let text = serde_json::to_string(data)?;
    serde_json::from_str(&text)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_synthesize_record_id() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(synthesize_record_id(now), "record-1700000000");
    }

    #[test]
    fn test_synthesized_ids_differ_across_seconds() {
        let a = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let b = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        assert_ne!(synthesize_record_id(a), synthesize_record_id(b));
    }

    #[test]
    fn test_normalize_data_keeps_decimal_literal() {
        let data: Value = serde_json::from_str(r#"{"pi": 3.14, "tiny": 0.1}"#).unwrap();
        let normalized = normalize_data(&data).unwrap();
        assert_eq!(normalized["pi"].to_string(), "3.14");
        assert_eq!(normalized["tiny"].to_string(), "0.1");
    }

    #[test]
    fn test_normalize_data_keeps_digits_beyond_f64() {
        let literal = "12345678901234567890.123456789";
        let data: Value = serde_json::from_str(&format!(r#"{{"big": {literal}}}"#)).unwrap();
        let normalized = normalize_data(&data).unwrap();
        assert_eq!(normalized["big"].to_string(), literal);
    }

    #[test]
    fn test_normalize_data_preserves_structure() {
        let data = json!({
            "name": "sensor",
            "readings": [1, 2.5, {"nested": true}],
            "meta": {"unit": null}
        });
        let normalized = normalize_data(&data).unwrap();
        assert_eq!(normalized, data);
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        let result = truncate_for_log("ééé", 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("…(+4 bytes)"));
    }
}
