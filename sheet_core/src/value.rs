//! Lenient integer values as stored by the host document
//!
//! Sheet fields edited through HTML inputs arrive as numbers, numeric strings,
//! empty strings or garbage. Every read coerces to an integer and falls back
//! to zero, so one bad field can never poison a whole derive pass.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw document value read as an integer on demand
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LooseInt(pub Value);

impl LooseInt {
    pub fn new(value: i64) -> Self {
        LooseInt(Value::from(value))
    }

    /// Parse as an integer, `None` when the value has no leading integer
    pub fn try_int(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            Value::String(s) => parse_leading_int(s),
            _ => None,
        }
    }

    /// Parse as an integer, zero when unreadable
    pub fn int(&self) -> i64 {
        self.try_int().unwrap_or(0)
    }
}

impl From<i64> for LooseInt {
    fn from(value: i64) -> Self {
        LooseInt::new(value)
    }
}

impl From<&str> for LooseInt {
    fn from(value: &str) -> Self {
        LooseInt(Value::from(value))
    }
}

/// A `{ value: ... }` leaf, the shape of every modifier and item attribute
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueField {
    #[serde(default)]
    pub value: LooseInt,
}

impl ValueField {
    pub fn new(value: i64) -> Self {
        ValueField {
            value: LooseInt::new(value),
        }
    }

    pub fn int(&self) -> i64 {
        self.value.int()
    }
}

/// Leading-integer parse: optional whitespace, optional sign, then digits
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_truncate() {
        assert_eq!(LooseInt(json!(3)).int(), 3);
        assert_eq!(LooseInt(json!(2.9)).int(), 2);
        assert_eq!(LooseInt(json!(-2.9)).int(), -2);
    }

    #[test]
    fn test_strings_parse_leading_digits() {
        assert_eq!(LooseInt(json!("4")).int(), 4);
        assert_eq!(LooseInt(json!("  -2")).int(), -2);
        assert_eq!(LooseInt(json!("+1 bonus")).int(), 1);
        assert_eq!(LooseInt(json!("7.5")).int(), 7);
    }

    #[test]
    fn test_garbage_is_zero() {
        assert_eq!(LooseInt(json!("")).int(), 0);
        assert_eq!(LooseInt(json!("abc")).int(), 0);
        assert_eq!(LooseInt(json!("-")).int(), 0);
        assert_eq!(LooseInt(json!(null)).int(), 0);
        assert_eq!(LooseInt(json!(true)).int(), 0);
        assert_eq!(LooseInt(json!({"value": 2})).int(), 0);
        assert_eq!(LooseInt(json!("99999999999999999999")).try_int(), None);
    }

    #[test]
    fn test_value_field_defaults_when_missing() {
        let field: ValueField = serde_json::from_value(json!({})).unwrap();
        assert_eq!(field.int(), 0);
    }
}
