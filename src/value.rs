//! The output value model.
//!
//! A parsed document is an ordered row of [`Value`]s. Records keep their
//! keys in a `BTreeMap` so JSON serialisation is deterministic and
//! alphabetically ordered, which is the canonical textual form.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, Serializer};

/// One ordered row of parsed values. The document currently coincides with
/// a single row.
pub type Row = Vec<Value>;

/// A keyed record produced by materialising a typed quantity.
pub type Record = BTreeMap<String, Value>;

/// A value in a parsed bb document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// All bb numbers are 64-bit floats.
    Number(f64),
    /// String.
    String(String),
    /// Ordered list, e.g. repeated modifier values.
    List(Vec<Value>),
    /// Keyed record with heterogeneous values.
    Record(Record),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a number value.
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Check if this is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as a float.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as a record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(map) => Some(map),
            _ => None,
        }
    }

    /// Get a record field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(map) => map.get(key),
            _ => None,
        }
    }

    /// Parse text as a number, falling back to a string value. Invalid
    /// numbers such as `1.0.0` survive as strings.
    pub fn number_or_string(text: &str) -> Self {
        match text.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(text.to_string()),
        }
    }

    /// Convert a parsed JSON tree (from the `json` special unit).
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect(),
            ),
        }
    }

    /// Convert a parsed YAML tree (from the `yaml` special unit). Mapping
    /// keys that are not strings are stringified.
    pub fn from_yaml(yaml: serde_yaml::Value) -> Self {
        match yaml {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::List(items.into_iter().map(Value::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => Value::Record(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Value::from_yaml(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(tagged.value),
        }
    }
}

/// Strip one layer of surrounding quotes if the first and last runes are the
/// same quote character (`"` or `` ` ``).
pub(crate) fn strip_matching_quotes(s: &str) -> &str {
    let mut chars = s.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && (open == '"' || open == '`') => {
            &s[open.len_utf8()..s.len() - close.len_utf8()]
        }
        _ => s,
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            // Integral finite numbers serialise in integer form (`1`, not
            // `1.0`), matching the reference encoder. Negative zero loses
            // its sign.
            Value::Number(n) => {
                if *n == n.trunc() && n.abs() < 9.007_199_254_740_992e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Record(map) => serializer.collect_map(map),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("null"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_or_string() {
        assert_eq!(Value::number_or_string("-.0"), Value::Number(-0.0));
        assert_eq!(Value::number_or_string("1.0.0"), Value::string("1.0.0"));
    }

    #[test]
    fn test_record_keys_serialize_sorted() {
        let mut record = Record::new();
        record.insert("quantity".to_string(), Value::Number(1.0));
        record.insert("b".to_string(), Value::string("c"));
        let json = serde_json::to_string(&Value::Record(record)).unwrap();
        assert_eq!(json, r#"{"b":"c","quantity":1}"#);
    }

    #[test]
    fn test_numbers_serialize_like_the_reference() {
        let row: Row = vec![
            Value::Number(1.0),
            Value::Number(-0.0),
            Value::Number(0.2),
            Value::Number(-0.1),
            Value::Number(f64::NAN),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, "[1,0,0.2,-0.1,null]");
    }

    #[test]
    fn test_from_yaml_stringifies_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes").unwrap();
        let value = Value::from_yaml(yaml);
        assert!(value.get("1").is_some());
        assert!(value.get("true").is_some());
    }

    #[test]
    fn test_strip_matching_quotes() {
        assert_eq!(strip_matching_quotes("\"abc\""), "abc");
        assert_eq!(strip_matching_quotes("`abc`"), "abc");
        assert_eq!(strip_matching_quotes("\"abc`"), "\"abc`");
        assert_eq!(strip_matching_quotes("\""), "\"");
        assert_eq!(strip_matching_quotes("abc"), "abc");
    }

    #[test]
    fn test_json_round_trip() {
        let row: Row = vec![
            Value::Number(1.5),
            Value::string("x"),
            Value::Bool(true),
            Value::Null,
            Value::List(vec![Value::Number(2.0), Value::string("y")]),
        ];
        let text = serde_json::to_string(&row).unwrap();
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!([1.5, "x", true, null, [2, "y"]]));
    }
}
