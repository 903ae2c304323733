//! Typed setting values.
//!
//! Every source hands the resolver raw data in a different shape: the CLI and
//! environment give text, config files give a parsed document. This module
//! turns both into a [`SettingValue`] of the setting's declared kind.

use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The declared type of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    String,
    Integer,
    Boolean,
    Duration,
    Path,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingKind::String => write!(f, "string"),
            SettingKind::Integer => write!(f, "integer"),
            SettingKind::Boolean => write!(f, "boolean"),
            SettingKind::Duration => write!(f, "duration"),
            SettingKind::Path => write!(f, "path"),
        }
    }
}

/// A concrete value for a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Duration(Duration),
    Path(PathBuf),
}

impl SettingValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::String(_) => SettingKind::String,
            SettingValue::Integer(_) => SettingKind::Integer,
            SettingValue::Boolean(_) => SettingKind::Boolean,
            SettingValue::Duration(_) => SettingKind::Duration,
            SettingValue::Path(_) => SettingKind::Path,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            SettingValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            SettingValue::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) => write!(f, "{}", s),
            SettingValue::Integer(n) => write!(f, "{}", n),
            SettingValue::Boolean(b) => write!(f, "{}", b),
            SettingValue::Duration(d) => write!(f, "{}", humantime::format_duration(*d)),
            SettingValue::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

impl SettingKind {
    /// Parse a value supplied as text (command line or environment).
    pub fn parse_str(self, raw: &str) -> Result<SettingValue, String> {
        match self {
            SettingKind::String => Ok(SettingValue::String(raw.to_string())),
            SettingKind::Path => Ok(SettingValue::Path(PathBuf::from(raw))),
            SettingKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(SettingValue::Integer)
                .map_err(|e| format!("expected an integer: {}", e)),
            SettingKind::Boolean => parse_bool(raw.trim())
                .map(SettingValue::Boolean)
                .ok_or_else(|| "expected a boolean (true/false, 1/0)".to_string()),
            SettingKind::Duration => parse_duration(raw.trim()).map(SettingValue::Duration),
        }
    }

    /// Convert a value read from a config file.
    ///
    /// Strings are always accepted and parsed with the text rules, so a file
    /// may say `port: "70"` as well as `port: 70`.
    pub fn from_document(self, value: &Value) -> Result<SettingValue, String> {
        match (self, value) {
            (kind, Value::String(s)) => kind.parse_str(s),
            (SettingKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(SettingValue::Integer)
                .ok_or_else(|| format!("expected an integer, got {}", n)),
            (SettingKind::Boolean, Value::Bool(b)) => Ok(SettingValue::Boolean(*b)),
            // Unitless numbers are seconds
            (SettingKind::Duration, Value::Number(n)) => n
                .as_u64()
                .map(|secs| SettingValue::Duration(Duration::from_secs(secs)))
                .ok_or_else(|| format!("expected a non-negative number of seconds, got {}", n)),
            (SettingKind::String, Value::Number(n)) => Ok(SettingValue::String(n.to_string())),
            (SettingKind::String, Value::Bool(b)) => Ok(SettingValue::String(b.to_string())),
            (kind, other) => Err(format!("expected a {}, got {}", kind, describe(other))),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(raw)
        .map_err(|e| format!("expected a duration such as \"5s\" or \"1m30s\": {}", e))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_integer_text() {
        assert_eq!(
            SettingKind::Integer.parse_str(" 7070 "),
            Ok(SettingValue::Integer(7070))
        );
        assert!(SettingKind::Integer.parse_str("seventy").is_err());
    }

    #[test]
    fn test_parse_bool_spellings() {
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            assert_eq!(
                SettingKind::Boolean.parse_str(raw),
                Ok(SettingValue::Boolean(true))
            );
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(
                SettingKind::Boolean.parse_str(raw),
                Ok(SettingValue::Boolean(false))
            );
        }
        assert!(SettingKind::Boolean.parse_str("yes").is_err());
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!(
            SettingKind::Duration.parse_str("5s"),
            Ok(SettingValue::Duration(Duration::from_secs(5)))
        );
        assert_eq!(
            SettingKind::Duration.parse_str("1m 30s"),
            Ok(SettingValue::Duration(Duration::from_secs(90)))
        );
        assert_eq!(
            SettingKind::Duration.parse_str("250ms"),
            Ok(SettingValue::Duration(Duration::from_millis(250)))
        );
        assert_eq!(
            SettingKind::Duration.parse_str("12"),
            Ok(SettingValue::Duration(Duration::from_secs(12)))
        );
        assert!(SettingKind::Duration.parse_str("soon").is_err());
        assert!(SettingKind::Duration.parse_str("-5s").is_err());
    }

    #[test]
    fn test_document_values_by_kind() {
        assert_eq!(
            SettingKind::Integer.from_document(&json!(70)),
            Ok(SettingValue::Integer(70))
        );
        assert_eq!(
            SettingKind::Integer.from_document(&json!("70")),
            Ok(SettingValue::Integer(70))
        );
        assert_eq!(
            SettingKind::Boolean.from_document(&json!(true)),
            Ok(SettingValue::Boolean(true))
        );
        assert_eq!(
            SettingKind::Duration.from_document(&json!(30)),
            Ok(SettingValue::Duration(Duration::from_secs(30)))
        );
        assert_eq!(
            SettingKind::String.from_document(&json!(42)),
            Ok(SettingValue::String("42".into()))
        );
    }

    #[test]
    fn test_document_type_mismatch_is_rejected() {
        let err = SettingKind::Integer.from_document(&json!([1, 2])).unwrap_err();
        assert!(err.contains("a list"));

        let err = SettingKind::Boolean.from_document(&json!(1.5)).unwrap_err();
        assert!(err.contains("boolean"));

        assert!(SettingKind::Integer.from_document(&json!(1.5)).is_err());
        assert!(SettingKind::Path.from_document(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_display_renders_durations_readably() {
        let value = SettingValue::Duration(Duration::from_secs(90));
        assert_eq!(value.to_string(), "1m 30s");
    }
}
