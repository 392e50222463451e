//! Evaluation results

use crate::model::{Config, ConfigType, LogLevel, ValueType};
use serde::Serialize;
use std::fmt;

/// Caller-facing value produced by an evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvaluatedValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    StringList(Vec<String>),
    LogLevel(LogLevel),
    Json(serde_json::Value),
    /// Duration in milliseconds
    Duration(f64),
}

impl EvaluatedValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; ints widen to `f64`
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_duration_millis(&self) -> Option<f64> {
        match self {
            Self::Duration(millis) => Some(*millis),
            _ => None,
        }
    }

    pub fn as_log_level(&self) -> Option<LogLevel> {
        match self {
            Self::LogLevel(level) => Some(*level),
            _ => None,
        }
    }

    /// Type inferred from the value itself, used when a config declares none
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::StringList(_) => ValueType::StringList,
            Self::LogLevel(_) => ValueType::LogLevel,
            Self::Json(_) => ValueType::Json,
            Self::Duration(_) => ValueType::Duration,
        }
    }
}

impl fmt::Display for EvaluatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Double(d) => write!(f, "{}", d),
            Self::String(s) => f.write_str(s),
            Self::StringList(values) => f.write_str(&values.join(",")),
            Self::LogLevel(level) => write!(f, "{}", level),
            Self::Json(value) => write!(f, "{}", value),
            Self::Duration(millis) => write!(f, "{}ms", millis),
        }
    }
}

impl From<bool> for EvaluatedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for EvaluatedValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for EvaluatedValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for EvaluatedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EvaluatedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for EvaluatedValue {
    fn from(values: Vec<String>) -> Self {
        Self::StringList(values)
    }
}

/// Outcome of evaluating one config, with the metadata telemetry needs
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub config_id: i64,
    pub config_key: String,
    pub config_type: ConfigType,
    /// Declared type, or the type of the matched value for legacy configs
    pub value_type: Option<ValueType>,
    /// Index into the config's rows as supplied, not the precedence order
    pub config_row_index: Option<usize>,
    pub conditional_value_index: Option<usize>,
    pub weighted_value_index: Option<usize>,
    /// `None` when no conditional value matched
    pub value: Option<EvaluatedValue>,
    /// Redacted stand-in for confidential or decrypted values
    pub reportable_value: Option<String>,
}

impl Evaluation {
    /// Evaluation of a config where nothing matched
    pub fn unmatched(config: &Config) -> Self {
        Self {
            config_id: config.id,
            config_key: config.key.clone(),
            config_type: config.config_type,
            value_type: config.value_type,
            config_row_index: None,
            conditional_value_index: None,
            weighted_value_index: None,
            value: None,
            reportable_value: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.value.is_some()
    }

    /// Value safe to log or report: the redacted form when there is one
    pub fn reportable(&self) -> Option<String> {
        self.reportable_value
            .clone()
            .or_else(|| self.value.as_ref().map(|v| v.to_string()))
    }
}
