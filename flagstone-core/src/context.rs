//! Evaluation contexts
//!
//! A two-level store of attributes: context type (`"user"`, `"device"`, `""`
//! for the unnamed default) to property name to value.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Reserved property resolving to the current wall-clock time in epoch millis.
pub const CURRENT_TIME_PROPERTY: &str = "prefab.current-time";

/// A single context attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<ContextValue>),
}

impl ContextValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// String form used by the string-set operators. Lists have none.
    pub fn string_form(&self) -> Option<String> {
        match self {
            Self::List(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Double(d) => write!(f, "{}", d),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Attributes of one context type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    properties: HashMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.properties.get(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.properties.iter()
    }
}

/// All contexts supplied to one evaluation, keyed by context type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contexts {
    contexts: HashMap<String, Context>,
}

impl Contexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a whole context type
    pub fn with_context(mut self, context_type: impl Into<String>, context: Context) -> Self {
        self.contexts.insert(context_type.into(), context);
        self
    }

    /// Set a single property, creating the context type if needed
    pub fn with_property(
        mut self,
        context_type: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Self {
        self.contexts
            .entry(context_type.into())
            .or_default()
            .insert(key, value);
        self
    }

    pub fn get(&self, context_type: &str) -> Option<&Context> {
        self.contexts.get(context_type)
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn context_types(&self) -> impl Iterator<Item = &String> {
        self.contexts.keys()
    }

    /// Layer `overrides` on top of `self`. Within each context type the
    /// override wins key for key; types only present on one side are kept.
    pub fn merged_with(&self, overrides: &Contexts) -> Contexts {
        let mut merged = self.clone();
        for (context_type, context) in &overrides.contexts {
            let target = merged.contexts.entry(context_type.clone()).or_default();
            for (key, value) in context.iter() {
                target.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Resolve a `"type.key"` or bare `"key"` property name.
    ///
    /// A bare name reads from the unnamed (`""`) context type. The reserved
    /// [`CURRENT_TIME_PROPERTY`] yields the current epoch-millisecond time.
    pub fn lookup(&self, property_name: &str) -> Option<ContextValue> {
        if property_name == CURRENT_TIME_PROPERTY {
            return Some(ContextValue::Int(chrono::Utc::now().timestamp_millis()));
        }

        let (context_type, key) = split_property_name(property_name);
        self.contexts
            .get(context_type)
            .and_then(|context| context.get(key))
            .cloned()
    }
}

/// Split on the first dot; no dot means the unnamed context type.
pub fn split_property_name(property_name: &str) -> (&str, &str) {
    property_name.split_once('.').unwrap_or(("", property_name))
}
