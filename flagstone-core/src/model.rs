//! Configuration data model
//!
//! Configurations arrive in a permissive wire shape (`*Record` types, every
//! payload field optional) and are checked once, at construction, into the
//! strict domain types the evaluator works with.

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigType {
    #[default]
    Config,
    FeatureFlag,
    LogLevel,
    Segment,
    Deleted,
}

impl ConfigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "CONFIG",
            Self::FeatureFlag => "FEATURE_FLAG",
            Self::LogLevel => "LOG_LEVEL",
            Self::Segment => "SEGMENT",
            Self::Deleted => "DELETED",
        }
    }
}

/// Declared type a configuration resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Int,
    String,
    Double,
    Bool,
    LogLevel,
    StringList,
    IntRange,
    Duration,
    Json,
    /// Anything this engine does not know; treated as undeclared.
    #[serde(other)]
    NotSet,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::String => "STRING",
            Self::Double => "DOUBLE",
            Self::Bool => "BOOL",
            Self::LogLevel => "LOG_LEVEL",
            Self::StringList => "STRING_LIST",
            Self::IntRange => "INT_RANGE",
            Self::Duration => "DURATION",
            Self::Json => "JSON",
            Self::NotSet => "NOT_SET",
        }
    }
}

/// Log level payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criterion operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    AlwaysTrue,
    HierarchicalMatch,
    PropIsOneOf,
    PropIsNotOneOf,
    PropStartsWithOneOf,
    PropDoesNotStartWithOneOf,
    PropEndsWithOneOf,
    PropDoesNotEndWithOneOf,
    PropContainsOneOf,
    PropDoesNotContainOneOf,
    PropBefore,
    PropAfter,
    PropLessThan,
    PropLessThanOrEqual,
    PropGreaterThan,
    PropGreaterThanOrEqual,
    PropMatches,
    PropDoesNotMatch,
    PropSemverLessThan,
    PropSemverEqual,
    PropSemverGreaterThan,
    InSeg,
    NotInSeg,
    InIntRange,
    /// Unrecognized operator; evaluating it is an error.
    #[serde(other)]
    Unknown,
}

/// Half-open integer range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IntRange {
    #[serde(default = "range_min", deserialize_with = "int64::deserialize")]
    pub start: i64,
    #[serde(default = "range_max", deserialize_with = "int64::deserialize")]
    pub end: i64,
}

fn range_min() -> i64 {
    i64::MIN
}

fn range_max() -> i64 {
    i64::MAX
}

impl IntRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self {
            start: start.unwrap_or(i64::MIN),
            end: end.unwrap_or(i64::MAX),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.start && value < self.end
    }
}

/// Where a provided value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvidedSource {
    EnvVar,
    #[serde(other)]
    Unknown,
}

/// Indirection to a value supplied by the host environment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Provided {
    pub source: ProvidedSource,
    pub lookup: String,
}

impl Provided {
    pub fn env_var(name: impl Into<String>) -> Self {
        Self {
            source: ProvidedSource::EnvVar,
            lookup: name.into(),
        }
    }
}

/// One branch of a weighted distribution
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedValue {
    pub weight: u32,
    pub value: ConfigValue,
}

/// Weighted distribution over values
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedValues {
    pub values: Vec<WeightedValue>,
    /// Context property hashed for consistent bucketing
    pub hash_by_property_name: Option<String>,
}

/// Payload of a configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Int(i64),
    String(String),
    Double(f64),
    Bool(bool),
    LogLevel(LogLevel),
    StringList(Vec<String>),
    IntRange(IntRange),
    /// ISO-8601 duration definition, `None` when the record omitted it
    Duration(Option<String>),
    /// Raw JSON text
    Json(String),
    Weighted(WeightedValues),
    Provided(Provided),
}

impl ValueKind {
    /// Short discriminant name, used in errors and logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::LogLevel(_) => "logLevel",
            Self::StringList(_) => "stringList",
            Self::IntRange(_) => "intRange",
            Self::Duration(_) => "duration",
            Self::Json(_) => "json",
            Self::Weighted(_) => "weightedValues",
            Self::Provided(_) => "provided",
        }
    }

    /// Stringified payload, the input to confidential fingerprints.
    ///
    /// `None` for weighted and provided values, whose payload is only known
    /// once they are resolved.
    pub fn payload_string(&self) -> Option<String> {
        match self {
            Self::Int(i) => Some(i.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Double(d) => Some(d.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::LogLevel(level) => Some(level.to_string()),
            Self::StringList(values) => Some(values.join(",")),
            Self::IntRange(range) => Some(format!("[{},{})", range.start, range.end)),
            Self::Duration(definition) => Some(definition.clone().unwrap_or_default()),
            Self::Json(text) => Some(text.clone()),
            Self::Weighted(_) | Self::Provided(_) => None,
        }
    }
}

/// A configuration value: payload plus confidentiality modifiers
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue {
    pub kind: ValueKind,
    /// Suppress the real value in telemetry and logs
    pub confidential: bool,
    /// Name of the config holding the decryption key; implies a ciphertext payload
    pub decrypt_with: Option<String>,
}

impl ConfigValue {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            confidential: false,
            decrypt_with: None,
        }
    }

    pub fn int(value: i64) -> Self {
        Self::new(ValueKind::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::String(value.into()))
    }

    pub fn double(value: f64) -> Self {
        Self::new(ValueKind::Double(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ValueKind::Bool(value))
    }

    pub fn log_level(level: LogLevel) -> Self {
        Self::new(ValueKind::LogLevel(level))
    }

    pub fn string_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ValueKind::StringList(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn int_range(start: Option<i64>, end: Option<i64>) -> Self {
        Self::new(ValueKind::IntRange(IntRange::new(start, end)))
    }

    pub fn duration(definition: impl Into<String>) -> Self {
        Self::new(ValueKind::Duration(Some(definition.into())))
    }

    pub fn json(text: impl Into<String>) -> Self {
        Self::new(ValueKind::Json(text.into()))
    }

    pub fn provided(provided: Provided) -> Self {
        Self::new(ValueKind::Provided(provided))
    }

    pub fn weighted(values: Vec<(u32, ConfigValue)>, hash_by_property_name: Option<&str>) -> Self {
        Self::new(ValueKind::Weighted(WeightedValues {
            values: values
                .into_iter()
                .map(|(weight, value)| WeightedValue { weight, value })
                .collect(),
            hash_by_property_name: hash_by_property_name.map(str::to_string),
        }))
    }

    /// Mark as confidential
    pub fn confidential(mut self) -> Self {
        self.confidential = true;
        self
    }

    /// Mark as ciphertext decrypted with the key held by `key_config`
    pub fn decrypt_with(mut self, key_config: impl Into<String>) -> Self {
        self.decrypt_with = Some(key_config.into());
        self
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match &self.kind {
            ValueKind::StringList(values) => Some(values),
            _ => None,
        }
    }
}

/// Single predicate over one context property
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub property_name: String,
    pub operator: Operator,
    pub value_to_match: Option<ConfigValue>,
}

impl Criterion {
    pub fn new(
        property_name: impl Into<String>,
        operator: Operator,
        value_to_match: ConfigValue,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value_to_match: Some(value_to_match),
        }
    }

    /// Strings to compare against, empty when the operand is not a list
    pub fn match_strings(&self) -> &[String] {
        self.value_to_match
            .as_ref()
            .and_then(ConfigValue::as_string_list)
            .unwrap_or(&[])
    }
}

/// Criteria (ANDed) guarding a value
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalValue {
    pub criteria: Vec<Criterion>,
    pub value: ConfigValue,
}

impl ConditionalValue {
    pub fn new(criteria: Vec<Criterion>, value: ConfigValue) -> Self {
        Self { criteria, value }
    }

    /// A value with no criteria; always matches
    pub fn always(value: ConfigValue) -> Self {
        Self::new(Vec::new(), value)
    }
}

/// One environment's rule table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// `None` for environment-agnostic rows
    pub project_env_id: Option<i64>,
    /// Informational side table, not used in matching
    pub properties: HashMap<String, serde_json::Value>,
    pub values: Vec<ConditionalValue>,
}

impl Row {
    pub fn new(values: Vec<ConditionalValue>) -> Self {
        Self {
            project_env_id: None,
            properties: HashMap::new(),
            values,
        }
    }

    pub fn for_environment(project_env_id: i64, values: Vec<ConditionalValue>) -> Self {
        Self {
            project_env_id: Some(project_env_id),
            ..Self::new(values)
        }
    }
}

/// A versioned, evaluatable configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ConfigRecord")]
pub struct Config {
    /// Monotonic id; `0` for legacy records that carried none
    pub id: i64,
    pub key: String,
    pub config_type: ConfigType,
    /// Declared type, `None` for legacy configs
    pub value_type: Option<ValueType>,
    pub rows: Vec<Row>,
}

impl Config {
    pub fn new(key: impl Into<String>, config_type: ConfigType, rows: Vec<Row>) -> Self {
        Self {
            id: 0,
            key: key.into(),
            config_type,
            value_type: None,
            rows,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.config_type == ConfigType::Deleted
    }
}

// ============================================================================
// Wire records
// ============================================================================

/// Config as it appears on the wire; `id` and `valueType` may be missing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    #[serde(default, deserialize_with = "int64::deserialize_opt")]
    pub id: Option<i64>,
    pub key: String,
    #[serde(default)]
    pub config_type: ConfigType,
    #[serde(default)]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub rows: Vec<RowRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    #[serde(default, deserialize_with = "int64::deserialize_opt")]
    pub project_env_id: Option<i64>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub values: Vec<ConditionalValueRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalValueRecord {
    #[serde(default)]
    pub criteria: Vec<CriterionRecord>,
    pub value: ValueRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionRecord {
    #[serde(default)]
    pub property_name: String,
    pub operator: Operator,
    #[serde(default)]
    pub value_to_match: Option<ValueRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StringListRecord {
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightedValueRecord {
    #[serde(default)]
    pub weight: u32,
    pub value: ValueRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedValuesRecord {
    #[serde(default)]
    pub weighted_values: Vec<WeightedValueRecord>,
    #[serde(default)]
    pub hash_by_property_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DurationRecord {
    #[serde(default)]
    pub definition: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRecord {
    pub json: String,
}

/// Value as it appears on the wire: many optional fields, one populated
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRecord {
    #[serde(default, deserialize_with = "int64::deserialize_opt")]
    pub int: Option<i64>,
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default)]
    pub double: Option<f64>,
    #[serde(default, rename = "bool")]
    pub boolean: Option<bool>,
    #[serde(default)]
    pub log_level: Option<LogLevel>,
    #[serde(default)]
    pub string_list: Option<StringListRecord>,
    #[serde(default)]
    pub int_range: Option<IntRange>,
    #[serde(default)]
    pub duration: Option<DurationRecord>,
    #[serde(default)]
    pub json: Option<JsonRecord>,
    #[serde(default)]
    pub weighted_values: Option<WeightedValuesRecord>,
    #[serde(default)]
    pub provided: Option<Provided>,
    #[serde(default)]
    pub confidential: Option<bool>,
    #[serde(default)]
    pub decrypt_with: Option<String>,
}

impl ValueRecord {
    /// Build the strict value, using the declared type to pick the payload
    /// when one is given and falling back to the first populated field.
    pub fn into_value(mut self, hint: Option<ValueType>) -> EvalResult<ConfigValue> {
        let confidential = self.confidential.unwrap_or(false);
        let decrypt_with = self.decrypt_with.take();

        let kind = if let Some(weighted) = self.weighted_values.take() {
            let values = weighted
                .weighted_values
                .into_iter()
                .map(|entry| {
                    Ok(WeightedValue {
                        weight: entry.weight,
                        value: entry.value.into_value(hint)?,
                    })
                })
                .collect::<EvalResult<Vec<_>>>()?;
            ValueKind::Weighted(WeightedValues {
                values,
                hash_by_property_name: weighted.hash_by_property_name,
            })
        } else if let Some(provided) = self.provided.take() {
            ValueKind::Provided(provided)
        } else if let Some(kind) = hint.and_then(|h| self.take_kind(h)) {
            kind
        } else {
            self.take_first()
                .ok_or_else(|| EvalError::invalid_config("value has no populated field"))?
        };

        if decrypt_with.is_some() && !matches!(kind, ValueKind::String(_)) {
            return Err(EvalError::invalid_config(format!(
                "decryptWith requires a string payload, found {}",
                kind.name()
            )));
        }

        Ok(ConfigValue {
            kind,
            confidential,
            decrypt_with,
        })
    }

    fn take_kind(&mut self, value_type: ValueType) -> Option<ValueKind> {
        match value_type {
            ValueType::Int => self.int.take().map(ValueKind::Int),
            ValueType::String => self.string.take().map(ValueKind::String),
            ValueType::Double => self.double.take().map(ValueKind::Double),
            ValueType::Bool => self.boolean.take().map(ValueKind::Bool),
            ValueType::LogLevel => self.log_level.take().map(ValueKind::LogLevel),
            ValueType::StringList => self
                .string_list
                .take()
                .map(|list| ValueKind::StringList(list.values)),
            ValueType::IntRange => self.int_range.take().map(ValueKind::IntRange),
            ValueType::Duration => self
                .duration
                .take()
                .map(|duration| ValueKind::Duration(duration.definition)),
            ValueType::Json => self.json.take().map(|json| ValueKind::Json(json.json)),
            ValueType::NotSet => None,
        }
    }

    fn take_first(&mut self) -> Option<ValueKind> {
        [
            ValueType::Int,
            ValueType::String,
            ValueType::Double,
            ValueType::Bool,
            ValueType::LogLevel,
            ValueType::StringList,
            ValueType::IntRange,
            ValueType::Duration,
            ValueType::Json,
        ]
        .into_iter()
        .find_map(|value_type| self.take_kind(value_type))
    }
}

impl TryFrom<ConfigRecord> for Config {
    type Error = EvalError;

    fn try_from(record: ConfigRecord) -> EvalResult<Self> {
        if record.key.is_empty() {
            return Err(EvalError::invalid_config("config key must not be empty"));
        }

        let value_type = record.value_type.filter(|t| *t != ValueType::NotSet);

        let rows = record
            .rows
            .into_iter()
            .map(|row| {
                let values = row
                    .values
                    .into_iter()
                    .map(|cv| {
                        let criteria = cv
                            .criteria
                            .into_iter()
                            .map(|c| {
                                Ok(Criterion {
                                    property_name: c.property_name,
                                    operator: c.operator,
                                    value_to_match: c
                                        .value_to_match
                                        .map(|v| v.into_value(None))
                                        .transpose()?,
                                })
                            })
                            .collect::<EvalResult<Vec<_>>>()?;
                        Ok(ConditionalValue {
                            criteria,
                            value: cv.value.into_value(value_type)?,
                        })
                    })
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Row {
                    project_env_id: row.project_env_id,
                    properties: row.properties,
                    values,
                })
            })
            .collect::<EvalResult<Vec<_>>>()?;

        Ok(Config {
            id: record.id.unwrap_or(0),
            key: record.key,
            config_type: record.config_type,
            value_type,
            rows,
        })
    }
}

/// 64-bit integers arrive either as JSON numbers or as decimal strings.
mod int64 {
    use super::*;
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(i64),
        Text(String),
    }

    impl Repr {
        fn into_i64<E: Error>(self) -> Result<i64, E> {
            match self {
                Repr::Number(n) => Ok(n),
                Repr::Text(s) => s.trim().parse().map_err(E::custom),
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Repr::deserialize(deserializer)?.into_i64()
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Option::<Repr>::deserialize(deserializer)?
            .map(Repr::into_i64::<D::Error>)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> EvalResult<Config> {
        let record: ConfigRecord = serde_json::from_value(value)?;
        Config::try_from(record)
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse(json!({
            "key": "service.timeout",
            "rows": [{ "values": [{ "value": { "int": 42 } }] }]
        }))
        .unwrap();

        assert_eq!(config.id, 0);
        assert_eq!(config.config_type, ConfigType::Config);
        assert_eq!(config.value_type, None);
        assert_eq!(config.rows[0].values[0].value.kind, ValueKind::Int(42));
    }

    #[test]
    fn test_int64_accepts_strings() {
        let config = parse(json!({
            "id": "9007199254740993",
            "key": "big",
            "valueType": "INT",
            "rows": [{
                "projectEnvId": "5",
                "values": [{ "value": { "int": "-9007199254740993" } }]
            }]
        }))
        .unwrap();

        assert_eq!(config.id, 9007199254740993);
        assert_eq!(config.rows[0].project_env_id, Some(5));
        assert_eq!(
            config.rows[0].values[0].value.kind,
            ValueKind::Int(-9007199254740993)
        );
    }

    #[test]
    fn test_value_type_hint_wins_over_field_order() {
        let record: ValueRecord =
            serde_json::from_value(json!({ "int": 1, "string": "one" })).unwrap();
        let value = record.clone().into_value(Some(ValueType::String)).unwrap();
        assert_eq!(value.kind, ValueKind::String("one".to_string()));

        let value = record.into_value(None).unwrap();
        assert_eq!(value.kind, ValueKind::Int(1));
    }

    #[test]
    fn test_empty_value_record_is_rejected() {
        let err = parse(json!({
            "key": "broken",
            "rows": [{ "values": [{ "value": { "confidential": true } }] }]
        }))
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidConfig(_)));
    }

    #[test]
    fn test_decrypt_with_requires_string() {
        let err = parse(json!({
            "key": "secret",
            "rows": [{ "values": [{ "value": { "int": 3, "decryptWith": "key.config" } }] }]
        }))
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidConfig(_)));
    }

    #[test]
    fn test_weighted_values_and_modifiers() {
        let config = parse(json!({
            "key": "flag.weighted",
            "configType": "FEATURE_FLAG",
            "valueType": "BOOL",
            "rows": [{ "values": [{ "value": { "weightedValues": {
                "weightedValues": [
                    { "weight": 90, "value": { "bool": false } },
                    { "weight": 10, "value": { "bool": true } }
                ],
                "hashByPropertyName": "user.trackingId"
            } } }] }]
        }))
        .unwrap();

        match &config.rows[0].values[0].value.kind {
            ValueKind::Weighted(weighted) => {
                assert_eq!(weighted.values.len(), 2);
                assert_eq!(weighted.values[0].weight, 90);
                assert_eq!(weighted.values[1].value.kind, ValueKind::Bool(true));
                assert_eq!(
                    weighted.hash_by_property_name.as_deref(),
                    Some("user.trackingId")
                );
            }
            other => panic!("expected weighted values, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operator_and_value_type() {
        let config = parse(json!({
            "key": "odd",
            "valueType": "SOMETHING_NEW",
            "rows": [{ "values": [{
                "criteria": [{ "propertyName": "user.key", "operator": "PROP_IS_WEIRD" }],
                "value": { "string": "x" }
            }] }]
        }))
        .unwrap();

        assert_eq!(config.value_type, None);
        assert_eq!(config.rows[0].values[0].criteria[0].operator, Operator::Unknown);
    }

    #[test]
    fn test_int_range_defaults() {
        let range: IntRange = serde_json::from_value(json!({ "start": 10 })).unwrap();
        assert_eq!(range.start, 10);
        assert_eq!(range.end, i64::MAX);
        assert!(range.contains(10));
        assert!(!range.contains(9));

        let range = IntRange::new(None, Some(5));
        assert!(range.contains(i64::MIN));
        assert!(!range.contains(5));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(parse(json!({ "key": "" })).is_err());
    }
}
