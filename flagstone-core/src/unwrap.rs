//! Value unwrapping
//!
//! Turns a matched [`ConfigValue`] into an [`EvaluatedValue`]. Order of
//! precedence: decryption, provided (environment) values, weighted
//! branching, then the plain payload.

use crate::context::Contexts;
use crate::distribution::{bucket_index, weighted_value_percentile};
use crate::duration::duration_to_milliseconds;
use crate::encryption;
use crate::env::EnvLookup;
use crate::error::{EvalError, EvalResult};
use crate::evaluation::EvaluatedValue;
use crate::evaluator::NestedEvaluator;
use crate::model::{
    ConfigValue, LogLevel, Provided, ProvidedSource, ValueKind, ValueType, WeightedValues,
};
use md5::{Digest, Md5};
use tracing::trace;

/// Redaction prefix of reportable values
const REDACTED_PREFIX: &str = "*****";
const FINGERPRINT_HEX_CHARS: usize = 5;

/// Result of unwrapping a value
#[derive(Debug, Clone, PartialEq)]
pub struct Unwrapped {
    pub value: EvaluatedValue,
    /// Branch picked when the value was weighted
    pub weighted_value_index: Option<usize>,
    /// Redacted stand-in when the value was confidential or decrypted
    pub reportable_value: Option<String>,
}

impl Unwrapped {
    fn plain(value: EvaluatedValue) -> Self {
        Self {
            value,
            weighted_value_index: None,
            reportable_value: None,
        }
    }
}

/// Inputs an unwrap may consult
pub struct UnwrapContext<'a> {
    pub config_key: &'a str,
    /// Declared type of the config, drives coercion of provided values
    pub value_type: Option<ValueType>,
    pub contexts: &'a Contexts,
    /// Resolves the config named by `decryptWith`
    pub evaluator: &'a dyn NestedEvaluator,
    pub env: &'a dyn EnvLookup,
    pub depth: usize,
}

/// `*****` followed by the last five hex digits of the payload's MD5
pub fn reportable_fingerprint(payload: &str) -> String {
    let digest = hex::encode(Md5::digest(payload.as_bytes()));
    format!(
        "{}{}",
        REDACTED_PREFIX,
        &digest[digest.len() - FINGERPRINT_HEX_CHARS..]
    )
}

/// Unwrap a matched value
pub fn unwrap_value(value: &ConfigValue, ctx: &UnwrapContext<'_>) -> EvalResult<Unwrapped> {
    if let Some(key_config) = &value.decrypt_with {
        return decrypt_value(value, key_config, ctx);
    }

    let mut unwrapped = match &value.kind {
        ValueKind::Provided(provided) => Unwrapped::plain(resolve_provided(provided, ctx)?),
        ValueKind::Weighted(weighted) => unwrap_weighted(weighted, ctx)?,
        kind => Unwrapped::plain(unwrap_kind(kind, ctx.config_key)?),
    };

    if value.confidential && unwrapped.reportable_value.is_none() {
        let payload = value
            .kind
            .payload_string()
            .unwrap_or_else(|| unwrapped.value.to_string());
        unwrapped.reportable_value = Some(reportable_fingerprint(&payload));
    }

    Ok(unwrapped)
}

fn decrypt_value(
    value: &ConfigValue,
    key_config: &str,
    ctx: &UnwrapContext<'_>,
) -> EvalResult<Unwrapped> {
    let ValueKind::String(ciphertext) = &value.kind else {
        return Err(EvalError::UnsupportedValue {
            key: ctx.config_key.to_string(),
            kind: value.kind.name(),
        });
    };

    let key_value = ctx
        .evaluator
        .evaluate_nested(key_config, ctx.contexts, ctx.depth + 1)?
        .and_then(|evaluation| evaluation.value)
        .ok_or_else(|| EvalError::MissingDecryptionKey(key_config.to_string()))?;

    let EvaluatedValue::String(hex_key) = key_value else {
        return Err(EvalError::DecryptionKeyNotString(key_config.to_string()));
    };

    let cleartext = encryption::decrypt(ciphertext, &hex_key)?;
    trace!(key = %ctx.config_key, key_config = %key_config, "Decrypted secret value");

    Ok(Unwrapped {
        value: EvaluatedValue::String(cleartext),
        weighted_value_index: None,
        reportable_value: Some(reportable_fingerprint(ciphertext)),
    })
}

fn unwrap_weighted(weighted: &WeightedValues, ctx: &UnwrapContext<'_>) -> EvalResult<Unwrapped> {
    let hash_by_value = weighted
        .hash_by_property_name
        .as_deref()
        .and_then(|name| ctx.contexts.lookup(name))
        .and_then(|value| value.string_form());

    let percent = match &hash_by_value {
        Some(seed) => weighted_value_percentile(ctx.config_key, seed),
        None => rand::random::<f64>(),
    };

    let weights: Vec<u32> = weighted.values.iter().map(|w| w.weight).collect();
    let index = bucket_index(&weights, percent).ok_or_else(|| EvalError::UnsupportedValue {
        key: ctx.config_key.to_string(),
        kind: "empty weightedValues",
    })?;

    trace!(
        key = %ctx.config_key,
        percent = percent,
        index = index,
        hashed = hash_by_value.is_some(),
        "Selected weighted value"
    );

    let inner = unwrap_value(&weighted.values[index].value, ctx)?;
    Ok(Unwrapped {
        weighted_value_index: Some(index),
        ..inner
    })
}

fn unwrap_kind(kind: &ValueKind, config_key: &str) -> EvalResult<EvaluatedValue> {
    let value = match kind {
        ValueKind::Int(i) => EvaluatedValue::Int(*i),
        ValueKind::String(s) => EvaluatedValue::String(s.clone()),
        ValueKind::Double(d) => EvaluatedValue::Double(*d),
        ValueKind::Bool(b) => EvaluatedValue::Bool(*b),
        ValueKind::LogLevel(level) => EvaluatedValue::LogLevel(*level),
        ValueKind::StringList(values) => EvaluatedValue::StringList(values.clone()),
        ValueKind::Json(text) => EvaluatedValue::Json(serde_json::from_str(text)?),
        ValueKind::Duration(Some(definition)) => {
            EvaluatedValue::Duration(duration_to_milliseconds(definition))
        }
        ValueKind::Duration(None) => {
            return Err(EvalError::MissingDurationDefinition(config_key.to_string()));
        }
        ValueKind::IntRange(_) | ValueKind::Weighted(_) | ValueKind::Provided(_) => {
            return Err(EvalError::UnsupportedValue {
                key: config_key.to_string(),
                kind: kind.name(),
            });
        }
    };
    Ok(value)
}

fn resolve_provided(provided: &Provided, ctx: &UnwrapContext<'_>) -> EvalResult<EvaluatedValue> {
    if provided.source != ProvidedSource::EnvVar {
        return Err(EvalError::UnsupportedValue {
            key: ctx.config_key.to_string(),
            kind: "provided source",
        });
    }

    let raw = ctx
        .env
        .var(&provided.lookup)
        .ok_or_else(|| EvalError::MissingEnvVar {
            key: ctx.config_key.to_string(),
            name: provided.lookup.clone(),
        })?;

    coerce_provided(&raw, ctx.value_type, ctx.config_key)
}

/// Coerce an environment string into the declared value type
fn coerce_provided(
    raw: &str,
    value_type: Option<ValueType>,
    config_key: &str,
) -> EvalResult<EvaluatedValue> {
    let trimmed = raw.trim();

    let value = match value_type {
        Some(ValueType::Int) => EvaluatedValue::Int(trimmed.parse().map_err(|_| {
            EvalError::invalid_provided(config_key, format!("'{}' is not an integer", raw))
        })?),
        Some(ValueType::Double) => EvaluatedValue::Double(trimmed.parse().map_err(|_| {
            EvalError::invalid_provided(config_key, format!("'{}' is not a number", raw))
        })?),
        Some(ValueType::Bool) => match trimmed.to_ascii_lowercase().as_str() {
            "true" => EvaluatedValue::Bool(true),
            "false" => EvaluatedValue::Bool(false),
            _ => {
                return Err(EvalError::invalid_provided(
                    config_key,
                    format!("'{}' is not a boolean", raw),
                ));
            }
        },
        Some(ValueType::StringList) => EvaluatedValue::StringList(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Some(ValueType::Duration) => EvaluatedValue::Duration(duration_to_milliseconds(trimmed)),
        Some(ValueType::Json) => EvaluatedValue::Json(serde_json::from_str(raw)?),
        Some(ValueType::LogLevel) => {
            let level: LogLevel =
                serde_json::from_value(serde_json::Value::String(trimmed.to_ascii_uppercase()))
                    .map_err(|_| {
                        EvalError::invalid_provided(
                            config_key,
                            format!("'{}' is not a log level", raw),
                        )
                    })?;
            EvaluatedValue::LogLevel(level)
        }
        Some(ValueType::IntRange) => {
            return Err(EvalError::invalid_provided(
                config_key,
                "int ranges cannot be provided",
            ));
        }
        Some(ValueType::String) | Some(ValueType::NotSet) | None => {
            EvaluatedValue::String(raw.to_string())
        }
    };

    Ok(value)
}
