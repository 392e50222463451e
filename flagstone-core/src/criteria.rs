//! Criterion matching
//!
//! Each operator reads one context property and compares it with the
//! criterion's operand. Missing or mistyped properties never match the
//! positive form of an operator, so the negated forms match them.

use crate::context::{ContextValue, Contexts};
use crate::error::{EvalError, EvalResult};
use crate::evaluation::EvaluatedValue;
use crate::evaluator::NestedEvaluator;
use crate::model::{ConfigValue, Criterion, Operator, ValueKind};
use crate::version::SemanticVersion;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::cmp::Ordering;
use tracing::warn;

/// Everything a criterion may consult besides its own operand
pub struct MatchContext<'a> {
    pub contexts: &'a Contexts,
    /// Operand of hierarchical matches
    pub namespace: Option<&'a str>,
    /// Resolves segments referenced by `IN_SEG` / `NOT_IN_SEG`
    pub evaluator: &'a dyn NestedEvaluator,
    /// Nesting depth of the evaluation this criterion belongs to
    pub depth: usize,
}

/// True when every criterion matches; stops at the first miss.
pub fn all_match(criteria: &[Criterion], ctx: &MatchContext<'_>) -> EvalResult<bool> {
    for criterion in criteria {
        if !criterion_matches(criterion, ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate a single criterion
pub fn criterion_matches(criterion: &Criterion, ctx: &MatchContext<'_>) -> EvalResult<bool> {
    let lookup = || ctx.contexts.lookup(&criterion.property_name);

    let matched = match criterion.operator {
        Operator::AlwaysTrue => true,
        Operator::HierarchicalMatch => match (operand_str(criterion), ctx.namespace) {
            (Some(operand), Some(namespace)) => operand == namespace,
            _ => false,
        },

        Operator::PropIsOneOf => is_one_of(criterion, lookup().as_ref()),
        Operator::PropIsNotOneOf => !is_one_of(criterion, lookup().as_ref()),
        Operator::PropStartsWithOneOf => starts_with_one_of(criterion, lookup().as_ref()),
        Operator::PropDoesNotStartWithOneOf => !starts_with_one_of(criterion, lookup().as_ref()),
        Operator::PropEndsWithOneOf => ends_with_one_of(criterion, lookup().as_ref()),
        Operator::PropDoesNotEndWithOneOf => !ends_with_one_of(criterion, lookup().as_ref()),
        Operator::PropContainsOneOf => contains_one_of(criterion, lookup().as_ref()),
        Operator::PropDoesNotContainOneOf => !contains_one_of(criterion, lookup().as_ref()),

        Operator::PropBefore => compare_dates(criterion, lookup().as_ref()) == Some(Ordering::Less),
        Operator::PropAfter => {
            compare_dates(criterion, lookup().as_ref()) == Some(Ordering::Greater)
        }

        Operator::PropLessThan => matches!(
            compare_numbers(criterion, lookup().as_ref()),
            Some(Ordering::Less)
        ),
        Operator::PropLessThanOrEqual => matches!(
            compare_numbers(criterion, lookup().as_ref()),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::PropGreaterThan => matches!(
            compare_numbers(criterion, lookup().as_ref()),
            Some(Ordering::Greater)
        ),
        Operator::PropGreaterThanOrEqual => matches!(
            compare_numbers(criterion, lookup().as_ref()),
            Some(Ordering::Greater | Ordering::Equal)
        ),

        Operator::PropMatches => regex_match(criterion, lookup().as_ref()) == Some(true),
        Operator::PropDoesNotMatch => regex_match(criterion, lookup().as_ref()) == Some(false),

        Operator::PropSemverLessThan => {
            compare_versions(criterion, lookup().as_ref()) == Some(Ordering::Less)
        }
        Operator::PropSemverEqual => {
            compare_versions(criterion, lookup().as_ref()) == Some(Ordering::Equal)
        }
        Operator::PropSemverGreaterThan => {
            compare_versions(criterion, lookup().as_ref()) == Some(Ordering::Greater)
        }

        Operator::InSeg => in_segment(criterion, ctx)?,
        Operator::NotInSeg => !in_segment(criterion, ctx)?,

        Operator::InIntRange => in_int_range(criterion, lookup().as_ref()),

        Operator::Unknown => {
            return Err(EvalError::UnknownOperator {
                property: criterion.property_name.clone(),
            });
        }
    };

    Ok(matched)
}

fn operand_str(criterion: &Criterion) -> Option<&str> {
    criterion.value_to_match.as_ref().and_then(ConfigValue::as_str)
}

/// Apply `predicate` to the value's string form, or to any element of a list.
fn any_string_form(value: Option<&ContextValue>, predicate: impl Fn(&str) -> bool) -> bool {
    match value {
        None => false,
        Some(ContextValue::List(items)) => items
            .iter()
            .filter_map(ContextValue::string_form)
            .any(|s| predicate(&s)),
        Some(other) => other.string_form().is_some_and(|s| predicate(&s)),
    }
}

fn is_one_of(criterion: &Criterion, value: Option<&ContextValue>) -> bool {
    let candidates = criterion.match_strings();
    any_string_form(value, |s| candidates.iter().any(|c| c == s))
}

fn starts_with_one_of(criterion: &Criterion, value: Option<&ContextValue>) -> bool {
    let candidates = criterion.match_strings();
    any_string_form(value, |s| candidates.iter().any(|c| s.starts_with(c.as_str())))
}

fn ends_with_one_of(criterion: &Criterion, value: Option<&ContextValue>) -> bool {
    let candidates = criterion.match_strings();
    any_string_form(value, |s| candidates.iter().any(|c| s.ends_with(c.as_str())))
}

fn contains_one_of(criterion: &Criterion, value: Option<&ContextValue>) -> bool {
    let candidates = criterion.match_strings();
    any_string_form(value, |s| candidates.iter().any(|c| s.contains(c.as_str())))
}

/// ISO-8601 date-time as epoch millis; no offset means UTC, a bare date means midnight.
fn parse_date_millis(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Context value as epoch millis: numbers directly, strings as ISO-8601.
fn context_millis(value: &ContextValue) -> Option<i64> {
    match value {
        ContextValue::Int(i) => Some(*i),
        ContextValue::Double(d) if d.is_finite() => Some(*d as i64),
        ContextValue::String(s) => parse_date_millis(s),
        _ => None,
    }
}

fn operand_millis(criterion: &Criterion) -> Option<i64> {
    match &criterion.value_to_match.as_ref()?.kind {
        ValueKind::Int(i) => Some(*i),
        ValueKind::Double(d) if d.is_finite() => Some(*d as i64),
        ValueKind::String(s) => parse_date_millis(s),
        _ => None,
    }
}

fn compare_dates(criterion: &Criterion, value: Option<&ContextValue>) -> Option<Ordering> {
    let actual = context_millis(value?)?;
    let expected = operand_millis(criterion)?;
    Some(actual.cmp(&expected))
}

/// Compare ints exactly; anything involving a double compares as `f64`.
fn compare_numbers(criterion: &Criterion, value: Option<&ContextValue>) -> Option<Ordering> {
    let operand = &criterion.value_to_match.as_ref()?.kind;
    match (value?, operand) {
        (ContextValue::Int(actual), ValueKind::Int(expected)) => Some(actual.cmp(expected)),
        (ContextValue::Int(actual), ValueKind::Double(expected)) => {
            (*actual as f64).partial_cmp(expected)
        }
        (ContextValue::Double(actual), ValueKind::Int(expected)) => {
            actual.partial_cmp(&(*expected as f64))
        }
        (ContextValue::Double(actual), ValueKind::Double(expected)) => actual.partial_cmp(expected),
        _ => None,
    }
}

/// `Some(is_match)` for a string property and a compiling pattern, else `None`.
fn regex_match(criterion: &Criterion, value: Option<&ContextValue>) -> Option<bool> {
    let actual = value?.as_str()?;
    let pattern = operand_str(criterion)?;

    match Regex::new(pattern) {
        Ok(regex) => Some(regex.is_match(actual)),
        Err(e) => {
            warn!(
                property = %criterion.property_name,
                pattern = %pattern,
                error = %e,
                "Invalid regex in criterion, treating as non-matching"
            );
            None
        }
    }
}

fn compare_versions(criterion: &Criterion, value: Option<&ContextValue>) -> Option<Ordering> {
    let actual = SemanticVersion::parse_quietly(value?.as_str()?)?;
    let expected = SemanticVersion::parse_quietly(operand_str(criterion)?)?;
    Some(actual.cmp(&expected))
}

fn in_int_range(criterion: &Criterion, value: Option<&ContextValue>) -> bool {
    let Some(ValueKind::IntRange(range)) = criterion.value_to_match.as_ref().map(|v| &v.kind)
    else {
        return false;
    };

    match value {
        Some(ContextValue::Int(i)) => range.contains(*i),
        Some(ContextValue::Double(d)) => *d >= range.start as f64 && *d < range.end as f64,
        _ => false,
    }
}

/// Resolve a segment reference; missing or non-boolean segments count as "not in".
fn in_segment(criterion: &Criterion, ctx: &MatchContext<'_>) -> EvalResult<bool> {
    let Some(segment_key) = operand_str(criterion) else {
        warn!(
            property = %criterion.property_name,
            "Segment criterion has no segment key, treating as not in segment"
        );
        return Ok(false);
    };

    let evaluation = ctx
        .evaluator
        .evaluate_nested(segment_key, ctx.contexts, ctx.depth + 1)?;

    let Some(evaluation) = evaluation else {
        warn!(segment = %segment_key, "Segment not found, treating as not in segment");
        return Ok(false);
    };

    match evaluation.value {
        Some(EvaluatedValue::Bool(member)) => Ok(member),
        Some(other) => {
            warn!(
                segment = %segment_key,
                value_type = ?other.value_type(),
                "Segment did not resolve to a boolean, treating as not in segment"
            );
            Ok(false)
        }
        None => {
            warn!(
                segment = %segment_key,
                "Segment has no matching value, treating as not in segment"
            );
            Ok(false)
        }
    }
}
