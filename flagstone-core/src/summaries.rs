//! In-memory aggregation of evaluation telemetry
//!
//! Counts are grouped by `(config key, config type)` and then by the exact
//! outcome of the evaluation. Shipping the counts anywhere is left to the
//! caller via [`EvaluationSummaries::drain`].

use crate::evaluation::Evaluation;
use crate::model::ConfigType;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;

/// Grouping key of a summary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryKey {
    pub config_key: String,
    pub config_type: ConfigType,
}

/// One distinct evaluation outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounter {
    pub config_id: i64,
    pub conditional_value_index: Option<usize>,
    pub config_row_index: Option<usize>,
    /// Declared or inferred value type name
    pub value_type: Option<&'static str>,
    /// Reportable value when present, the raw value otherwise
    pub selected_value: Option<String>,
    pub weighted_value_index: Option<usize>,
}

impl SummaryCounter {
    fn from_evaluation(evaluation: &Evaluation) -> Self {
        Self {
            config_id: evaluation.config_id,
            conditional_value_index: evaluation.conditional_value_index,
            config_row_index: evaluation.config_row_index,
            value_type: evaluation.value_type.map(|t| t.as_str()),
            selected_value: evaluation.reportable(),
            weighted_value_index: evaluation.weighted_value_index,
        }
    }
}

/// Counts gathered since `start`
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summaries: HashMap<SummaryKey, HashMap<SummaryCounter, u64>>,
}

impl SummaryReport {
    /// Count for one outcome, 0 when never seen
    pub fn count(&self, key: &SummaryKey, counter: &SummaryCounter) -> u64 {
        self.summaries
            .get(key)
            .and_then(|counters| counters.get(counter))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all counts for a config
    pub fn total_for(&self, config_key: &str) -> u64 {
        self.summaries
            .iter()
            .filter(|(key, _)| key.config_key == config_key)
            .flat_map(|(_, counters)| counters.values())
            .sum()
    }
}

struct Window {
    start: DateTime<Utc>,
    counts: HashMap<SummaryKey, HashMap<SummaryCounter, u64>>,
}

impl Window {
    fn open() -> Self {
        Self {
            start: Utc::now(),
            counts: HashMap::new(),
        }
    }
}

/// Thread-safe evaluation summary aggregator
pub struct EvaluationSummaries {
    window: Mutex<Window>,
}

impl Default for EvaluationSummaries {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationSummaries {
    pub fn new() -> Self {
        Self {
            window: Mutex::new(Window::open()),
        }
    }

    /// Count one matched evaluation. Unmatched evaluations are skipped.
    pub fn record(&self, evaluation: &Evaluation) {
        if !evaluation.is_match() {
            return;
        }

        let key = SummaryKey {
            config_key: evaluation.config_key.clone(),
            config_type: evaluation.config_type,
        };
        let counter = SummaryCounter::from_evaluation(evaluation);

        let mut window = self.window.lock();
        *window
            .counts
            .entry(key)
            .or_default()
            .entry(counter)
            .or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.window.lock().counts.is_empty()
    }

    /// Take the current counts and start a new window
    pub fn drain(&self) -> SummaryReport {
        let previous = std::mem::replace(&mut *self.window.lock(), Window::open());
        SummaryReport {
            start: previous.start,
            end: Utc::now(),
            summaries: previous.counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::EvaluatedValue;
    use crate::model::{Config, ValueType};

    fn evaluation(key: &str, value: EvaluatedValue, row: usize) -> Evaluation {
        let config = Config::new(key, ConfigType::FeatureFlag, Vec::new()).with_id(9);
        Evaluation {
            config_row_index: Some(row),
            conditional_value_index: Some(0),
            value_type: Some(value.value_type()),
            value: Some(value),
            ..Evaluation::unmatched(&config)
        }
    }

    #[test]
    fn test_counts_identical_outcomes_together() {
        let summaries = EvaluationSummaries::new();
        for _ in 0..3 {
            summaries.record(&evaluation("flag", EvaluatedValue::Bool(true), 0));
        }
        summaries.record(&evaluation("flag", EvaluatedValue::Bool(false), 1));

        let report = summaries.drain();
        let key = SummaryKey {
            config_key: "flag".to_string(),
            config_type: ConfigType::FeatureFlag,
        };

        assert_eq!(report.summaries[&key].len(), 2);
        assert_eq!(report.total_for("flag"), 4);

        let counter = SummaryCounter {
            config_id: 9,
            conditional_value_index: Some(0),
            config_row_index: Some(0),
            value_type: Some(ValueType::Bool.as_str()),
            selected_value: Some("true".to_string()),
            weighted_value_index: None,
        };
        assert_eq!(report.count(&key, &counter), 3);
    }

    #[test]
    fn test_unmatched_are_skipped() {
        let summaries = EvaluationSummaries::new();
        let config = Config::new("missing", ConfigType::Config, Vec::new());
        summaries.record(&Evaluation::unmatched(&config));
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_reportable_value_is_used() {
        let summaries = EvaluationSummaries::new();
        let mut secret = evaluation("db.password", EvaluatedValue::from("hunter2"), 0);
        secret.reportable_value = Some("*****abcde".to_string());
        summaries.record(&secret);

        let report = summaries.drain();
        let selected: Vec<_> = report
            .summaries
            .values()
            .flat_map(|counters| counters.keys())
            .map(|counter| counter.selected_value.clone())
            .collect();
        assert_eq!(selected, vec![Some("*****abcde".to_string())]);
    }

    #[test]
    fn test_drain_resets() {
        let summaries = EvaluationSummaries::new();
        summaries.record(&evaluation("flag", EvaluatedValue::Bool(true), 0));
        assert!(!summaries.is_empty());

        let report = summaries.drain();
        assert!(report.end >= report.start);
        assert!(summaries.is_empty());
        assert_eq!(summaries.drain().total_for("flag"), 0);
    }
}
