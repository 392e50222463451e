//! Evaluation pipeline
//!
//! Selection, criterion matching and unwrapping against one configuration
//! snapshot. Segments and decryption keys re-enter the pipeline through
//! [`NestedEvaluator`], one level deeper each time.

use crate::context::Contexts;
use crate::criteria::MatchContext;
use crate::env::{EnvLookup, ProcessEnv};
use crate::error::{EvalError, EvalResult};
use crate::evaluation::Evaluation;
use crate::options::DEFAULT_MAX_EVALUATION_DEPTH;
use crate::selector::select;
use crate::store::ConfigMap;
use crate::unwrap::{UnwrapContext, unwrap_value};
use tracing::trace;

/// Re-entry point for segment and decryption-key lookups
pub trait NestedEvaluator {
    /// Evaluate `key` at nesting `depth`. `Ok(None)` when no such config exists.
    fn evaluate_nested(
        &self,
        key: &str,
        contexts: &Contexts,
        depth: usize,
    ) -> EvalResult<Option<Evaluation>>;
}

/// Evaluates configs from a fixed snapshot
pub struct Evaluator<'a> {
    configs: &'a ConfigMap,
    project_env_id: Option<i64>,
    namespace: Option<&'a str>,
    max_depth: usize,
    env: &'a dyn EnvLookup,
}

impl<'a> Evaluator<'a> {
    pub fn new(configs: &'a ConfigMap) -> Self {
        Self {
            configs,
            project_env_id: None,
            namespace: None,
            max_depth: DEFAULT_MAX_EVALUATION_DEPTH,
            env: &ProcessEnv,
        }
    }

    pub fn with_project_env_id(mut self, project_env_id: Option<i64>) -> Self {
        self.project_env_id = project_env_id;
        self
    }

    pub fn with_namespace(mut self, namespace: Option<&'a str>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_env(mut self, env: &'a dyn EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Evaluate `key` against `contexts`.
    ///
    /// `Ok(None)` when the config does not exist. A config that exists but
    /// has no matching value yields an evaluation whose `value` is `None`.
    pub fn evaluate(&self, key: &str, contexts: &Contexts) -> EvalResult<Option<Evaluation>> {
        self.evaluate_at(key, contexts, 0)
    }

    fn evaluate_at(
        &self,
        key: &str,
        contexts: &Contexts,
        depth: usize,
    ) -> EvalResult<Option<Evaluation>> {
        if depth > self.max_depth {
            return Err(EvalError::RecursionLimit {
                key: key.to_string(),
                limit: self.max_depth,
            });
        }

        let Some(config) = self.configs.get(key) else {
            return Ok(None);
        };

        let match_ctx = MatchContext {
            contexts,
            namespace: self.namespace,
            evaluator: self,
            depth,
        };

        let Some(selection) = select(&config.rows, self.project_env_id, &match_ctx)? else {
            trace!(key = %key, "No conditional value matched");
            return Ok(Some(Evaluation::unmatched(config)));
        };

        let unwrap_ctx = UnwrapContext {
            config_key: key,
            value_type: config.value_type,
            contexts,
            evaluator: self,
            env: self.env,
            depth,
        };
        let unwrapped = unwrap_value(selection.value, &unwrap_ctx)?;

        let evaluation = Evaluation {
            value_type: config.value_type.or(Some(unwrapped.value.value_type())),
            config_row_index: Some(selection.row_index),
            conditional_value_index: Some(selection.conditional_value_index),
            weighted_value_index: unwrapped.weighted_value_index,
            reportable_value: unwrapped.reportable_value,
            value: Some(unwrapped.value),
            ..Evaluation::unmatched(config)
        };

        trace!(
            key = %key,
            depth = depth,
            row = selection.row_index,
            conditional_value = selection.conditional_value_index,
            value = ?evaluation.reportable(),
            "Evaluated config"
        );

        Ok(Some(evaluation))
    }
}

impl NestedEvaluator for Evaluator<'_> {
    fn evaluate_nested(
        &self,
        key: &str,
        contexts: &Contexts,
        depth: usize,
    ) -> EvalResult<Option<Evaluation>> {
        self.evaluate_at(key, contexts, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::EvaluatedValue;
    use crate::model::{
        ConditionalValue, Config, ConfigType, ConfigValue, Criterion, Operator, Row, ValueType,
    };
    use std::collections::HashMap;
    use std::sync::Arc;

    fn map(configs: Vec<Config>) -> ConfigMap {
        configs
            .into_iter()
            .map(|c| (c.key.clone(), Arc::new(c)))
            .collect()
    }

    fn segment(key: &str, criteria: Vec<Criterion>) -> Config {
        Config::new(
            key,
            ConfigType::Segment,
            vec![Row::new(vec![
                ConditionalValue::new(criteria, ConfigValue::bool(true)),
                ConditionalValue::always(ConfigValue::bool(false)),
            ])],
        )
        .with_value_type(ValueType::Bool)
    }

    fn gated(key: &str, operator: Operator, segment_key: &str) -> Config {
        Config::new(
            key,
            ConfigType::FeatureFlag,
            vec![Row::new(vec![
                ConditionalValue::new(
                    vec![Criterion::new("", operator, ConfigValue::string(segment_key))],
                    ConfigValue::string("inside"),
                ),
                ConditionalValue::always(ConfigValue::string("outside")),
            ])],
        )
    }

    fn value_of(configs: &ConfigMap, key: &str, contexts: &Contexts) -> Option<EvaluatedValue> {
        Evaluator::new(configs)
            .evaluate(key, contexts)
            .unwrap()
            .and_then(|e| e.value)
    }

    #[test]
    fn test_int_config_indices() {
        let configs = map(vec![
            Config::new(
                "answer",
                ConfigType::Config,
                vec![Row::new(vec![ConditionalValue::always(ConfigValue::int(42))])],
            )
            .with_id(17)
            .with_value_type(ValueType::Int),
        ]);

        let evaluation = Evaluator::new(&configs)
            .evaluate("answer", &Contexts::new())
            .unwrap()
            .unwrap();

        assert_eq!(evaluation.config_id, 17);
        assert_eq!(evaluation.value, Some(EvaluatedValue::Int(42)));
        assert_eq!(evaluation.config_row_index, Some(0));
        assert_eq!(evaluation.conditional_value_index, Some(0));
        assert_eq!(evaluation.weighted_value_index, None);
    }

    #[test]
    fn test_missing_and_unmatched() {
        let configs = map(vec![Config::new(
            "us.only",
            ConfigType::Config,
            vec![Row::new(vec![ConditionalValue::new(
                vec![Criterion::new(
                    "user.country",
                    Operator::PropIsOneOf,
                    ConfigValue::string_list(["US"]),
                )],
                ConfigValue::string("x"),
            )])],
        )]);

        let evaluator = Evaluator::new(&configs);
        assert!(evaluator.evaluate("nope", &Contexts::new()).unwrap().is_none());

        let evaluation = evaluator.evaluate("us.only", &Contexts::new()).unwrap().unwrap();
        assert!(!evaluation.is_match());
        assert_eq!(evaluation.config_row_index, None);
    }

    #[test]
    fn test_inferred_value_type() {
        let configs = map(vec![Config::new(
            "legacy",
            ConfigType::Config,
            vec![Row::new(vec![ConditionalValue::always(ConfigValue::double(0.5))])],
        )]);

        let evaluation = Evaluator::new(&configs)
            .evaluate("legacy", &Contexts::new())
            .unwrap()
            .unwrap();
        assert_eq!(evaluation.value_type, Some(ValueType::Double));
    }

    #[test]
    fn test_segment_membership() {
        let configs = map(vec![
            segment(
                "seg.beta",
                vec![Criterion::new(
                    "user.email",
                    Operator::PropEndsWithOneOf,
                    ConfigValue::string_list(["@example.com"]),
                )],
            ),
            gated("in.beta", Operator::InSeg, "seg.beta"),
            gated("not.in.beta", Operator::NotInSeg, "seg.beta"),
        ]);

        let member = Contexts::new().with_property("user", "email", "a@example.com");
        let outsider = Contexts::new().with_property("user", "email", "a@other.org");

        assert_eq!(value_of(&configs, "in.beta", &member), Some("inside".into()));
        assert_eq!(value_of(&configs, "in.beta", &outsider), Some("outside".into()));
        assert_eq!(value_of(&configs, "not.in.beta", &member), Some("outside".into()));
        assert_eq!(value_of(&configs, "not.in.beta", &outsider), Some("inside".into()));
    }

    #[test]
    fn test_missing_segment_is_not_a_member() {
        let configs = map(vec![
            gated("in.ghost", Operator::InSeg, "seg.ghost"),
            gated("not.in.ghost", Operator::NotInSeg, "seg.ghost"),
        ]);

        assert_eq!(value_of(&configs, "in.ghost", &Contexts::new()), Some("outside".into()));
        assert_eq!(value_of(&configs, "not.in.ghost", &Contexts::new()), Some("inside".into()));
    }

    #[test]
    fn test_cyclic_segments_hit_recursion_limit() {
        let configs = map(vec![
            segment(
                "seg.a",
                vec![Criterion::new("", Operator::InSeg, ConfigValue::string("seg.b"))],
            ),
            segment(
                "seg.b",
                vec![Criterion::new("", Operator::InSeg, ConfigValue::string("seg.a"))],
            ),
        ]);

        let result = Evaluator::new(&configs)
            .with_max_depth(5)
            .evaluate("seg.a", &Contexts::new());

        assert!(matches!(result, Err(EvalError::RecursionLimit { limit: 5, .. })));
    }

    #[test]
    fn test_namespace_and_environment() {
        let configs = map(vec![Config::new(
            "timeout",
            ConfigType::Config,
            vec![
                Row::new(vec![
                    ConditionalValue::new(
                        vec![Criterion::new(
                            "",
                            Operator::HierarchicalMatch,
                            ConfigValue::string("billing"),
                        )],
                        ConfigValue::int(30),
                    ),
                    ConditionalValue::always(ConfigValue::int(10)),
                ]),
                Row::for_environment(2, vec![ConditionalValue::always(ConfigValue::int(99))]),
            ],
        )]);

        let contexts = Contexts::new();
        let in_billing = Evaluator::new(&configs).with_namespace(Some("billing"));
        assert_eq!(
            in_billing.evaluate("timeout", &contexts).unwrap().unwrap().value,
            Some(EvaluatedValue::Int(30))
        );

        let env_two = Evaluator::new(&configs).with_project_env_id(Some(2));
        let evaluation = env_two.evaluate("timeout", &contexts).unwrap().unwrap();
        assert_eq!(evaluation.value, Some(EvaluatedValue::Int(99)));
        assert_eq!(evaluation.config_row_index, Some(1));

        assert_eq!(value_of(&configs, "timeout", &contexts), Some(EvaluatedValue::Int(10)));
    }

    #[test]
    fn test_unknown_operator_is_fatal() {
        let configs = map(vec![Config::new(
            "broken",
            ConfigType::Config,
            vec![Row::new(vec![ConditionalValue::new(
                vec![Criterion::new("user.id", Operator::Unknown, ConfigValue::string("x"))],
                ConfigValue::int(1),
            )])],
        )]);

        assert!(matches!(
            Evaluator::new(&configs).evaluate("broken", &Contexts::new()),
            Err(EvalError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_provided_value_uses_injected_env() {
        let configs = map(vec![
            Config::new(
                "port",
                ConfigType::Config,
                vec![Row::new(vec![ConditionalValue::always(ConfigValue::provided(
                    crate::model::Provided::env_var("APP_PORT"),
                ))])],
            )
            .with_value_type(ValueType::Int),
        ]);

        let mut env = HashMap::new();
        env.insert("APP_PORT".to_string(), "9000".to_string());

        let evaluation = Evaluator::new(&configs)
            .with_env(&env)
            .evaluate("port", &Contexts::new())
            .unwrap()
            .unwrap();
        assert_eq!(evaluation.value, Some(EvaluatedValue::Int(9000)));
    }
}
