//! Resolver facade
//!
//! Owns the shared configuration store and options, merges call-local
//! contexts over the stored defaults, and applies the no-default policy.

use crate::context::Contexts;
use crate::env::{EnvLookup, ProcessEnv};
use crate::error::{EvalError, EvalResult};
use crate::evaluation::{EvaluatedValue, Evaluation};
use crate::evaluator::Evaluator;
use crate::options::{OnNoDefault, ResolverOptions};
use crate::store::ConfigStore;
use crate::summaries::EvaluationSummaries;
use std::sync::Arc;
use tracing::{trace, warn};
use uuid::Uuid;

/// Evaluates keys against the live configuration set.
///
/// Clones share the store and summaries; each clone carries its own
/// default contexts and instance id.
#[derive(Clone)]
pub struct Resolver {
    id: Uuid,
    store: Arc<ConfigStore>,
    options: Arc<ResolverOptions>,
    contexts: Contexts,
    env: Arc<dyn EnvLookup>,
    summaries: Arc<EvaluationSummaries>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("id", &self.id)
            .field("configs", &self.store.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Resolver {
    /// Resolver over an empty store
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_store(Arc::new(ConfigStore::new()), options)
    }

    /// Resolver over an existing, possibly shared, store
    pub fn with_store(store: Arc<ConfigStore>, options: ResolverOptions) -> Self {
        let contexts = options.global_context.clone();
        Self {
            id: Uuid::new_v4(),
            store,
            options: Arc::new(options),
            contexts,
            env: Arc::new(ProcessEnv),
            summaries: Arc::new(EvaluationSummaries::new()),
        }
    }

    /// Use `env` for provided (environment variable) values
    pub fn with_env_lookup(mut self, env: impl EnvLookup + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn summaries(&self) -> &Arc<EvaluationSummaries> {
        &self.summaries
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Default contexts of this resolver
    pub fn contexts(&self) -> &Contexts {
        &self.contexts
    }

    /// Full evaluation of `key`, with match metadata.
    ///
    /// `Ok(None)` when the key is unknown.
    pub fn evaluate(
        &self,
        key: &str,
        local_contexts: Option<&Contexts>,
    ) -> EvalResult<Option<Evaluation>> {
        let contexts = match local_contexts {
            Some(local) => self.contexts.merged_with(local),
            None => self.contexts.clone(),
        };

        let snapshot = self.store.snapshot();
        let evaluation = Evaluator::new(&snapshot)
            .with_project_env_id(self.options.project_env_id)
            .with_namespace(self.options.namespace.as_deref())
            .with_max_depth(self.options.max_evaluation_depth)
            .with_env(self.env.as_ref())
            .evaluate(key, &contexts)?;

        if self.options.collect_evaluation_summaries {
            if let Some(evaluation) = &evaluation {
                self.summaries.record(evaluation);
            }
        }

        Ok(evaluation)
    }

    /// Value of `key`, falling back to `default` and then to the
    /// no-default policy.
    pub fn get(
        &self,
        key: &str,
        local_contexts: Option<&Contexts>,
        default: Option<EvaluatedValue>,
    ) -> EvalResult<Option<EvaluatedValue>> {
        let value = self
            .evaluate(key, local_contexts)?
            .and_then(|evaluation| evaluation.value);

        if let Some(value) = value {
            return Ok(Some(value));
        }
        if default.is_some() {
            trace!(key = %key, "No value found, using default");
            return Ok(default);
        }

        match self.options.on_no_default {
            OnNoDefault::Error => Err(EvalError::NoValueFound(key.to_string())),
            OnNoDefault::Warn => {
                warn!(key = %key, "No value found");
                Ok(None)
            }
            OnNoDefault::Ignore => Ok(None),
        }
    }

    /// Whether a feature flag is on.
    ///
    /// Booleans pass through and the strings `"true"`/`"false"` are coerced.
    /// Any other value is off, with a warning. Evaluation errors propagate.
    pub fn is_feature_enabled(
        &self,
        key: &str,
        local_contexts: Option<&Contexts>,
    ) -> EvalResult<bool> {
        let value = self.get(key, local_contexts, Some(EvaluatedValue::Bool(false)))?;

        match value {
            Some(EvaluatedValue::Bool(enabled)) => Ok(enabled),
            Some(EvaluatedValue::String(s)) if s == "true" => Ok(true),
            Some(EvaluatedValue::String(s)) if s == "false" => Ok(false),
            Some(other) => {
                warn!(
                    key = %key,
                    value_type = other.value_type().as_str(),
                    "Feature flag is not a boolean, treating as disabled"
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Clone whose default contexts are `contexts` laid over this one's
    pub fn clone_with_contexts(&self, contexts: &Contexts) -> Self {
        Self {
            id: Uuid::new_v4(),
            contexts: self.contexts.merged_with(contexts),
            ..self.clone()
        }
    }

    /// Run `f` with a resolver scoped to `contexts`
    pub fn in_context<T>(&self, contexts: &Contexts, f: impl FnOnce(&Resolver) -> T) -> T {
        let scoped = self.clone_with_contexts(contexts);
        f(&scoped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConditionalValue, Config, ConfigType, ConfigValue, Criterion, Operator, Row};
    use std::collections::HashMap;

    fn flag(key: &str, value: ConfigValue) -> Config {
        Config::new(
            key,
            ConfigType::FeatureFlag,
            vec![Row::new(vec![ConditionalValue::always(value)])],
        )
    }

    fn country_config() -> Config {
        Config::new(
            "greeting",
            ConfigType::Config,
            vec![Row::new(vec![
                ConditionalValue::new(
                    vec![Criterion::new(
                        "user.country",
                        Operator::PropIsOneOf,
                        ConfigValue::string_list(["US", "UK"]),
                    )],
                    ConfigValue::string("correct"),
                ),
                ConditionalValue::always(ConfigValue::string("default")),
            ])],
        )
    }

    fn resolver(configs: Vec<Config>, options: ResolverOptions) -> Resolver {
        Resolver::with_store(Arc::new(ConfigStore::from_configs(configs)), options)
    }

    #[test]
    fn test_get_merges_local_over_global() {
        let options = ResolverOptions::default()
            .with_global_context(Contexts::new().with_property("user", "country", "FR"));
        let r = resolver(vec![country_config()], options);

        assert_eq!(r.get("greeting", None, None).unwrap(), Some("default".into()));

        let us = Contexts::new().with_property("user", "country", "US");
        assert_eq!(r.get("greeting", Some(&us), None).unwrap(), Some("correct".into()));
    }

    #[test]
    fn test_no_default_policies() {
        let err = resolver(Vec::new(), ResolverOptions::default())
            .get("missing.key", None, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "No value found for key 'missing.key'");

        let warn = resolver(
            Vec::new(),
            ResolverOptions::default().with_on_no_default(OnNoDefault::Warn),
        );
        assert_eq!(warn.get("missing.key", None, None).unwrap(), None);

        let ignore = resolver(
            Vec::new(),
            ResolverOptions::default().with_on_no_default(OnNoDefault::Ignore),
        );
        assert_eq!(ignore.get("missing.key", None, None).unwrap(), None);
    }

    #[test]
    fn test_default_is_used_when_nothing_matches() {
        let r = resolver(Vec::new(), ResolverOptions::default());
        assert_eq!(
            r.get("missing.key", None, Some(EvaluatedValue::Int(5))).unwrap(),
            Some(EvaluatedValue::Int(5))
        );
    }

    #[test]
    fn test_is_feature_enabled_coercion() {
        let r = resolver(
            vec![
                flag("on", ConfigValue::bool(true)),
                flag("off", ConfigValue::bool(false)),
                flag("text.true", ConfigValue::string("true")),
                flag("text.false", ConfigValue::string("false")),
                flag("number", ConfigValue::int(1)),
            ],
            ResolverOptions::default(),
        );

        assert!(r.is_feature_enabled("on", None).unwrap());
        assert!(!r.is_feature_enabled("off", None).unwrap());
        assert!(r.is_feature_enabled("text.true", None).unwrap());
        assert!(!r.is_feature_enabled("text.false", None).unwrap());
        assert!(!r.is_feature_enabled("number", None).unwrap());
        assert!(!r.is_feature_enabled("missing", None).unwrap());
    }

    #[test]
    fn test_is_feature_enabled_propagates_errors() {
        let r = resolver(
            vec![flag(
                "needs.env",
                ConfigValue::provided(crate::model::Provided::env_var("NOT_SET_ANYWHERE")),
            )],
            ResolverOptions::default(),
        )
        .with_env_lookup(HashMap::<String, String>::new());

        assert!(matches!(
            r.get("needs.env", None, None),
            Err(EvalError::MissingEnvVar { .. })
        ));
        assert!(matches!(
            r.is_feature_enabled("needs.env", None),
            Err(EvalError::MissingEnvVar { .. })
        ));
    }

    #[test]
    fn test_is_feature_enabled_unknown_operator() {
        let broken = Config::new(
            "broken",
            ConfigType::FeatureFlag,
            vec![Row::new(vec![ConditionalValue::new(
                vec![Criterion::new("user.k", Operator::Unknown, ConfigValue::string("x"))],
                ConfigValue::bool(true),
            )])],
        );
        let r = resolver(vec![broken], ResolverOptions::default());

        assert!(matches!(
            r.is_feature_enabled("broken", None),
            Err(EvalError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_in_context_scopes_contexts() {
        let r = resolver(vec![country_config()], ResolverOptions::default());
        let us = Contexts::new().with_property("user", "country", "UK");

        let inside = r.in_context(&us, |scoped| {
            assert_eq!(scoped.store().len(), 1);
            scoped.get("greeting", None, None).unwrap()
        });
        assert_eq!(inside, Some("correct".into()));
        assert_eq!(r.get("greeting", None, None).unwrap(), Some("default".into()));
    }

    #[test]
    fn test_clones_share_store() {
        let r = resolver(Vec::new(), ResolverOptions::default());
        let scoped = r.clone_with_contexts(&Contexts::new());
        assert_ne!(r.id(), scoped.id());

        r.store().apply(vec![flag("late", ConfigValue::bool(true))]);
        assert!(scoped.is_feature_enabled("late", None).unwrap());
    }

    #[test]
    fn test_summaries_follow_option() {
        let r = resolver(vec![flag("on", ConfigValue::bool(true))], ResolverOptions::default());
        r.get("on", None, None).unwrap();
        assert_eq!(r.summaries().drain().total_for("on"), 1);

        let quiet = resolver(
            vec![flag("on", ConfigValue::bool(true))],
            ResolverOptions::default().with_evaluation_summaries(false),
        );
        quiet.get("on", None, None).unwrap();
        assert!(quiet.summaries().is_empty());
    }
}
