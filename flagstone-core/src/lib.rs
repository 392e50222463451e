//! Rule evaluation engine for Flagstone
//!
//! Evaluates feature flags and dynamic configuration against caller-supplied
//! contexts: ordered rule tables, property criteria, reusable segments,
//! consistent-hash rollouts, encrypted secrets and environment-provided
//! values.
//!
//! # Features
//!
//! - 🎯 **Targeting** - Property criteria over named contexts
//! - 🎲 **Rollouts** - Deterministic weighted values hashed on a context property
//! - 🧩 **Segments** - Reusable boolean configs referenced from other rules
//! - 🔐 **Secrets** - AES-256-GCM encrypted values with redacted reporting
//! - 🌍 **Environments** - Per-environment rows with a shared fallback
//!
//! # Quick Start
//!
//! ```
//! use flagstone_core::*;
//! use std::sync::Arc;
//!
//! let config = Config::new(
//!     "greeting",
//!     ConfigType::Config,
//!     vec![Row::new(vec![
//!         ConditionalValue::new(
//!             vec![Criterion::new(
//!                 "user.country",
//!                 Operator::PropIsOneOf,
//!                 ConfigValue::string_list(["US", "UK"]),
//!             )],
//!             ConfigValue::string("howdy"),
//!         ),
//!         ConditionalValue::always(ConfigValue::string("hello")),
//!     ])],
//! );
//!
//! let store = Arc::new(ConfigStore::from_configs(vec![config]));
//! let resolver = Resolver::with_store(store, ResolverOptions::default());
//!
//! let us = Contexts::new().with_property("user", "country", "US");
//! let value = resolver.get("greeting", Some(&us), None).unwrap();
//! assert_eq!(value.as_ref().and_then(|v| v.as_str()), Some("howdy"));
//! ```
//!
//! # Gradual Rollout
//!
//! ```
//! use flagstone_core::*;
//!
//! // 10% of users, bucketed by tracking id
//! let rollout = ConfigValue::weighted(
//!     vec![(90, ConfigValue::bool(false)), (10, ConfigValue::bool(true))],
//!     Some("user.trackingId"),
//! );
//! let flag = Config::new(
//!     "flag.weighted",
//!     ConfigType::FeatureFlag,
//!     vec![Row::new(vec![ConditionalValue::always(rollout)])],
//! );
//!
//! let resolver = Resolver::new(ResolverOptions::default());
//! resolver.store().replace(vec![flag]);
//!
//! let user = Contexts::new().with_property("user", "trackingId", "120");
//! // The bucket is seeded with the config key plus the property value
//! assert!(resolver.is_feature_enabled("flag.weighted", Some(&user)).unwrap());
//! ```
//!
//! # Loading Configs
//!
//! ```
//! use flagstone_core::*;
//!
//! let snapshot = Snapshot::from_json(r#"{"configs": [{
//!     "id": 1,
//!     "key": "max.retries",
//!     "configType": "CONFIG",
//!     "valueType": "INT",
//!     "rows": [{"values": [{"value": {"int": 3}}]}]
//! }]}"#).unwrap();
//!
//! let resolver = Resolver::new(ResolverOptions::default());
//! resolver.store().load_snapshot(snapshot);
//!
//! let retries = resolver.get("max.retries", None, None).unwrap();
//! assert_eq!(retries.and_then(|v| v.as_int()), Some(3));
//! ```

pub mod context;
pub mod criteria;
pub mod distribution;
pub mod duration;
pub mod encryption;
pub mod env;
pub mod error;
pub mod evaluation;
pub mod evaluator;
pub mod model;
pub mod options;
pub mod resolver;
pub mod selector;
pub mod store;
pub mod summaries;
pub mod unwrap;
pub mod version;

pub use context::{CURRENT_TIME_PROPERTY, Context, ContextValue, Contexts};
pub use distribution::{percentile, rollout_percentile, weighted_value_percentile};
pub use duration::duration_to_milliseconds;
pub use encryption::CryptoError;
pub use env::{EnvLookup, ProcessEnv};
pub use error::{EvalError, EvalResult};
pub use evaluation::{EvaluatedValue, Evaluation};
pub use evaluator::{Evaluator, NestedEvaluator};
pub use model::{
    ConditionalValue, Config, ConfigRecord, ConfigType, ConfigValue, Criterion, IntRange,
    LogLevel, Operator, Provided, ProvidedSource, Row, ValueKind, ValueType, WeightedValue,
    WeightedValues,
};
pub use options::{DEFAULT_MAX_EVALUATION_DEPTH, OnNoDefault, ResolverOptions};
pub use resolver::Resolver;
pub use store::{ConfigMap, ConfigStore, Snapshot};
pub use summaries::{EvaluationSummaries, SummaryCounter, SummaryKey, SummaryReport};
pub use unwrap::reportable_fingerprint;
pub use version::SemanticVersion;
