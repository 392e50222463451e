// Flagstone - feature flag and dynamic configuration evaluation for Rust
//
// This library resolves configuration keys against a set of rules: targeting
// criteria, segments, weighted rollouts, encrypted and environment-provided
// values.

// Re-export core functionality
pub use flagstone_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use flagstone_config;

#[cfg(feature = "log")]
pub use flagstone_log;

/// Prelude module for convenient imports
pub mod prelude {
    pub use flagstone_core::{
        Config, ConfigStore, ConfigType, ConfigValue, Context, ContextValue, Contexts,
        EvalError, EvalResult, EvaluatedValue, Evaluation, OnNoDefault, Resolver,
        ResolverOptions, Snapshot, ValueType,
    };

    #[cfg(feature = "config")]
    pub use flagstone_config::{ConfigError, OptionsBuilder, load_options, load_options_from};

    #[cfg(feature = "log")]
    pub use flagstone_log::LogConfig;
}
