//! Resolver options loading for Flagstone
//!
//! Builds [`ResolverOptions`] from defaults, JSON/TOML/env files, `.env` and
//! `FLAGSTONE_*` environment variables, then validates them.
//!
//! # Example
//!
//! ```
//! use flagstone_config::*;
//!
//! let options = OptionsBuilder::new()
//!     .with_vars(vec![
//!         ("FLAGSTONE_NAMESPACE", "billing.api"),
//!         ("FLAGSTONE_ON_NO_DEFAULT", "warn"),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(options.namespace.as_deref(), Some("billing.api"));
//! ```

pub mod builder;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use builder::OptionsBuilder;
pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use flagstone_core::{OnNoDefault, ResolverOptions};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, MAX_EVALUATION_DEPTH_LIMIT, Validate};

/// Options from `./.env` (when present) and the process environment
pub fn load_options() -> Result<ResolverOptions> {
    OptionsBuilder::new().with_dotenv(None).with_env().build()
}

/// Options from a file followed by the process environment
pub fn load_options_from(path: impl AsRef<std::path::Path>) -> Result<ResolverOptions> {
    OptionsBuilder::new().with_file(path).with_env().build()
}
