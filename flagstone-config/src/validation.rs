// Options validation

use crate::{ConfigError, Result};
use flagstone_core::ResolverOptions;

/// Largest accepted `maxEvaluationDepth`
pub const MAX_EVALUATION_DEPTH_LIMIT: usize = 64;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a number is within an inclusive range
    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate that a number is zero or greater
    pub fn non_negative(value: i64, field: &str) -> Result<()> {
        if value < 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must not be negative",
                field
            )));
        }
        Ok(())
    }
}

impl Validate for ResolverOptions {
    fn validate(&self) -> Result<()> {
        if let Some(namespace) = &self.namespace {
            ConfigValidator::not_empty(namespace, "namespace")?;
        }
        if let Some(project_env_id) = self.project_env_id {
            ConfigValidator::non_negative(project_env_id, "projectEnvId")?;
        }
        ConfigValidator::in_range(
            self.max_evaluation_depth,
            1,
            MAX_EVALUATION_DEPTH_LIMIT,
            "maxEvaluationDepth",
        )
    }
}
