//! Error types for flag evaluation

use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluation errors
///
/// These are data or programmer errors. Run-time absence (a missing segment,
/// a missing context property, a regex that does not compile) degrades to a
/// non-match with a warning instead of surfacing here.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Criterion carries an operator this engine does not know
    #[error("Unknown criterion operator for property '{property}'")]
    UnknownOperator {
        /// Property the criterion was written against
        property: String,
    },

    /// Matched value cannot be turned into a caller-facing value
    #[error("Unsupported value for key '{key}': {kind}")]
    UnsupportedValue {
        /// Config key being evaluated
        key: String,
        /// Discriminant that was found
        kind: &'static str,
    },

    /// The config named by `decryptWith` does not exist or has no value
    #[error("Decryption key config '{0}' not found")]
    MissingDecryptionKey(String),

    /// The config named by `decryptWith` did not resolve to a string
    #[error("Decryption key config '{0}' did not resolve to a string")]
    DecryptionKeyNotString(String),

    /// Provided value points at an unset environment variable
    #[error("Environment variable '{name}' for key '{key}' is not set")]
    MissingEnvVar {
        /// Config key being evaluated
        key: String,
        /// Environment variable name
        name: String,
    },

    /// Provided value could not be coerced into the declared type
    #[error("Invalid provided value for key '{key}': {message}")]
    InvalidProvidedValue {
        /// Config key being evaluated
        key: String,
        /// What went wrong
        message: String,
    },

    /// Duration value has no definition string
    #[error("Duration value for key '{0}' has no definition")]
    MissingDurationDefinition(String),

    /// Nothing matched and no default was supplied
    #[error("No value found for key '{0}'")]
    NoValueFound(String),

    /// Nested segment or decryption key evaluation went too deep
    #[error("Evaluation depth limit of {limit} exceeded at key '{key}'")]
    RecursionLimit {
        /// Key at which the limit was hit
        key: String,
        /// Configured limit
        limit: usize,
    },

    /// Configuration record failed construction checks
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// JSON payload could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Encryption or decryption failed
    #[error(transparent)]
    Crypto(#[from] crate::encryption::CryptoError),
}

impl EvalError {
    /// Create an invalid config error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid provided value error
    pub fn invalid_provided(key: &str, msg: impl Into<String>) -> Self {
        Self::InvalidProvidedValue {
            key: key.to_string(),
            message: msg.into(),
        }
    }

    /// Check if this error is the "no value found" policy error
    pub fn is_no_value_found(&self) -> bool {
        matches!(self, Self::NoValueFound(_))
    }
}
