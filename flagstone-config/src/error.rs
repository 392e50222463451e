// Error types for options loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Parse failure for a single named setting
    pub fn invalid_setting(name: &str, raw: &str, expected: &str) -> Self {
        Self::ParseError(format!("{} = '{}' is not {}", name, raw, expected))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_setting_message() {
        let err = ConfigError::invalid_setting("max_evaluation_depth", "deep", "an integer");
        assert_eq!(
            err.to_string(),
            "Failed to parse configuration: max_evaluation_depth = 'deep' is not an integer"
        );
    }
}
