// OptionsBuilder - layered resolver options

use crate::env::EnvLoader;
use crate::loader::{ConfigLoader, FileFormat};
use crate::validation::Validate;
use crate::{ConfigError, Result};
use flagstone_core::{OnNoDefault, ResolverOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

enum Source {
    File(PathBuf),
    Dotenv(Option<PathBuf>),
    ProcessEnv,
    Vars(HashMap<String, String>),
}

/// Builds [`ResolverOptions`] from defaults, files and the environment.
///
/// Sources apply in the order they were added; later sources win.
pub struct OptionsBuilder {
    base: ResolverOptions,
    env: EnvLoader,
    sources: Vec<Source>,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            base: ResolverOptions::default(),
            env: EnvLoader::flagstone(),
            sources: Vec::new(),
        }
    }

    /// Start from `options` instead of the defaults
    pub fn with_base(mut self, options: ResolverOptions) -> Self {
        self.base = options;
        self
    }

    /// Use a different environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env = EnvLoader::new(Some(prefix.into()));
        self
    }

    /// Add a JSON, TOML or env file
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(Source::File(path.as_ref().to_path_buf()));
        self
    }

    /// Add a `.env` file; `None` reads `./.env` and skips it when absent
    pub fn with_dotenv(mut self, path: Option<&str>) -> Self {
        self.sources.push(Source::Dotenv(path.map(PathBuf::from)));
        self
    }

    /// Add the process environment
    pub fn with_env(mut self) -> Self {
        self.sources.push(Source::ProcessEnv);
        self
    }

    /// Add an explicit set of prefixed variables
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.sources.push(Source::Vars(self.env.load_from(vars)));
        self
    }

    /// Apply all sources and validate the result
    pub fn build(self) -> Result<ResolverOptions> {
        let mut options = self.base.clone();

        for source in &self.sources {
            match source {
                Source::File(path) => {
                    let loader = ConfigLoader::auto(path)?;
                    let document = loader.load_file(path)?;
                    options = match loader.format() {
                        FileFormat::Env => apply_settings(options, &self.env_settings(document)?)?,
                        FileFormat::Json | FileFormat::Toml => apply_document(options, document)?,
                    };
                    debug!(path = %path.display(), "Loaded options file");
                }
                Source::Dotenv(path) => {
                    let pairs = match path {
                        Some(path) => read_dotenv(path)?,
                        None if Path::new(".env").exists() => read_dotenv(Path::new(".env"))?,
                        None => Vec::new(),
                    };
                    options = apply_settings(options, &self.env.load_from(pairs))?;
                }
                Source::ProcessEnv => {
                    options = apply_settings(options, &self.env.load())?;
                }
                Source::Vars(vars) => {
                    options = apply_settings(options, vars)?;
                }
            }
        }

        options.validate()?;
        debug!(
            namespace = ?options.namespace,
            project_env_id = ?options.project_env_id,
            on_no_default = %options.on_no_default,
            max_evaluation_depth = options.max_evaluation_depth,
            "Resolved options"
        );

        Ok(options)
    }

    fn env_settings(&self, document: Value) -> Result<HashMap<String, String>> {
        let Value::Object(map) = document else {
            return Err(ConfigError::ParseError("env file did not parse to a map".to_string()));
        };

        Ok(self.env.load_from(map.into_iter().filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            _ => None,
        })))
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn read_dotenv(path: &Path) -> Result<Vec<(String, String)>> {
    dotenvy::from_path_iter(path)
        .map_err(|e| ConfigError::LoadError(e.to_string()))?
        .map(|item| item.map_err(|e| ConfigError::LoadError(e.to_string())))
        .collect()
}

/// Overlay a JSON/TOML document. Top-level keys may be camelCase or snake_case.
fn apply_document(options: ResolverOptions, document: Value) -> Result<ResolverOptions> {
    let Value::Object(overlay) = document else {
        return Err(ConfigError::ParseError(
            "options file must contain a table or object".to_string(),
        ));
    };

    let mut merged = match serde_json::to_value(&options) {
        Ok(Value::Object(map)) => map,
        Ok(_) => serde_json::Map::new(),
        Err(e) => return Err(ConfigError::ParseError(e.to_string())),
    };

    for (key, value) in overlay {
        merged.insert(to_camel_case(&key), value);
    }

    serde_json::from_value(Value::Object(merged))
        .map_err(|e| ConfigError::ParseError(format!("invalid options: {}", e)))
}

/// Overlay flat `name -> string` settings as produced by [`EnvLoader`]
fn apply_settings(
    mut options: ResolverOptions,
    settings: &HashMap<String, String>,
) -> Result<ResolverOptions> {
    for (name, raw) in settings {
        match name.as_str() {
            "namespace" => options.namespace = Some(raw.trim().to_string()),
            "project_env_id" => {
                options.project_env_id = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ConfigError::invalid_setting(name, raw, "an integer"))?,
                );
            }
            "on_no_default" => {
                options.on_no_default = raw
                    .parse::<OnNoDefault>()
                    .map_err(|_| ConfigError::invalid_setting(name, raw, "error, warn or ignore"))?;
            }
            "max_evaluation_depth" => {
                options.max_evaluation_depth = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::invalid_setting(name, raw, "an integer"))?;
            }
            "collect_evaluation_summaries" => {
                options.collect_evaluation_summaries = parse_bool(raw)
                    .ok_or_else(|| ConfigError::invalid_setting(name, raw, "a boolean"))?;
            }
            _ => {}
        }
    }

    Ok(options)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let options = OptionsBuilder::new().build().unwrap();
        assert_eq!(options, ResolverOptions::default());
    }

    #[test]
    fn test_vars_override_base() {
        let options = OptionsBuilder::new()
            .with_base(ResolverOptions::default().with_namespace("base"))
            .with_vars(vec![
                ("FLAGSTONE_NAMESPACE", "billing.api"),
                ("FLAGSTONE_PROJECT_ENV_ID", "12"),
                ("FLAGSTONE_ON_NO_DEFAULT", "ignore"),
                ("FLAGSTONE_MAX_EVALUATION_DEPTH", "4"),
                ("FLAGSTONE_COLLECT_EVALUATION_SUMMARIES", "off"),
                ("UNRELATED", "x"),
            ])
            .build()
            .unwrap();

        assert_eq!(options.namespace.as_deref(), Some("billing.api"));
        assert_eq!(options.project_env_id, Some(12));
        assert_eq!(options.on_no_default, OnNoDefault::Ignore);
        assert_eq!(options.max_evaluation_depth, 4);
        assert!(!options.collect_evaluation_summaries);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let result = OptionsBuilder::new()
            .with_vars(vec![("FLAGSTONE_PROJECT_ENV_ID", "prod")])
            .build();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));

        let result = OptionsBuilder::new()
            .with_vars(vec![("FLAGSTONE_MAX_EVALUATION_DEPTH", "500")])
            .build();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_document_accepts_both_key_styles() {
        let options = apply_document(
            ResolverOptions::default(),
            serde_json::json!({
                "namespace": "a.b",
                "max_evaluation_depth": 7,
                "onNoDefault": "warn"
            }),
        )
        .unwrap();

        assert_eq!(options.namespace.as_deref(), Some("a.b"));
        assert_eq!(options.max_evaluation_depth, 7);
        assert_eq!(options.on_no_default, OnNoDefault::Warn);
        assert!(options.collect_evaluation_summaries);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("project_env_id"), "projectEnvId");
        assert_eq!(to_camel_case("namespace"), "namespace");
        assert_eq!(to_camel_case("globalContext"), "globalContext");
    }
}
