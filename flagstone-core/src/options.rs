//! Resolver options

use crate::context::Contexts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default bound on nested segment / decryption-key evaluations
pub const DEFAULT_MAX_EVALUATION_DEPTH: usize = 16;

/// What `get` does when nothing matched and no default was given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnNoDefault {
    /// Fail with `NoValueFound`
    #[default]
    Error,
    /// Log a warning and return nothing
    Warn,
    /// Return nothing
    Ignore,
}

impl OnNoDefault {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for OnNoDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnNoDefault {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "raise" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("unknown onNoDefault policy '{}'", other)),
        }
    }
}

/// Settings shared by a resolver and its clones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    /// Operand for hierarchical-match criteria
    pub namespace: Option<String>,
    /// Active project environment; its rows are tried first
    pub project_env_id: Option<i64>,
    pub on_no_default: OnNoDefault,
    /// Default contexts merged under call-local contexts
    pub global_context: Contexts,
    pub max_evaluation_depth: usize,
    pub collect_evaluation_summaries: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            namespace: None,
            project_env_id: None,
            on_no_default: OnNoDefault::default(),
            global_context: Contexts::new(),
            max_evaluation_depth: DEFAULT_MAX_EVALUATION_DEPTH,
            collect_evaluation_summaries: true,
        }
    }
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_project_env_id(mut self, project_env_id: i64) -> Self {
        self.project_env_id = Some(project_env_id);
        self
    }

    pub fn with_on_no_default(mut self, policy: OnNoDefault) -> Self {
        self.on_no_default = policy;
        self
    }

    pub fn with_global_context(mut self, contexts: Contexts) -> Self {
        self.global_context = contexts;
        self
    }

    pub fn with_max_evaluation_depth(mut self, depth: usize) -> Self {
        self.max_evaluation_depth = depth;
        self
    }

    pub fn with_evaluation_summaries(mut self, enabled: bool) -> Self {
        self.collect_evaluation_summaries = enabled;
        self
    }
}
