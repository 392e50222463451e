// Environment variable loading

use std::collections::HashMap;
use std::env;

/// Default prefix of Flagstone environment variables
pub const DEFAULT_PREFIX: &str = "FLAGSTONE";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Loader for `FLAGSTONE_*` variables
    pub fn flagstone() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }

    /// Setting name for a variable: prefix stripped, lowercased.
    ///
    /// `None` when the variable does not carry the prefix.
    pub fn setting_name(&self, key: &str) -> Option<String> {
        match self.prefix {
            Some(ref prefix) => {
                let rest = key.strip_prefix(prefix.as_str())?.strip_prefix('_')?;
                Some(rest.to_lowercase())
            }
            None => Some(key.to_lowercase()),
        }
    }

    /// Load all matching process environment variables
    pub fn load(&self) -> HashMap<String, String> {
        self.load_from(env::vars())
    }

    /// Load matching variables from an explicit set
    pub fn load_from<I, K, V>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| {
                self.setting_name(key.as_ref())
                    .map(|name| (name, value.into()))
            })
            .collect()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::flagstone()
    }
}
