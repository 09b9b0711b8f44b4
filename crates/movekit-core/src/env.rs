//! Raw environment mappings and host source selection.
//!
//! Two hosts can provide variables: the live process environment (build and
//! server runs) and a mapping injected at build time for client contexts.
//! [`EnvironmentSource::resolve`] picks one deterministically.

use std::{collections::BTreeMap, path::Path};

use crate::error::{CoreError, Result};

/// Flat mapping of variable name to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEnv {
    vars: BTreeMap<String, String>,
}

impl RawEnv {
    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Load an injected mapping from a flat TOML table.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Injected environment file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse injected environment: {}", path.display()),
                e,
            )
        })
    }

    /// Parse a flat TOML table of `KEY = value` pairs.
    ///
    /// Strings are taken verbatim; booleans, integers and floats are
    /// stringified. Nested tables and arrays are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let mut env = Self::default();

        for (key, value) in table {
            let raw = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    return Err(CoreError::config(format!(
                        "{key}: expected a scalar value, found {}",
                        other.type_str()
                    )));
                }
            };
            env.insert(key, raw);
        }

        Ok(env)
    }

    /// Raw value of a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Set a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Whether the mapping holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The host contexts a configuration can be resolved from.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSource {
    process: Option<RawEnv>,
    injected: RawEnv,
}

impl EnvironmentSource {
    /// Source backed by the live process environment.
    pub fn from_host() -> Self {
        Self {
            process: Some(RawEnv::from_process()),
            injected: RawEnv::default(),
        }
    }

    /// Source with no process environment, as in a browser bundle.
    pub fn injected_only(injected: RawEnv) -> Self {
        Self {
            process: None,
            injected,
        }
    }

    /// Attach the build-injected mapping used as fallback.
    #[must_use]
    pub fn with_injected(mut self, injected: RawEnv) -> Self {
        self.injected = injected;
        self
    }

    /// Select the active mapping.
    ///
    /// The process environment wins whenever it exists and is non-empty;
    /// otherwise the injected mapping is used.
    pub fn resolve(&self) -> &RawEnv {
        match &self.process {
            Some(process) if !process.is_empty() => process,
            _ => &self.injected,
        }
    }
}
