use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::trace::GenerationPolicy;

pub(crate) static DEFAULTS: &str = include_str!("../assets/defaults.jsonc");

pub const CAPACITY_ENV: &str = "AGENT_CHAIN_DEBUG_CAPACITY";
pub const GENERATION_POLICY_ENV: &str = "AGENT_CHAIN_DEBUG_GENERATION_POLICY";

/// Settings for the debug handlers.
///
/// Loaded from a JSONC file whose keys override the built-in defaults, then
/// from `AGENT_CHAIN_DEBUG_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugConfig {
    /// Maximum number of entries kept in memory. `None` or `0` keeps everything.
    pub capacity: Option<usize>,
    pub generation_policy: GenerationPolicy,
    /// Mirror each recorded entry as a tracing debug event.
    pub log_entries: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            generation_policy: GenerationPolicy::First,
            log_entries: false,
        }
    }
}

impl DebugConfig {
    /// Parse a JSONC document and merge it over the defaults.
    pub fn from_jsonc(source: &str) -> Result<Self> {
        let customizations: Value = serde_json_lenient::from_str(source)?;
        let mut settings: Value = serde_json_lenient::from_str(DEFAULTS)?;
        merge_non_null_json_value(customizations, &mut settings);
        Ok(serde_json::from_value(settings)?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no debug config file, using defaults");
            return Self::from_jsonc("{}");
        }
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_jsonc(&source)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(raw) = lookup(CAPACITY_ENV) {
            let raw = raw.trim();
            self.capacity = if raw.is_empty() {
                None
            } else {
                Some(
                    raw.parse::<usize>()
                        .map_err(|_| Error::invalid_env(CAPACITY_ENV, raw))?,
                )
            };
        }
        if let Some(raw) = lookup(GENERATION_POLICY_ENV) {
            self.generation_policy = raw
                .parse()
                .map_err(|_| Error::invalid_env(GENERATION_POLICY_ENV, raw.as_str()))?;
        }
        Ok(self)
    }

    /// Effective buffer bound.
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity.and_then(NonZeroUsize::new)
    }
}

/// Recursively overlay the non-null values of `source` onto `target`.
fn merge_non_null_json_value(source: Value, target: &mut Value) {
    match (source, target) {
        (Value::Object(source), Value::Object(target)) => {
            for (key, value) in source {
                if value.is_null() {
                    continue;
                }
                match target.get_mut(&key) {
                    Some(existing) => merge_non_null_json_value(value, existing),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (source, target) if !source.is_null() => *target = source,
        _ => {}
    }
}
