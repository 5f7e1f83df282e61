// Evolution Client: Configuration
// EvolutionConfig, from_env, validate, keywords

use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::groups::CarpoolKeywords;
use crate::atoms::constants::*;
use crate::atoms::error::{EvolutionError, EvolutionResult};

// ── Config Struct ──────────────────────────────────────────────────────

/// Immutable snapshot handed to [`super::EvolutionClient::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Evolution API base URL (default: "http://localhost:8080")
    pub api_url: String,
    /// Instance name on the gateway (default: "carpool")
    pub instance_name: String,
    /// Static key sent in the `apikey` header on every request
    pub api_key: String,
    /// Request timeout applied to every call
    pub timeout_secs: u64,
    /// Subject keywords that mark a group as carpool-related
    pub carpool_include: Vec<String>,
    /// Subject keywords that disqualify a group even when an include matches
    pub carpool_exclude: Vec<String>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            api_url: DEFAULT_API_URL.into(),
            instance_name: DEFAULT_INSTANCE.into(),
            api_key: PLACEHOLDER_API_KEY.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            carpool_include: CARPOOL_INCLUDE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            carpool_exclude: CARPOOL_EXCLUDE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ── Loading ────────────────────────────────────────────────────────────

impl EvolutionConfig {
    /// Read the process environment, after loading a `.env` file if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key → value source. Unset or blank values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(instance) = get(ENV_INSTANCE) {
            config.instance_name = instance;
        }
        if let Some(key) = get(ENV_API_KEY) {
            config.api_key = key;
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => warn!("[evolution] Ignoring invalid {}={:?}, using {}s", ENV_TIMEOUT, raw, DEFAULT_TIMEOUT_SECS),
            }
        }
        if let Some(list) = get(ENV_CARPOOL_INCLUDE).map(|v| split_keywords(&v)).filter(|l| !l.is_empty()) {
            config.carpool_include = list;
        }
        if let Some(list) = get(ENV_CARPOOL_EXCLUDE).map(|v| split_keywords(&v)) {
            config.carpool_exclude = list;
        }
        config
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn uses_placeholder_key(&self) -> bool {
        self.effective_api_key() == PLACEHOLDER_API_KEY
    }

    /// Key actually sent in the `apikey` header: a blank key falls back to
    /// the placeholder.
    pub fn effective_api_key(&self) -> &str {
        match self.api_key.trim() {
            "" => PLACEHOLDER_API_KEY,
            key => key,
        }
    }

    /// Keyword sets for the carpool classifier.
    pub fn keywords(&self) -> CarpoolKeywords {
        CarpoolKeywords::new(&self.carpool_include, &self.carpool_exclude)
    }

    /// Check the parts that would otherwise fail on every request.
    /// An empty instance name is rejected per call, not here.
    pub fn validate(&self) -> EvolutionResult<()> {
        validate_base_url(&self.api_url)?;
        if self.timeout_secs == 0 {
            return Err(EvolutionError::config("timeout must be at least one second"));
        }
        Ok(())
    }
}

pub(crate) fn validate_base_url(raw: &str) -> EvolutionResult<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| EvolutionError::config(format!("invalid gateway URL {:?}: {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(EvolutionError::config(format!("unsupported URL scheme {:?}", other))),
    }
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
