//! Snapshot of the process environment.
//!
//! Read once at startup and passed down explicitly, so nothing below the CLI
//! layer touches `std::env` directly.

use std::collections::HashMap;

/// Environment variable overriding the post-push wait
pub const WAIT_SECONDS_VAR: &str = "GAMESSTORE_WAIT_SECONDS";

/// Upper bound for the wait override, in seconds
const MAX_WAIT_SECONDS: u64 = 600;

/// Token variables checked for workflow dispatch, in priority order
const TOKEN_VARS: [&str; 3] = ["GH_TOKEN", "GITHUB_TOKEN", "GITHUB_PAT"];

/// Immutable environment snapshot
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable, treating empty values as unset
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// First API token found among the supported variables
    pub fn github_token(&self) -> Option<String> {
        TOKEN_VARS.iter().find_map(|key| self.get(key))
    }

    /// Wait override in seconds, clamped to the maximum
    pub fn wait_seconds_override(&self) -> Option<u64> {
        self.get(WAIT_SECONDS_VAR)
            .and_then(|s| s.parse::<u64>().ok())
            .map(|v| v.min(MAX_WAIT_SECONDS))
    }
}
