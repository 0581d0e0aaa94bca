//! Configuration schema for config.toml.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable that overrides `api_key`.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Generative Language API key.
    pub api_key: String,

    /// Generative Language API base URL.
    pub api_base: String,

    /// Model used for completions.
    pub model: String,

    /// Surface tool and provider failures at warn/error level.
    pub verbose: bool,

    /// Working directory injected into the python tool (empty = none).
    pub project_root: String,

    /// Interpreter binary used by the python tool.
    pub python_bin: String,

    /// Per-tool deadline in seconds (0 = no deadline).
    pub tool_timeout_secs: u64,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-2.5-flash".into(),
            verbose: false,
            project_root: String::new(),
            python_bin: "python3".into(),
            tool_timeout_secs: 0,
            log_level: "info".into(),
        }
    }
}

impl BridgeConfig {
    /// Apply environment overrides on top of file values.
    pub fn with_env_overrides(self) -> Self {
        self.apply_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Replace `api_key` with `value` when it is present and non-blank.
    pub fn apply_api_key_override(mut self, value: Option<String>) -> Self {
        if let Some(key) = value {
            if !key.trim().is_empty() {
                self.api_key = key;
            }
        }
        self
    }

    /// Resolved project root, `None` when unset.
    pub fn resolved_project_root(&self) -> Option<String> {
        let root = self.project_root.trim();
        if root.is_empty() {
            None
        } else {
            Some(shellexpand::tilde(root).into_owned())
        }
    }

    /// Per-tool deadline, `None` when disabled.
    pub fn tool_timeout(&self) -> Option<Duration> {
        (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs))
    }

    /// Whether a usable credential is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
