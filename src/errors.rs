//! Domain error types for gemini-bridge.
//!
//! Configuration and payload failures are typed so callers can match on
//! them. Provider failures are embedded in `anyhow::Error` by the client,
//! callers can still `downcast_ref::<ProviderError>()`.

use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Fatal errors raised while building an adapter, before any request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY not found in config")]
    MissingApiKey,

    #[error("Tool '{0}' is registered more than once")]
    DuplicateTool(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Remedy to show next to the error, when there is an obvious one.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingApiKey => Some(format!(
                "Set api_key in the config file or export {}.",
                crate::config::API_KEY_ENV
            )),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Directive errors
// ---------------------------------------------------------------------------

/// A `PARAMS:` payload that could not be turned into keyword arguments.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Malformed tool parameters: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Tool parameters still malformed after newline repair: {after_repair} (originally: {original})")]
    RepairFailed {
        original: serde_json::Error,
        after_repair: serde_json::Error,
    },
}

/// Failure of a single directive. Never escapes the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Tool '{tool}' timed out after {limit:?}")]
    Timeout { tool: String, limit: Duration },
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Errors from the remote generation service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Generation failed (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse generation response: {0}")]
    Decode(String),
}
