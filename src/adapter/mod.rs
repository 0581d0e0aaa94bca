//! Completion adapter: prompt augmentation, generation, tool dispatch.
//!
//! One `complete` call is one provider round trip followed by sequential,
//! in-order execution of the tool directives found in the response.

pub mod augment;
pub mod dispatch;
pub mod extract;
pub mod repair;

pub use augment::augment;
pub use dispatch::{annotation, ProcessedText, ToolDispatcher};
pub use extract::{extract, Directive};
pub use repair::parse_params;

use crate::config::BridgeConfig;
use crate::errors::ConfigError;
use crate::provider::{GeminiClient, GenerateContentResponse, GenerationOptions, ProviderClient};
use crate::tools::{RegisteredTool, ToolRegistry};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Immutable per-adapter settings.
#[derive(Debug, Clone, Default)]
pub struct AdapterSettings {
    /// Log directive and call failures at warn/error instead of debug.
    pub verbose: bool,
    /// Injected into the interpreter tool's arguments.
    pub working_directory: Option<String>,
    /// Deadline for a single tool invocation.
    pub tool_timeout: Option<Duration>,
}

impl AdapterSettings {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            verbose: config.verbose,
            working_directory: config.resolved_project_root(),
            tool_timeout: config.tool_timeout(),
        }
    }
}

/// Text result of a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
    /// Directives executed and substituted.
    pub tool_calls: usize,
    /// Directives left verbatim after failing.
    pub tool_failures: usize,
}

/// Either the processed text, or the provider's response untouched when it
/// carried no text at all.
#[derive(Debug, Clone)]
pub enum Completion {
    Text(CompletionResult),
    Raw(GenerateContentResponse),
}

impl Completion {
    /// Final text, `None` for a raw response.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(result) => Some(&result.text),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Adapts a text-only provider to textual tool calling.
pub struct CompletionAdapter {
    provider: Arc<dyn ProviderClient>,
    tools: ToolRegistry,
    settings: AdapterSettings,
}

impl CompletionAdapter {
    /// Create an adapter around an injected provider client.
    pub fn new<P>(provider: P, tools: ToolRegistry, settings: AdapterSettings) -> Self
    where
        P: ProviderClient + 'static,
    {
        Self {
            provider: Arc::new(provider),
            tools,
            settings,
        }
    }

    /// Create a Gemini-backed adapter from config.
    ///
    /// Fails before any request when the credential is missing or a tool
    /// name is registered twice.
    pub fn from_config(config: &BridgeConfig, tools: Vec<RegisteredTool>) -> Result<Self, ConfigError> {
        let client = GeminiClient::from_config(config)?;
        let tools = ToolRegistry::new(tools)?;
        Ok(Self::new(client, tools, AdapterSettings::from_config(config)))
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// Generate a completion and execute any tool directives it contains.
    ///
    /// Provider failures are returned as-is, never retried.
    pub async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        if self.settings.verbose {
            info!("Gemini processing prompt: {}...", preview(prompt, 100));
        }

        match self.run(prompt, options).await {
            Ok(completion) => Ok(completion),
            Err(e) => {
                if self.settings.verbose {
                    error!("Error in Gemini completion: {:#}", e);
                } else {
                    debug!("Error in Gemini completion: {:#}", e);
                }
                Err(e)
            }
        }
    }

    async fn run(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        let augmented = augment(prompt, &self.tools);
        let response = self.provider.generate_content(&augmented, options).await?;

        let text = response.text();
        if text.is_empty() {
            debug!("Provider returned no text parts");
            return Ok(Completion::Raw(response));
        }

        let processed = ToolDispatcher::new(&self.tools, &self.settings)
            .process(&text)
            .await;

        Ok(Completion::Text(CompletionResult {
            text: processed.text,
            tool_calls: processed.substituted,
            tool_failures: processed.failed,
        }))
    }
}

/// First `max_chars` characters of `s`.
fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
