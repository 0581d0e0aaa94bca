//! Remote text generation.
//!
//! The adapter only sees the [`ProviderClient`] trait; [`GeminiClient`] is
//! the HTTP implementation and is injected at construction time.

pub mod gemini;

pub use gemini::{
    Candidate, Content, GeminiClient, GenerateContentResponse, GenerationOptions, Part,
    PromptFeedback, UsageMetadata,
};

use anyhow::Result;
use async_trait::async_trait;

/// Sends a prompt to a hosted model and returns its native response.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Generate content for a single user prompt.
    async fn generate_content(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerateContentResponse>;
}
