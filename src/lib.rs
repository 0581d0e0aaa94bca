//! gemini-bridge: Gemini completions with textual tool calling.
//!
//! The model is told how to request a tool in plain text; directives found
//! in its answer are executed and replaced by their results.

pub mod adapter;
pub mod config;
pub mod errors;
pub mod provider;
pub mod tools;

pub use adapter::{AdapterSettings, Completion, CompletionAdapter, CompletionResult};
pub use provider::{GeminiClient, GenerateContentResponse, GenerationOptions, ProviderClient};
pub use tools::{RegisteredTool, ToolRegistry};
