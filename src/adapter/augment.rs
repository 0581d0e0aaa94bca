//! Tool instructions appended to the outbound prompt.

use crate::tools::ToolRegistry;
use tracing::debug;

/// Call syntax the model must emit to invoke a tool.
const CALL_SYNTAX: &str = r#"To use a tool, respond in exactly this format:
USE_TOOL: tool_name
PARAMS: {"parameter": "value"}

If you do not need a tool, respond normally."#;

/// Append tool descriptions and call syntax to `prompt`.
///
/// Returns `prompt` unchanged when no tools are registered.
pub fn augment(prompt: &str, tools: &ToolRegistry) -> String {
    if tools.is_empty() {
        return prompt.to_string();
    }

    let mut out = String::with_capacity(prompt.len() + 256 + tools.len() * 64);
    out.push_str(prompt);
    out.push_str("\n\nYou have access to the following tools:\n");
    for tool in tools.iter() {
        out.push_str(&format!("- {}: {}\n", tool.name(), tool.description()));
    }
    out.push('\n');
    out.push_str(CALL_SYNTAX);

    debug!("Augmented prompt: {} chars, {} tools", out.len(), tools.len());
    out
}
