//! Tool registration and lookup.

use super::traits::{ExecuteTool, ToolArgs, ToolFn, ToolHandler, UseTool};
use crate::errors::ConfigError;
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Name that marks a `use` tool as the code interpreter.
pub const INTERPRETER_TOOL_NAME: &str = "python";

/// A tool with its name, description and capability resolved.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    name: String,
    description: String,
    handler: ToolHandler,
    /// Description was supplied rather than derived from the name.
    custom_description: bool,
    /// Set through `mark_interpreter`, independent of the name.
    marked_interpreter: bool,
}

impl RegisteredTool {
    /// Register a tool exposing `use`.
    pub fn from_use<T: UseTool + 'static>(tool: T) -> Self {
        let name = tool
            .name()
            .map(str::to_string)
            .unwrap_or_else(short_type_name::<T>);
        let description = tool.description().map(str::to_string);
        Self::build(name, description, ToolHandler::Use(Arc::new(tool)))
    }

    /// Register a tool exposing `execute`.
    pub fn from_execute<T: ExecuteTool + 'static>(tool: T) -> Self {
        let name = tool
            .name()
            .map(str::to_string)
            .unwrap_or_else(short_type_name::<T>);
        let description = tool.description().map(str::to_string);
        Self::build(name, description, ToolHandler::Execute(Arc::new(tool)))
    }

    /// Register a plain callable under the given name.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(ToolArgs) -> Result<String> + Send + Sync + 'static,
    {
        let handler: Arc<ToolFn> = Arc::new(f);
        Self::build(name.into(), None, ToolHandler::Direct(handler))
    }

    fn build(name: String, description: Option<String>, handler: ToolHandler) -> Self {
        let custom_description = description.is_some();
        let description = description.unwrap_or_else(|| default_description(&name));
        Self {
            name,
            description,
            handler,
            custom_description,
            marked_interpreter: false,
        }
    }

    /// Rename the tool. A derived description follows the new name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        if !self.custom_description {
            self.description = default_description(&self.name);
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self.custom_description = true;
        self
    }

    /// Treat this `use` tool as the code interpreter regardless of its name.
    pub fn mark_interpreter(mut self) -> Self {
        self.marked_interpreter = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn handler(&self) -> &ToolHandler {
        &self.handler
    }

    /// Only `use` tools qualify, by name or by explicit marking.
    pub fn is_interpreter(&self) -> bool {
        matches!(self.handler, ToolHandler::Use(_))
            && (self.marked_interpreter || self.name == INTERPRETER_TOOL_NAME)
    }
}

fn default_description(name: &str) -> String {
    format!("Tool: {}", name)
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Immutable, name-unique set of tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(tools: Vec<RegisteredTool>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.name()) {
                return Err(ConfigError::DuplicateTool(tool.name().to_string()));
            }
        }
        Ok(Self { tools })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact-name lookup.
    pub fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
