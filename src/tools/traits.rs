//! Tool capability traits.
//!
//! A tool is invocable in exactly one of three ways: through `use`, through
//! `execute`, or as a plain callable. The capability is fixed when the tool
//! is registered, see [`ToolHandler`].

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Keyword arguments decoded from a `PARAMS:` object literal.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// Signature of a directly callable tool.
pub type ToolFn = dyn Fn(ToolArgs) -> Result<String> + Send + Sync;

/// Tool invoked through its `use` capability.
#[async_trait]
pub trait UseTool: Send + Sync {
    /// Declared name. Falls back to the implementing type's name.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Declared description. Falls back to `Tool: <name>`.
    fn description(&self) -> Option<&str> {
        None
    }

    async fn use_tool(&self, args: ToolArgs) -> Result<String>;
}

/// Tool invoked through its `execute` capability.
#[async_trait]
pub trait ExecuteTool: Send + Sync {
    fn name(&self) -> Option<&str> {
        None
    }

    fn description(&self) -> Option<&str> {
        None
    }

    async fn execute(&self, args: ToolArgs) -> Result<String>;
}

/// The single invocation strategy of a registered tool.
#[derive(Clone)]
pub enum ToolHandler {
    Use(Arc<dyn UseTool>),
    Execute(Arc<dyn ExecuteTool>),
    Direct(Arc<ToolFn>),
}

impl ToolHandler {
    /// Invoke the tool with the given keyword arguments.
    pub async fn invoke(&self, args: ToolArgs) -> Result<String> {
        match self {
            Self::Use(tool) => tool.use_tool(args).await,
            Self::Execute(tool) => tool.execute(args).await,
            Self::Direct(f) => f(args),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Use(_) => "use",
            Self::Execute(_) => "execute",
            Self::Direct(_) => "callable",
        }
    }
}

impl std::fmt::Debug for ToolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ToolHandler::{}", self.kind())
    }
}

/// Read a required string argument.
pub fn required_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", key))
}
