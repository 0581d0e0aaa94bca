pub mod calculator;
pub mod files;
pub mod python;
pub mod registry;
pub mod traits;

pub use calculator::calculator_tool;
pub use files::ReadFileTool;
pub use python::PythonTool;
pub use registry::{RegisteredTool, ToolRegistry, INTERPRETER_TOOL_NAME};
pub use traits::{ExecuteTool, ToolArgs, ToolFn, ToolHandler, UseTool};

use crate::config::BridgeConfig;

/// Build the builtin tool set: one tool per invocation capability.
pub fn builtin_tools(config: &BridgeConfig) -> Vec<RegisteredTool> {
    let root = config.resolved_project_root();
    vec![
        RegisteredTool::from_use(PythonTool::new(&config.python_bin)),
        calculator_tool(),
        RegisteredTool::from_execute(ReadFileTool::new(root.as_deref())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tools_register_cleanly() {
        let registry = ToolRegistry::new(builtin_tools(&BridgeConfig::default())).unwrap();
        assert_eq!(registry.len(), 3);

        let python = registry.find(INTERPRETER_TOOL_NAME).unwrap();
        assert!(python.is_interpreter());
        assert_eq!(registry.find("calculator").unwrap().handler().kind(), "callable");
        assert_eq!(registry.find("read_file").unwrap().handler().kind(), "execute");
    }
}
