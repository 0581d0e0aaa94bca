//! Executing directives and splicing their results into the response.

use super::extract::{extract, Directive};
use super::repair::parse_params;
use super::AdapterSettings;
use crate::errors::DispatchError;
use crate::tools::{RegisteredTool, ToolArgs, ToolRegistry};
use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Response text after tool execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedText {
    pub text: String,
    /// Directives replaced by a result annotation.
    pub substituted: usize,
    /// Directives left verbatim because they failed.
    pub failed: usize,
}

/// Inline annotation that replaces an executed directive.
pub fn annotation(tool: &str, result: &str) -> String {
    format!("[Tool {} executed: {}]", tool, result)
}

/// Resolves directives against the tool registry and runs them.
pub struct ToolDispatcher<'a> {
    tools: &'a ToolRegistry,
    settings: &'a AdapterSettings,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(tools: &'a ToolRegistry, settings: &'a AdapterSettings) -> Self {
        Self { tools, settings }
    }

    /// Run every directive in `text` in order and substitute results by span.
    ///
    /// A failing directive is left untouched and never stops the others.
    pub async fn process(&self, text: &str) -> ProcessedText {
        let directives = extract(text);
        if directives.is_empty() {
            return ProcessedText {
                text: text.to_string(),
                substituted: 0,
                failed: 0,
            };
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut substituted = 0;
        let mut failed = 0;

        for directive in &directives {
            match self.run(directive).await {
                Ok(result) => {
                    out.push_str(&text[cursor..directive.span.start]);
                    out.push_str(&annotation(&directive.tool, &result));
                    cursor = directive.span.end;
                    substituted += 1;
                }
                Err(e) => {
                    if self.settings.verbose {
                        warn!("Error executing tool {}: {}", directive.tool, e);
                    } else {
                        debug!("Error executing tool {}: {}", directive.tool, e);
                    }
                    failed += 1;
                }
            }
        }
        out.push_str(&text[cursor..]);

        ProcessedText {
            text: out,
            substituted,
            failed,
        }
    }

    async fn run(&self, directive: &Directive) -> Result<String, DispatchError> {
        if self.settings.verbose {
            info!("Tool: {}({})", directive.tool, directive.params);
        }
        self.dispatch(&directive.tool, &directive.params).await
    }

    /// Decode the payload, resolve the tool and invoke it.
    ///
    /// An unknown tool yields a "not found" result, not an error.
    pub async fn dispatch(&self, tool_name: &str, raw_params: &str) -> Result<String, DispatchError> {
        let args = parse_params(raw_params)?;

        let Some(tool) = self.tools.find(tool_name) else {
            return Ok(format!("Tool {} not found or not executable", tool_name));
        };

        let args = match self.interpreter_args(tool, args) {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };

        let invocation = tool.handler().invoke(args);
        let result = match self.settings.tool_timeout {
            Some(limit) => tokio::time::timeout(limit, invocation)
                .await
                .map_err(|_| DispatchError::Timeout {
                    tool: tool_name.to_string(),
                    limit,
                })?,
            None => invocation.await,
        };

        result.map_err(|source| DispatchError::Tool {
            tool: tool_name.to_string(),
            source,
        })
    }

    /// The interpreter receives only `code` plus the configured working
    /// directory. A missing or empty `code` short-circuits to an error
    /// message; any other value is passed through unchanged.
    fn interpreter_args(&self, tool: &RegisteredTool, mut args: ToolArgs) -> Result<ToolArgs, String> {
        if !tool.is_interpreter() {
            return Ok(args);
        }

        let code = match args.remove("code") {
            Some(code) if is_truthy(&code) => code,
            _ => {
                return Err(format!(
                    "Error: code parameter not found for {} tool.",
                    tool.name()
                ))
            }
        };

        let mut tool_args = ToolArgs::new();
        tool_args.insert("code".into(), code);
        if let Some(dir) = &self.settings.working_directory {
            tool_args.insert("working_directory".into(), Value::String(dir.clone()));
        }
        Ok(tool_args)
    }
}

/// `null`, `false`, zero and empty strings, arrays or objects are empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ExecuteTool, UseTool};
    use async_trait::async_trait;
    use std::time::Duration;

    fn echo_tool(name: &str) -> RegisteredTool {
        RegisteredTool::from_fn(name, |args| Ok(Value::Object(args).to_string()))
    }

    /// Interpreter stand-in that reports the arguments it received.
    struct FakeInterpreter;

    #[async_trait]
    impl UseTool for FakeInterpreter {
        fn name(&self) -> Option<&str> {
            Some("python")
        }

        async fn use_tool(&self, args: ToolArgs) -> Result<String> {
            Ok(Value::Object(args).to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl ExecuteTool for Failing {
        fn name(&self) -> Option<&str> {
            Some("broken")
        }

        async fn execute(&self, _args: ToolArgs) -> Result<String> {
            anyhow::bail!("boom")
        }
    }

    struct Slow;

    #[async_trait]
    impl ExecuteTool for Slow {
        fn name(&self) -> Option<&str> {
            Some("slow")
        }

        async fn execute(&self, _args: ToolArgs) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("late".into())
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new(vec![
            echo_tool("echo"),
            RegisteredTool::from_use(FakeInterpreter),
            RegisteredTool::from_execute(Failing),
            RegisteredTool::from_execute(Slow),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_text_without_directives_is_unchanged() {
        let tools = registry();
        let settings = AdapterSettings::default();
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let text = "No tools here.\nPARAMS: {\"x\": 1}\n";
        let out = dispatcher.process(text).await;
        assert_eq!(out.text, text);
        assert_eq!((out.substituted, out.failed), (0, 0));
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let tools = registry();
        let settings = AdapterSettings::default();
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let out = dispatcher
            .process("Before\nUSE_TOOL: echo\nPARAMS: {\"x\": 1}\nAfter")
            .await;
        assert_eq!(out.text, "Before\n[Tool echo executed: {\"x\":1}]\nAfter");
        assert_eq!(out.substituted, 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_substituted() {
        let tools = registry();
        let settings = AdapterSettings::default();
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let out = dispatcher.process("USE_TOOL: fooqux\nPARAMS: {}").await;
        assert_eq!(
            out.text,
            "[Tool fooqux executed: Tool fooqux not found or not executable]"
        );
    }

    #[tokio::test]
    async fn test_identical_directives_each_get_their_own_result() {
        let tools = ToolRegistry::new(vec![{
            let counter = std::sync::atomic::AtomicUsize::new(0);
            RegisteredTool::from_fn("tick", move |_| {
                let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(n.to_string())
            })
        }])
        .unwrap();
        let settings = AdapterSettings::default();
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let call = "USE_TOOL: tick\nPARAMS: {}";
        let out = dispatcher.process(&format!("{call}\n{call}")).await;
        assert_eq!(
            out.text,
            "[Tool tick executed: 0]\n[Tool tick executed: 1]"
        );
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let tools = registry();
        let settings = AdapterSettings {
            verbose: true,
            ..Default::default()
        };
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let broken = "USE_TOOL: broken\nPARAMS: {}";
        let malformed = "USE_TOOL: echo\nPARAMS: {'x': 1}";
        let text = format!("{broken}\nUSE_TOOL: echo\nPARAMS: {{\"y\": 2}}\n{malformed}");

        let out = dispatcher.process(&text).await;
        assert_eq!(
            out.text,
            format!("{broken}\n[Tool echo executed: {{\"y\":2}}]\n{malformed}")
        );
        assert_eq!((out.substituted, out.failed), (1, 2));
    }

    #[tokio::test]
    async fn test_interpreter_gets_code_and_working_directory_only() {
        let tools = registry();
        let settings = AdapterSettings {
            working_directory: Some("/srv/project".into()),
            ..Default::default()
        };
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let result = dispatcher
            .dispatch(
                "python",
                "{\"code\": \"print(1)\", \"working_directory\": \"/etc\", \"extra\": true}",
            )
            .await
            .unwrap();
        let received: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(
            received,
            serde_json::json!({"code": "print(1)", "working_directory": "/srv/project"})
        );
    }

    #[tokio::test]
    async fn test_interpreter_without_code_short_circuits() {
        let tools = registry();
        let settings = AdapterSettings::default();
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let result = dispatcher.dispatch("python", "{\"script\": \"x\"}").await.unwrap();
        assert_eq!(result, "Error: code parameter not found for python tool.");
    }

    #[tokio::test]
    async fn test_multiline_code_reaches_tool_with_real_newline() {
        let tools = registry();
        let settings = AdapterSettings::default();
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let result = dispatcher
            .dispatch("python", "{\"code\": \"x = 1\nprint(x)\"}")
            .await
            .unwrap();
        let received: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(received["code"], "x = 1\nprint(x)");
    }

    #[tokio::test]
    async fn test_timeout_is_directive_failure() {
        let tools = registry();
        let settings = AdapterSettings {
            tool_timeout: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        match dispatcher.dispatch("slow", "{}").await {
            Err(err @ DispatchError::Timeout { .. }) => {
                assert_eq!(err.to_string(), "Tool 'slow' timed out after 20ms");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    /// `use` tool with a neutral name that reports its arguments.
    struct ArgsReporter;

    #[async_trait]
    impl UseTool for ArgsReporter {
        async fn use_tool(&self, args: ToolArgs) -> Result<String> {
            Ok(Value::Object(args).to_string())
        }
    }

    #[tokio::test]
    async fn test_renamed_interpreter_ignores_model_working_directory() {
        let tools =
            ToolRegistry::new(vec![RegisteredTool::from_use(ArgsReporter).with_name("python")])
                .unwrap();
        let settings = AdapterSettings {
            working_directory: Some("/work".into()),
            ..Default::default()
        };
        let dispatcher = ToolDispatcher::new(&tools, &settings);
        let result = dispatcher
            .dispatch("python", "{\"code\": \"x\", \"working_directory\": \"/etc\"}")
            .await
            .unwrap();
        let received: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(
            received,
            serde_json::json!({"code": "x", "working_directory": "/work"})
        );
    }

    #[tokio::test]
    async fn test_interpreter_code_truthiness() {
        let tools = registry();
        let settings = AdapterSettings::default();
        let dispatcher = ToolDispatcher::new(&tools, &settings);

        let result = dispatcher.dispatch("python", "{\"code\": 42}").await.unwrap();
        assert_eq!(result, r#"{"code":42}"#);

        for empty in ["\"\"", "0", "false", "null", "[]"] {
            let raw = format!("{{\"code\": {}}}", empty);
            let result = dispatcher.dispatch("python", &raw).await.unwrap();
            assert_eq!(result, "Error: code parameter not found for python tool.", "code = {}", empty);
        }
    }
}
