//! Code interpreter tool.

use super::traits::{required_str, ToolArgs, UseTool};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Snippets that must never run from a model-issued directive.
const FORBIDDEN_PATTERNS: &[&str] = &[
    "rm -rf /",
    "rm -rf ~",
    "shutil.rmtree('/')",
    "shutil.rmtree(\"/\")",
    "mkfs",
    "dd if=",
    "os.system('shutdown",
    "os.system(\"shutdown",
    "os.system('reboot",
    "os.system(\"reboot",
    "subprocess.run(['shutdown'",
    "subprocess.run([\"shutdown\"",
];

/// Check if a code snippet matches a forbidden pattern.
fn is_forbidden(code: &str) -> bool {
    let lower = code.to_lowercase();
    FORBIDDEN_PATTERNS
        .iter()
        .any(|pat| lower.contains(&pat.to_lowercase()))
}

/// Runs a snippet with `<python_bin> -c <code>`.
///
/// Arguments: `code` (required), `working_directory` (optional).
#[derive(Debug, Clone)]
pub struct PythonTool {
    python_bin: String,
}

impl PythonTool {
    pub fn new(python_bin: &str) -> Self {
        Self {
            python_bin: python_bin.to_string(),
        }
    }
}

impl Default for PythonTool {
    fn default() -> Self {
        Self::new("python3")
    }
}

#[async_trait]
impl UseTool for PythonTool {
    fn name(&self) -> Option<&str> {
        Some("python")
    }

    fn description(&self) -> Option<&str> {
        Some("Execute Python code. Params: {\"code\": \"<python source>\"}. Prints stdout and stderr.")
    }

    async fn use_tool(&self, args: ToolArgs) -> Result<String> {
        let code = required_str(&args, "code")?;
        if is_forbidden(code) {
            bail!("Forbidden code blocked: {}", code);
        }

        let mut cmd = Command::new(&self.python_bin);
        cmd.arg("-c").arg(code).kill_on_drop(true);
        if let Some(dir) = args.get("working_directory").and_then(|v| v.as_str()) {
            cmd.current_dir(dir);
        }

        debug!("Running {} snippet ({} bytes)", self.python_bin, code.len());
        let out = cmd
            .output()
            .await
            .with_context(|| format!("Failed to spawn {}", self.python_bin))?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        let stderr = String::from_utf8_lossy(&out.stderr);

        let mut output = String::new();
        if !stdout.is_empty() {
            output.push_str(stdout.trim_end());
        }
        if !stderr.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str("[stderr] ");
            output.push_str(stderr.trim_end());
        }
        if output.is_empty() {
            output = format!("(exit code: {})", out.status.code().unwrap_or(-1));
        }

        Ok(output)
    }
}
