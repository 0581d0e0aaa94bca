//! File reading tool.

use super::traits::{required_str, ExecuteTool, ToolArgs};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Upper bound on returned content.
const MAX_READ_BYTES: usize = 64 * 1024;

/// Reads a text file. Relative paths resolve against the project root.
#[derive(Debug, Clone, Default)]
pub struct ReadFileTool {
    root: Option<PathBuf>,
}

impl ReadFileTool {
    pub fn new(root: Option<&str>) -> Self {
        Self {
            root: root.map(PathBuf::from),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ExecuteTool for ReadFileTool {
    fn name(&self) -> Option<&str> {
        Some("read_file")
    }

    fn description(&self) -> Option<&str> {
        Some("Read a text file. Params: {\"path\": \"<file path>\"}.")
    }

    async fn execute(&self, args: ToolArgs) -> Result<String> {
        let path = self.resolve(required_str(&args, "path")?);
        let mut content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if content.len() > MAX_READ_BYTES {
            let mut cut = MAX_READ_BYTES;
            while !content.is_char_boundary(cut) {
                cut -= 1;
            }
            content.truncate(cut);
            content.push_str("\n[truncated]");
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_relative_path_uses_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let tool = ReadFileTool::new(dir.path().to_str());
        let args = json!({"path": "notes.txt"}).as_object().cloned().unwrap();
        assert_eq!(tool.execute(args).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let tool = ReadFileTool::default();
        let args = json!({"path": "/definitely/not/here.txt"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(tool.execute(args).await.is_err());
    }
}
