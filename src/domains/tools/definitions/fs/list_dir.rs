//! Directory listing tool definition.

use std::fs;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::Config;
use crate::core::security::resolve_path;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDescriptor, schema_for};

/// Parameters for the directory listing tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FsListDirParams {
    /// Path to the directory to list.
    pub path: String,

    /// Include hidden entries (names starting with '.').
    #[serde(default)]
    pub include_hidden: bool,
}

/// One directory entry in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Directory listing tool.
pub struct FsListDirTool;

impl FsListDirTool {
    /// Tool name as advertised to clients.
    pub const NAME: &'static str = "fs_list_dir";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "List the entries of a directory as structured JSON (name, kind, size).";

    /// Create the descriptor for this tool.
    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: Self::NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            input_schema: schema_for::<FsListDirParams>(),
        }
    }

    /// Registry entry point.
    pub fn handler(
        arguments: &serde_json::Value,
        config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let params: FsListDirParams = serde_json::from_value(arguments.clone())
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
        Self::execute(&params, config)
    }

    /// Execute the tool logic.
    pub fn execute(
        params: &FsListDirParams,
        config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let path = resolve_path(&params.path, &config.security)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;

        if !path.is_dir() {
            return Err(ToolError::execution_failed(format!(
                "not a directory: {}",
                params.path
            )));
        }

        let read = fs::read_dir(&path)
            .map_err(|e| ToolError::execution_failed(format!("cannot read directory: {e}")))?;

        let mut entries: Vec<DirEntry> = Vec::new();
        for entry in read {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("skipping unreadable entry in {}: {}", params.path, e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !params.include_hidden && name.starts_with('.') {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!("no metadata for {}: {}", name, e);
                    continue;
                }
            };

            let (kind, size) = if metadata.is_dir() {
                ("dir", None)
            } else if metadata.is_symlink() {
                ("symlink", None)
            } else {
                ("file", Some(metadata.len()))
            };

            entries.push(DirEntry { name, kind, size });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let total = entries.len();

        Ok(serde_json::json!({
            "path": params.path,
            "entries": entries,
            "total": total,
        }))
    }
}
