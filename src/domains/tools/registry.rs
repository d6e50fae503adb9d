//! Tool registry - central registration and dispatch for all tools.
//!
//! The registry is a `name -> (descriptor, handler)` table built once at
//! startup and read-only afterwards. Dispatch validates arguments against the
//! descriptor's schema before any handler logic runs, so handlers can assume
//! structurally sound input.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::Config;

use super::definitions::{
    CompareSchemasTool, FormatSqlTool, FsListDirTool, FsReadFileTool,
};
use super::error::ToolError;

/// Static description of a tool, advertised via `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name within this server.
    pub name: String,

    /// Human-readable description shown to clients.
    pub description: String,

    /// JSON schema for the tool's argument object.
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// A tool's execution entry point.
///
/// Handlers receive the raw argument object plus the server configuration and
/// return a plain JSON-serializable result.
pub type ToolHandler =
    fn(&serde_json::Value, &Config) -> Result<serde_json::Value, ToolError>;

/// One registered tool: its advertised descriptor and its handler.
pub struct ToolRoute {
    pub descriptor: ToolDescriptor,
    pub handler: ToolHandler,
}

/// Generate the input schema for a parameter struct.
pub(crate) fn schema_for<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

/// Tool registry - manages all available tools.
///
/// Routes are kept in a `BTreeMap` so enumeration order is stable and
/// repeated `tools/list` responses serialize identically.
pub struct ToolRegistry {
    routes: BTreeMap<String, ToolRoute>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Create a registry with the built-in tool set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FormatSqlTool::descriptor(), FormatSqlTool::handler);
        registry.register(CompareSchemasTool::descriptor(), CompareSchemasTool::handler);
        registry.register(FsListDirTool::descriptor(), FsListDirTool::handler);
        registry.register(FsReadFileTool::descriptor(), FsReadFileTool::handler);
        registry
    }

    /// Register a tool. Re-registering a name replaces the previous route.
    pub fn register(&mut self, descriptor: ToolDescriptor, handler: ToolHandler) {
        self.routes
            .insert(descriptor.name.clone(), ToolRoute { descriptor, handler });
    }

    /// All registered tool names, in enumeration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.routes.keys().map(|k| k.as_str()).collect()
    }

    /// All tool descriptors, in enumeration order.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.routes.values().map(|r| &r.descriptor).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch a tool call.
    ///
    /// Validates the arguments against the tool's schema first; the handler
    /// only runs once the required shape is confirmed.
    pub fn call(
        &self,
        name: &str,
        arguments: &serde_json::Value,
        config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let Some(route) = self.routes.get(name) else {
            warn!("unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        validate_arguments(&route.descriptor, arguments)?;
        (route.handler)(arguments, config)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Structural argument validation against a descriptor's schema.
///
/// Checks that the arguments form an object and that every `required`
/// property is present with the declared JSON kind. Deeper validation is the
/// handler's own serde parse.
fn validate_arguments(
    descriptor: &ToolDescriptor,
    arguments: &serde_json::Value,
) -> Result<(), ToolError> {
    let Some(args) = arguments.as_object() else {
        return Err(ToolError::invalid_arguments(
            "arguments must be a JSON object",
        ));
    };

    let schema = &descriptor.input_schema;
    let required = schema
        .get("required")
        .and_then(|r| r.as_array())
        .cloned()
        .unwrap_or_default();

    for field in &required {
        let Some(field_name) = field.as_str() else {
            continue;
        };
        let Some(value) = args.get(field_name) else {
            return Err(ToolError::invalid_arguments(format!(
                "missing required argument '{field_name}'"
            )));
        };

        let declared = schema
            .get("properties")
            .and_then(|p| p.get(field_name))
            .and_then(|s| s.get("type"));
        if let Some(declared) = declared {
            if !kind_matches(declared, value) {
                return Err(ToolError::invalid_arguments(format!(
                    "argument '{field_name}' has the wrong kind (expected {declared})"
                )));
            }
        }
    }

    Ok(())
}

/// Whether a JSON value matches a schema `type` declaration (a type name or
/// an array of acceptable type names).
fn kind_matches(declared: &serde_json::Value, value: &serde_json::Value) -> bool {
    match declared {
        serde_json::Value::String(name) => kind_name_matches(name, value),
        serde_json::Value::Array(names) => names
            .iter()
            .filter_map(|n| n.as_str())
            .any(|n| kind_name_matches(n, value)),
        _ => true,
    }
}

fn kind_name_matches(name: &str, value: &serde_json::Value) -> bool {
    match name {
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}
