//! Schema comparison tool definition.
//!
//! Diffs two database schema documents of the shape
//! `{table: {column: type}}` and reports what changed between them.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::Config;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDescriptor, schema_for};

/// A schema document: table name to column name to column type.
type SchemaDoc = BTreeMap<String, BTreeMap<String, String>>;

/// Parameters for the schema comparison tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompareSchemasParams {
    /// The baseline schema.
    pub source: SchemaDoc,

    /// The schema to compare against the baseline.
    pub target: SchemaDoc,
}

/// One column whose type differs between the two schemas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTypeChange {
    pub column: String,
    pub from: String,
    pub to: String,
}

/// Per-table column differences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDiff {
    pub table: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retyped_columns: Vec<ColumnTypeChange>,
}

/// The full diff between two schema documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDiff {
    pub identical: bool,
    pub added_tables: Vec<String>,
    pub removed_tables: Vec<String>,
    pub changed_tables: Vec<TableDiff>,
}

/// Schema comparison tool.
pub struct CompareSchemasTool;

impl CompareSchemasTool {
    /// Tool name as advertised to clients.
    pub const NAME: &'static str = "compare_schemas";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Compare two database schema documents ({table: {column: type}}) and \
         report added/removed tables and added/removed/retyped columns.";

    /// Create the descriptor for this tool.
    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: Self::NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            input_schema: schema_for::<CompareSchemasParams>(),
        }
    }

    /// Registry entry point.
    pub fn handler(
        arguments: &serde_json::Value,
        _config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let params: CompareSchemasParams = serde_json::from_value(arguments.clone())
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
        Self::execute(&params)
    }

    /// Execute the tool logic.
    pub fn execute(params: &CompareSchemasParams) -> Result<serde_json::Value, ToolError> {
        let diff = diff_schemas(&params.source, &params.target);
        debug!(
            added = diff.added_tables.len(),
            removed = diff.removed_tables.len(),
            changed = diff.changed_tables.len(),
            "schema comparison complete"
        );
        serde_json::to_value(&diff).map_err(|e| ToolError::internal(e.to_string()))
    }
}

fn diff_schemas(source: &SchemaDoc, target: &SchemaDoc) -> SchemaDiff {
    let added_tables: Vec<String> = target
        .keys()
        .filter(|t| !source.contains_key(*t))
        .cloned()
        .collect();

    let removed_tables: Vec<String> = source
        .keys()
        .filter(|t| !target.contains_key(*t))
        .cloned()
        .collect();

    let mut changed_tables = Vec::new();
    for (table, source_cols) in source {
        let Some(target_cols) = target.get(table) else {
            continue;
        };

        let diff = diff_columns(table, source_cols, target_cols);
        if !diff.added_columns.is_empty()
            || !diff.removed_columns.is_empty()
            || !diff.retyped_columns.is_empty()
        {
            changed_tables.push(diff);
        }
    }

    let identical =
        added_tables.is_empty() && removed_tables.is_empty() && changed_tables.is_empty();

    SchemaDiff {
        identical,
        added_tables,
        removed_tables,
        changed_tables,
    }
}

fn diff_columns(
    table: &str,
    source: &BTreeMap<String, String>,
    target: &BTreeMap<String, String>,
) -> TableDiff {
    let added_columns: Vec<String> = target
        .keys()
        .filter(|c| !source.contains_key(*c))
        .cloned()
        .collect();

    let removed_columns: Vec<String> = source
        .keys()
        .filter(|c| !target.contains_key(*c))
        .cloned()
        .collect();

    let retyped_columns: Vec<ColumnTypeChange> = source
        .iter()
        .filter_map(|(column, from)| {
            target.get(column).and_then(|to| {
                // Type names compare case-insensitively: varchar == VARCHAR.
                if from.eq_ignore_ascii_case(to) {
                    None
                } else {
                    Some(ColumnTypeChange {
                        column: column.clone(),
                        from: from.clone(),
                        to: to.clone(),
                    })
                }
            })
        })
        .collect();

    TableDiff {
        table: table.to_string(),
        added_columns,
        removed_columns,
        retyped_columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tables: &[(&str, &[(&str, &str)])]) -> SchemaDoc {
        tables
            .iter()
            .map(|(table, cols)| {
                let cols = cols
                    .iter()
                    .map(|(c, t)| (c.to_string(), t.to_string()))
                    .collect();
                (table.to_string(), cols)
            })
            .collect()
    }

    #[test]
    fn test_identical_schemas() {
        let s = doc(&[("users", &[("id", "int"), ("name", "varchar")])]);
        let diff = diff_schemas(&s, &s.clone());
        assert!(diff.identical);
        assert!(diff.added_tables.is_empty());
        assert!(diff.changed_tables.is_empty());
    }

    #[test]
    fn test_added_and_removed_tables() {
        let source = doc(&[("users", &[("id", "int")])]);
        let target = doc(&[("orders", &[("id", "int")])]);
        let diff = diff_schemas(&source, &target);
        assert!(!diff.identical);
        assert_eq!(diff.added_tables, vec!["orders"]);
        assert_eq!(diff.removed_tables, vec!["users"]);
    }

    #[test]
    fn test_column_changes() {
        let source = doc(&[("users", &[("id", "int"), ("name", "varchar"), ("age", "int")])]);
        let target = doc(&[(
            "users",
            &[("id", "bigint"), ("name", "varchar"), ("email", "varchar")],
        )]);
        let diff = diff_schemas(&source, &target);

        assert_eq!(diff.changed_tables.len(), 1);
        let table = &diff.changed_tables[0];
        assert_eq!(table.table, "users");
        assert_eq!(table.added_columns, vec!["email"]);
        assert_eq!(table.removed_columns, vec!["age"]);
        assert_eq!(
            table.retyped_columns,
            vec![ColumnTypeChange {
                column: "id".to_string(),
                from: "int".to_string(),
                to: "bigint".to_string(),
            }]
        );
    }

    #[test]
    fn test_type_comparison_is_case_insensitive() {
        let source = doc(&[("t", &[("c", "VARCHAR")])]);
        let target = doc(&[("t", &[("c", "varchar")])]);
        assert!(diff_schemas(&source, &target).identical);
    }

    #[test]
    fn test_handler_round_trip() {
        let args = serde_json::json!({
            "source": {"users": {"id": "int"}},
            "target": {"users": {"id": "int"}, "orders": {"id": "int"}}
        });
        let result = CompareSchemasTool::handler(&args, &Config::default()).unwrap();
        assert_eq!(result["identical"], serde_json::json!(false));
        assert_eq!(result["added_tables"], serde_json::json!(["orders"]));
    }

    #[test]
    fn test_handler_rejects_malformed_schema() {
        // Column types must be strings.
        let args = serde_json::json!({
            "source": {"users": {"id": 42}},
            "target": {}
        });
        let err = CompareSchemasTool::handler(&args, &Config::default()).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
