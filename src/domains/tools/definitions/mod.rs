//! Individual tool implementations, one file per tool.
//!
//! Each tool defines its parameter struct, a `descriptor()` for `tools/list`
//! and a `handler()` registered with the [`ToolRegistry`](super::ToolRegistry).

mod compare_schemas;
mod format_sql;
mod fs;

pub use compare_schemas::CompareSchemasTool;
pub use format_sql::FormatSqlTool;
pub use fs::{FsListDirTool, FsReadFileTool};
