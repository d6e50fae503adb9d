//! SQL formatting tool definition.
//!
//! Normalizes whitespace and uppercases SQL keywords. Text inside single
//! quoted string literals is left untouched.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::core::config::Config;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDescriptor, schema_for};

/// Parameters for the SQL formatting tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FormatSqlParams {
    /// The SQL text to format.
    pub code: String,
}

/// Keywords recognized by the formatter, lowercase.
const KEYWORDS: &[&str] = &[
    "select", "from", "where", "and", "or", "not", "insert", "into", "values",
    "update", "set", "delete", "join", "inner", "left", "right", "outer", "on",
    "group", "by", "order", "having", "limit", "offset", "as", "distinct",
    "union", "all", "create", "table", "drop", "alter", "null", "is", "in",
    "like", "between", "case", "when", "then", "else", "end", "exists", "asc",
    "desc",
];

/// SQL formatting tool.
pub struct FormatSqlTool;

impl FormatSqlTool {
    /// Tool name as advertised to clients.
    pub const NAME: &'static str = "format_sql";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Format an SQL statement: collapse whitespace and uppercase keywords. \
         String literals are preserved verbatim.";

    /// Create the descriptor for this tool.
    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: Self::NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            input_schema: schema_for::<FormatSqlParams>(),
        }
    }

    /// Registry entry point.
    pub fn handler(
        arguments: &serde_json::Value,
        _config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let params: FormatSqlParams = serde_json::from_value(arguments.clone())
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
        Self::execute(&params)
    }

    /// Execute the tool logic.
    pub fn execute(params: &FormatSqlParams) -> Result<serde_json::Value, ToolError> {
        if params.code.trim().is_empty() {
            return Err(ToolError::execution_failed("empty SQL input"));
        }

        let formatted = format_statement(&params.code);
        debug!("formatted {} chars of SQL", params.code.len());
        Ok(serde_json::Value::String(formatted))
    }
}

/// Collapse runs of whitespace to single spaces and uppercase keywords,
/// skipping single-quoted literals (with `''` escapes).
fn format_statement(code: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut literal: Option<String> = None;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(mut lit) = literal.take() {
            lit.push(c);
            if c == '\'' {
                // A doubled quote is an escape, not a terminator.
                if let Some(q) = chars.next_if_eq(&'\'') {
                    lit.push(q);
                    literal = Some(lit);
                } else {
                    tokens.push(lit);
                }
            } else {
                literal = Some(lit);
            }
        } else if c == '\'' {
            flush_word(&mut word, &mut tokens);
            literal = Some(String::from('\''));
        } else if c.is_whitespace() {
            flush_word(&mut word, &mut tokens);
        } else {
            word.push(c);
        }
    }

    // An unterminated literal is kept as written.
    if let Some(lit) = literal {
        tokens.push(lit);
    }
    flush_word(&mut word, &mut tokens);

    tokens.join(" ")
}

fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if word.is_empty() {
        return;
    }
    tokens.push(fold_keyword(word));
    word.clear();
}

/// Uppercase a token whose identifier core is a keyword; anything else is
/// passed through unchanged.
fn fold_keyword(token: &str) -> String {
    let core: String = token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if KEYWORDS.contains(&core.to_ascii_lowercase().as_str()) {
        token.to_ascii_uppercase()
    } else {
        token.to_string()
    }
}
