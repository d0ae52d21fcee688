//! The closed set of operations the model may ask for.
//!
//! Each declared function maps to exactly one [`ToolRequest`] variant. Names
//! outside the set and argument payloads that do not decode are surfaced as
//! [`ToolCallError`] values instead of being executed.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::interfaces::providers::ToolCall;

pub const QUERY_TABLE_COUNT: &str = "query_table_count";
pub const QUERY_COUNT_BY_PROVINCE: &str = "query_count_by_province";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    TableCount { table_name: Option<String> },
    CountByProvince,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("malformed arguments for '{name}': {reason}")]
    MalformedArguments { name: String, reason: String },
}

#[derive(Deserialize)]
struct TableCountArgs {
    #[serde(default)]
    table_name: Option<String>,
}

impl ToolRequest {
    pub fn from_call(call: &ToolCall) -> Result<Self, ToolCallError> {
        match call.name.as_str() {
            QUERY_TABLE_COUNT => {
                let args: TableCountArgs = decode_arguments(&call.name, &call.arguments)?;
                Ok(Self::TableCount {
                    table_name: args.table_name,
                })
            }
            QUERY_COUNT_BY_PROVINCE => {
                // Extra keys are tolerated; anything that is not an object is not.
                decode_arguments::<serde_json::Map<String, Value>>(&call.name, &call.arguments)?;
                Ok(Self::CountByProvince)
            }
            other => Err(ToolCallError::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TableCount { .. } => QUERY_TABLE_COUNT,
            Self::CountByProvince => QUERY_COUNT_BY_PROVINCE,
        }
    }
}

fn decode_arguments<T: for<'de> Deserialize<'de>>(
    name: &str,
    arguments: &str,
) -> Result<T, ToolCallError> {
    let trimmed = arguments.trim();
    let text = if trimmed.is_empty() { "{}" } else { trimmed };
    serde_json::from_str(text).map_err(|e| ToolCallError::MalformedArguments {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Function declarations sent with every chat request.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": QUERY_TABLE_COUNT,
                "description": "Query the count of rows in a specified table",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "table_name": {
                            "type": "string",
                            "description": "The name of the table to count rows from"
                        }
                    },
                    "required": []
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": QUERY_COUNT_BY_PROVINCE,
                "description": "Query the count of rows per province in the inventory table",
                "parameters": {
                    "type": "object",
                    "properties": {},
                    "required": []
                }
            }
        }),
    ]
}
