//! Table schema definitions

use crate::core::ProvisionError;
use serde_json::Value;
use std::path::Path;

/// Load a JSON array of table-definition objects, preserving file order
pub fn load_table_definitions(path: &Path) -> Result<Vec<Value>, ProvisionError> {
    let content = std::fs::read_to_string(path)?;
    parse_table_definitions(&content).map_err(|reason| ProvisionError::Schema {
        path: path.to_path_buf(),
        reason,
    })
}

pub fn parse_table_definitions(content: &str) -> Result<Vec<Value>, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let tables = match value {
        Value::Array(tables) => tables,
        _ => return Err("expected a JSON array of table definitions".to_string()),
    };

    if let Some(index) = tables.iter().position(|t| !t.is_object()) {
        return Err(format!("entry {} is not a JSON object", index));
    }

    Ok(tables)
}

/// `TableName` of a definition, if present
pub fn table_name(definition: &Value) -> Option<&str> {
    definition.get("TableName").and_then(Value::as_str)
}
