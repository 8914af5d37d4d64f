//! JSON rendering for built workbooks.

use crate::engine::Workbook;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a workbook to JSON.
pub fn to_json(workbook: &Workbook, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(workbook),
        JsonFormat::Compact => serde_json::to_string(workbook),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
