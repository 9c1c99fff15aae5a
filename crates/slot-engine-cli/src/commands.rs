pub mod analyze;
pub mod defaults;

use anyhow::Result;
use serde::Serialize;

/// Render a value as pretty or single-line JSON.
pub fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(out)
}
