use super::Syntax;
use anyhow::{Context, Result};

/// JSON objects, two-space indent, `"key": value`
pub struct Json;

impl Syntax for Json {
    fn quote(&self, s: &str) -> Result<String> {
        serde_json::to_string(s).context("Failed to encode JSON string")
    }

    fn assign(&self) -> &str {
        ": "
    }

    fn entry_end(&self, has_next: bool) -> &str {
        if has_next {
            ","
        } else {
            ""
        }
    }

    fn compact_empty(&self) -> bool {
        true
    }
}
