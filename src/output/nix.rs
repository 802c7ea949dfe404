use super::Syntax;
use anyhow::Result;

/// Nix attribute set, optionally wrapped as a `{pkgs, ...}:` function
pub struct Nix {
    pub bare: bool,
}

impl Syntax for Nix {
    fn prelude(&self) -> &str {
        if self.bare {
            ""
        } else {
            "{pkgs, ...}: "
        }
    }

    fn quote(&self, s: &str) -> Result<String> {
        Ok(format!("\"{}\"", escape_nix_string(s)))
    }

    fn assign(&self) -> &str {
        " = "
    }

    fn entry_end(&self, _has_next: bool) -> &str {
        ";"
    }

    fn compact_empty(&self) -> bool {
        false
    }
}

/// Escape a string for a double-quoted Nix literal.
///
/// Backslash is replaced first so the backslashes added for `"` and `$` are
/// not escaped a second time.
pub fn escape_nix_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}
