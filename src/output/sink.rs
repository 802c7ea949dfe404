//! Writes a rendered payload to stdout or a file

use super::OutputFormat;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Print `payload` to stdout, or replace the file at `path` with it.
///
/// Missing parent directories are created. When writing a file, a one-line
/// confirmation naming it is printed to stdout instead of the payload.
pub fn write_output(path: Option<&Path>, payload: &str, format: OutputFormat) -> Result<()> {
    let Some(path) = path else {
        println!("{}", payload);
        return Ok(());
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    std::fs::write(path, payload)
        .with_context(|| format!("Failed to write output to {}", path.display()))?;
    debug!("Wrote {} bytes to {}", payload.len(), path.display());

    println!("{} output written to {}", format, path.display());
    Ok(())
}
