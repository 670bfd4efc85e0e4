//! Export of the accumulated change records
//!
//! Deferred write: the whole record set is serialized as one JSON array and
//! appended to the configured file only after the run has fully succeeded.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Append the record set to `path` as a single JSON array
pub fn write_records(path: &Path, records: &[Value]) -> Result<()> {
    let serialized =
        serde_json::to_string(records).context("Failed to serialize change records")?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open export file {}", path.display()))?;

    file.write_all(serialized.as_bytes())
        .with_context(|| format!("Failed to write export file {}", path.display()))?;

    Ok(())
}
