pub mod check;
pub mod init;
pub mod renumber;
pub mod show;

pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use renumber::{renumber, RenumberArgs};
pub use show::{show, ShowArgs};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Parse a persisted document or batch
pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Batches carry a `documents` list; single documents carry `roots`
pub(crate) fn is_batch(json: &Value) -> bool {
    json.get("documents").is_some()
}
