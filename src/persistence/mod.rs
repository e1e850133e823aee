//! Level file persistence
//!
//! Features:
//! - Versionless JSON level documents (see [`document`])
//! - Atomic writes (tmp → level file)
//! - All-or-nothing import

pub mod document;

pub use document::{ImportedLevel, SerializedTrigger, TimelineDocument, export_json, import_json};

use std::fs;
use std::path::Path;

use crate::error::{Result, TimelineError};

/// Read a level file into memory
pub fn read_level_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| TimelineError::io(path.display().to_string(), e))?;
    log::info!("Loaded level file {} ({} bytes)", path.display(), json.len());
    Ok(json)
}

/// Write an exported level, replacing any previous file only once the new
/// contents are fully on disk
pub fn write_level_file(path: impl AsRef<Path>, json: &str) -> Result<()> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let io_err = |e| TimelineError::io(path.display().to_string(), e);
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    log::info!("Level saved to {}", path.display());
    Ok(())
}
