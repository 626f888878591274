//! Reading design interchange files.

use crate::error::EngineError;
use std::path::Path;
use strata_common::Interner;
use strata_ir::{Design, DesignFile};

/// Reads a JSON design file.
pub fn load_design(path: &Path) -> Result<(Interner, Design), EngineError> {
    let content = std::fs::read_to_string(path)?;
    load_design_from_str(&content)
}

/// Parses a JSON design file from a string.
pub fn load_design_from_str(content: &str) -> Result<(Interner, Design), EngineError> {
    let file: DesignFile =
        serde_json::from_str(content).map_err(|e| EngineError::Parse(e.to_string()))?;
    Ok(file.into_parts()?)
}
