#![warn(missing_docs)]
//! Deterministic testing surfaces: a scripted geometry adapter and a
//! recording box renderer.

mod adapter;
mod chrome;

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub use adapter::*;
pub use chrome::*;

/// Write a pretty-printed JSON snapshot to disk, for diffing exported
/// markup records across runs.
pub fn write_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
