// src/exec/clean.rs

use std::path::Path;

use anyhow::{bail, Result};
use tracing::debug;

use crate::fs::FileSystem;

/// Make `dir` an empty directory: create it if missing, otherwise delete
/// everything inside it.
pub fn create_or_clean(fs: &dyn FileSystem, dir: &Path) -> Result<()> {
    if fs.is_dir(dir) {
        for entry in fs.read_dir(dir)? {
            if fs.is_dir(&entry) {
                fs.remove_dir_all(&entry)?;
            } else {
                fs.remove_file(&entry)?;
            }
        }
        debug!(dir = ?dir, "cleaned directory");
        return Ok(());
    }

    if fs.exists(dir) {
        bail!("{:?} exists and is not a directory", dir);
    }

    fs.create_dir_all(dir)?;
    debug!(dir = ?dir, "created directory");
    Ok(())
}
