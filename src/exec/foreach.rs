// src/exec/foreach.rs

//! Glob expansion for `foreach` tasks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobBuilder;

use crate::fs::FileSystem;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[".git"];

/// Files under `root` whose root-relative path matches `pattern`.
///
/// Paths use `/` separators and are returned sorted, so the same tree
/// always yields the same item order. `*` does not cross directory
/// boundaries; use `**` for that.
pub fn expand_glob(fs: &dyn FileSystem, root: &Path, pattern: &str) -> Result<Vec<String>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid foreach glob '{pattern}'"))?
        .compile_matcher();

    let mut matches = Vec::new();
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in fs.read_dir(&dir)? {
            if fs.is_dir(&entry) {
                let skipped = entry
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIPPED_DIRS.contains(&n));
                if !skipped {
                    stack.push(entry);
                }
                continue;
            }

            let Ok(rel) = entry.strip_prefix(root) else {
                continue;
            };
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if matcher.is_match(&rel) {
                matches.push(rel);
            }
        }
    }

    matches.sort();
    Ok(matches)
}
