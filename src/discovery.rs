//! File discovery: walk directory trees and collect `.py` files.
//!
//! The walker respects `.gitignore`/`.ignore` files, skips hidden entries
//! (which covers `.git`, `.venv`, `.mypy_cache`, …), and always skips the
//! conventional virtual-environment and cache directories in
//! [`ALWAYS_EXCLUDE`] even when they are neither hidden nor gitignored.
//! Callers can exclude further paths with the `exclude` parameter.

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// Directory names that are never worth parsing: virtual environments,
/// caches, build output, and version-control internals.
const ALWAYS_EXCLUDE: &[&str] = &[
    "venv",
    "env",
    ".venv",
    ".env",
    "virtualenv",
    "__pycache__",
    ".mypy_cache",
    ".ruff_cache",
    ".pytest_cache",
    ".hypothesis",
    "build",
    "dist",
    ".eggs",
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    ".tox",
    ".nox",
];

/// True when any normal path component matches one of `names`, either
/// exactly or as a substring.
fn component_matches(path: &Path, names: &[String]) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            names
                .iter()
                .any(|pat| name == pat.as_str() || name.contains(pat.as_str()))
        }
        _ => false,
    })
}

/// Collect every `.py` file reachable from `root`, skipping hidden entries,
/// gitignored paths, [`ALWAYS_EXCLUDE`] directories, and any path with a
/// component matching `exclude`.  Order is not guaranteed; the driver sorts
/// its reports.
pub fn discover_python_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        // Apply .gitignore rules even without a .git directory present.
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            continue;
        }
        let always_hit = path.components().any(|c| match c {
            Component::Normal(name) => ALWAYS_EXCLUDE.contains(&name.to_string_lossy().as_ref()),
            _ => false,
        });
        if always_hit {
            continue;
        }
        if !exclude.is_empty() && component_matches(path, exclude) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    Ok(files)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
