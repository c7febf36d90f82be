//! Source file resolution.
//!
//! Resolves `src`/`files` entries relative to the containing document's
//! directory, existence-checks them and reads their UTF-8 text. A missing
//! primary source is a distinguishable [`DemoError::FileNotFound`]; missing
//! entries of a multi-file list are silently dropped.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DemoError;
use crate::props::DemoConfig;

/// A demo source file resolved against the filesystem.
///
/// `absolute_path` existed on disk at resolution time. `relative_path` is
/// relative to the project root and always uses forward slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Absolute path on disk.
    pub absolute_path: PathBuf,
    /// Project-root-relative path, forward slashes.
    pub relative_path: String,
    /// Final path component.
    pub file_name: String,
    /// Raw UTF-8 file contents.
    pub code: String,
}

/// The resolved file set of one demo tag: the primary source plus the
/// surviving entries of the `files` list.
#[derive(Debug, Clone)]
pub struct ResolvedDemo {
    /// Primary source file.
    pub src: ResolvedFile,
    /// Additional listed files, in declaration order.
    pub files: Vec<ResolvedFile>,
}

/// Resolve one file reference against the document directory.
///
/// # Errors
///
/// [`DemoError::FileNotFound`] when the resolved path does not exist,
/// [`DemoError::Io`] when it exists but cannot be read as UTF-8.
pub fn resolve_file(reference: &str, doc_dir: &Path, root: &Path) -> Result<ResolvedFile, DemoError> {
    let absolute_path = doc_dir.join(reference);
    if !absolute_path.exists() {
        return Err(DemoError::FileNotFound {
            path: absolute_path,
        });
    }
    let code = std::fs::read_to_string(&absolute_path)?;
    let relative_path = normalize_path(
        absolute_path
            .strip_prefix(root)
            .unwrap_or(&absolute_path),
    );
    let file_name = absolute_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ResolvedFile {
        absolute_path,
        relative_path,
        file_name,
        code,
    })
}

/// Resolve a validated config into its file set.
///
/// The primary source must resolve; individually missing `files` entries
/// are dropped from the list rather than failing the whole render.
pub fn resolve_config(
    config: &DemoConfig,
    doc_dir: &Path,
    root: &Path,
) -> Result<ResolvedDemo, DemoError> {
    let src_ref = config.src.as_deref().ok_or(DemoError::MissingSource)?;
    let src = resolve_file(src_ref, doc_dir, root)?;

    let mut files = Vec::with_capacity(config.files.len());
    for reference in &config.files {
        match resolve_file(reference, doc_dir, root) {
            Ok(file) => files.push(file),
            Err(err) => debug!("dropping unresolvable demo file '{reference}': {err}"),
        }
    }

    Ok(ResolvedDemo { src, files })
}

/// Forward-slash string form of a path.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
