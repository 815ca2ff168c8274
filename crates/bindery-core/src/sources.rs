//! Reader and writer capabilities for fragment resolution.
//!
//! The assembler only ever sees these traits: a single-shot read per
//! fragment and a single-shot write for the final document. [`MemoryReader`]
//! keeps tests and doctests off the filesystem.

use eyre::{Result, WrapErr, eyre};
use std::path::{Path, PathBuf};

/// Loads referenced fragment files. The assembler calls this at most once
/// per unique fragment id per run.
pub trait FragmentReader {
    fn read_fragment(&self, path: &Path) -> Result<String>;
}

/// Writes the assembled document to its destination.
pub trait OutputWriter {
    fn write_output(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Filesystem reader. Relative fragment paths resolve against the base
/// directory when one is set (typically the root document's directory).
#[derive(Debug, Clone, Default)]
pub struct FsReader {
    base: Option<PathBuf>,
}

impl FsReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative fragment paths against the given directory.
    pub fn rooted(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FragmentReader for FsReader {
    fn read_fragment(&self, path: &Path) -> Result<String> {
        let resolved = self.resolve(path);
        std::fs::read_to_string(&resolved)
            .wrap_err_with(|| format!("Failed to read {}", resolved.display()))
    }
}

/// In-memory reader (useful for testing and doctests).
#[derive(Debug, Clone, Default)]
pub struct MemoryReader(Vec<(PathBuf, String)>);

impl MemoryReader {
    /// Create an empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment with content
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.push((path.into(), content.into()));
        self
    }
}

impl FragmentReader for MemoryReader {
    fn read_fragment(&self, path: &Path) -> Result<String> {
        self.0
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| eyre!("No such fragment: {}", path.display()))
    }
}

/// Filesystem writer. Creates missing parent directories, then writes the
/// whole document in one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl OutputWriter for FsWriter {
    fn write_output(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))
    }
}
