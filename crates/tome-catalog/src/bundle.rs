//! Aggregation output consumed by the classifier.
//!
//! The aggregator materializes one bundle per `(component, version)` pair.
//! Bundles are the only coupling between the git-backed ingestion layer and
//! the catalog: they carry raw file paths and contents plus the descriptor
//! fields the classifier needs.

use std::sync::Arc;

use crate::file::Origin;

/// A raw file read from a git tree or worktree, not yet classified.
#[derive(Debug, Clone)]
pub struct RawFile {
    /// Path relative to the source's start path, posix separators.
    pub path: String,
    /// File contents.
    pub contents: Vec<u8>,
    /// Origin shared by all files from the same ref.
    pub origin: Arc<Origin>,
}

/// All files and descriptor fields of one component version.
#[derive(Debug, Clone, Default)]
pub struct ComponentVersionBundle {
    /// Component name from the descriptor.
    pub name: String,
    /// Version from the descriptor, coerced to a string.
    pub version: String,
    /// Display title.
    pub title: Option<String>,
    /// Contextual page spec of the component's start page.
    pub start_page: Option<String>,
    /// Navigation file paths, in menu order.
    pub nav: Vec<String>,
    /// Raw files, in source-declaration then walk order.
    pub files: Vec<RawFile>,
}

impl ComponentVersionBundle {
    /// Grouping key: `"{version}@{name}"`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}@{}", self.version, self.name)
    }
}
