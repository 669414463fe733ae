//! Source file discovery.
//!
//! Walks a directory for Rust files, honoring `.gitignore` and an optional
//! glob filter on the path relative to the root.

use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{CliResult, ScanError};

/// A discovered source file with its content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    pub content: String,
}

impl SourceFile {
    /// Module path of the file relative to the scan root.
    ///
    /// A leading `src` directory is dropped and `lib.rs`, `main.rs` and
    /// `mod.rs` stand for their directory, so `src/model/order.rs` is
    /// `["model", "order"]`.
    pub fn module_path(&self) -> Vec<String> {
        let mut segments: Vec<String> = self
            .relative_path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if let Some(file) = segments.pop() {
            let stem = file.strip_suffix(".rs").unwrap_or(&file);
            if !matches!(stem, "lib" | "main" | "mod") {
                segments.push(stem.to_string());
            }
        }
        if segments.first().is_some_and(|first| first == "src") {
            segments.remove(0);
        }
        segments
    }
}

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", ".git"];

/// Finds the Rust sources of a crate or workspace.
///
/// Build output and `.git` are skipped even when no `.gitignore` says so;
/// `.gitignore` rules apply unless disabled.
#[derive(Debug)]
pub struct SourceScanner {
    root: PathBuf,
    respect_gitignore: bool,
    filter: Option<glob::Pattern>,
}

impl SourceScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
            filter: None,
        }
    }

    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Keep only files whose path below the root matches `pattern`.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let compiled =
            glob::Pattern::new(pattern).map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(compiled);
        Ok(self)
    }

    /// Read every Rust source below the root, in path order.
    ///
    /// Fails with [`ScanError::NoRustFiles`] when there is none.
    pub fn scan(&self) -> CliResult<Vec<SourceFile>> {
        let files = self.collect()?;
        if files.is_empty() {
            return Err(ScanError::no_rust_files(self.root.clone()).into());
        }
        Ok(files)
    }

    /// Like [`scan`](Self::scan), but an empty tree is not an error.
    pub fn scan_allow_empty(&self) -> CliResult<Vec<SourceFile>> {
        Ok(self.collect()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collect(&self) -> Result<Vec<SourceFile>, ScanError> {
        if !self.root.is_dir() {
            return Err(ScanError::not_found(self.root.clone()));
        }

        let mut files = Vec::new();
        for entry in self.walker().build() {
            let entry = entry?;
            let is_source = entry.file_type().is_some_and(|kind| kind.is_file())
                && entry.path().extension().is_some_and(|ext| ext == "rs");
            if !is_source {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();
            if self.filter.as_ref().is_some_and(|filter| !filter.matches_path(&relative)) {
                continue;
            }

            files.push(read_source(entry.into_path(), relative)?);
        }

        tracing::debug!(root = %self.root.display(), files = files.len(), "scanned sources");
        Ok(files)
    }

    fn walker(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
                !(is_dir && entry.depth() > 0 && SKIPPED_DIRS.iter().any(|name| entry.file_name() == *name))
            })
            .sort_by_file_path(|a, b| a.cmp(b));
        builder
    }
}

fn read_source(path: PathBuf, relative_path: PathBuf) -> Result<SourceFile, ScanError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ScanError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::trace!(file = %relative_path.display(), "read source file");
    Ok(SourceFile {
        path,
        relative_path,
        content,
    })
}
