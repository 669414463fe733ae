//! Writing generated artifacts to disk.
//!
//! Artifacts carry relative names (`org/acme/travels/travels.proto`) that
//! are placed under the output directory. Dry-run mode reports what would
//! be written; [`FileWriter::check`] compares artifacts with the files on
//! disk for the `validate` command.

use std::path::{Path, PathBuf};

use protoschema::GeneratedArtifact;

use crate::error::{CliResult, WriteError};

/// Result of a write operation.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf, bytes: usize },

    /// File already had the generated content and was left alone.
    Unchanged { path: PathBuf },

    /// Dry run, nothing was written.
    DryRun { content: String, path: PathBuf },
}

/// Outcome of comparing one artifact with the file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    UpToDate(PathBuf),
    Missing(PathBuf),
    Outdated(PathBuf),
}

/// Writes artifacts below an output directory.
#[derive(Debug)]
pub struct FileWriter {
    output_dir: PathBuf,
    dry_run: bool,
}

impl FileWriter {
    pub fn new(output_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            dry_run,
        }
    }

    /// Path an artifact is written to.
    pub fn target(&self, artifact: &GeneratedArtifact) -> PathBuf {
        self.output_dir.join(&artifact.name)
    }

    /// Write every artifact, stopping at the first failure.
    pub fn write_all(&self, artifacts: &[GeneratedArtifact]) -> CliResult<Vec<WriteResult>> {
        artifacts.iter().map(|artifact| self.write_artifact(artifact)).collect()
    }

    pub fn write_artifact(&self, artifact: &GeneratedArtifact) -> CliResult<WriteResult> {
        self.write(&self.target(artifact), &artifact.content)
    }

    /// Write content to a file, creating parent directories.
    ///
    /// Files whose content already matches are not touched.
    pub fn write(&self, path: &Path, content: &str) -> CliResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path: path.to_path_buf(),
            });
        }

        if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
            tracing::debug!(path = %path.display(), "file up to date");
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| WriteError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }

    /// Compare every artifact with the file it would be written to.
    pub fn check(&self, artifacts: &[GeneratedArtifact]) -> Vec<CheckResult> {
        artifacts
            .iter()
            .map(|artifact| {
                let path = self.target(artifact);
                match std::fs::read_to_string(&path) {
                    Ok(existing) if existing == artifact.content => CheckResult::UpToDate(path),
                    Ok(_) => CheckResult::Outdated(path),
                    Err(_) => CheckResult::Missing(path),
                }
            })
            .collect()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::Unchanged { path }
            | WriteResult::DryRun { path, .. } => path,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }

    /// Bytes written (0 unless written).
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } => *bytes,
            WriteResult::Unchanged { .. } | WriteResult::DryRun { .. } => 0,
        }
    }
}

impl CheckResult {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, CheckResult::UpToDate(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            CheckResult::UpToDate(path) | CheckResult::Missing(path) | CheckResult::Outdated(path) => path,
        }
    }
}
