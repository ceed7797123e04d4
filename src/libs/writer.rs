use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{info, warn};

use crate::libs::config::GeneratorConfig;
use crate::libs::emitter::{Artifact, Mode};
use crate::libs::error::WriteError;
use crate::libs::pipeline::{Generation, RunStatus, TableFailure};
use crate::libs::renderer::Language;

/// Persists rendered artifacts.
pub trait ArtifactWriter {
    fn write(&self, artifact: &Artifact) -> Result<PathBuf, WriteError>;
}

/// Writes artifacts as files under one directory.
pub struct DirWriter {
    root: PathBuf,
}

impl DirWriter {
    /// Creates `root` (and parents) if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| WriteError::CreateDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactWriter for DirWriter {
    fn write(&self, artifact: &Artifact) -> Result<PathBuf, WriteError> {
        let path = self.root.join(&artifact.name);
        if Path::new(&artifact.name).components().count() != 1 {
            return Err(WriteError::Write {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "artifact name is not a plain file name",
                ),
            });
        }
        std::fs::write(&path, &artifact.body).map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub artifact: String,
    pub reason: String,
}

/// User-facing outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub status: RunStatus,
    pub package: String,
    pub mode: Mode,
    pub language: Language,
    pub output_dir: PathBuf,
    pub structs: usize,
    pub written: Vec<String>,
    pub failed_tables: Vec<TableFailure>,
    pub failed_writes: Vec<WriteFailure>,
    pub skipped_tables: Vec<String>,
    /// Artifacts left unwritten because the run was interrupted.
    pub not_written: Vec<String>,
}

impl Summary {
    pub fn new(config: &GeneratorConfig, generation: &Generation) -> Self {
        Self {
            status: generation.status(),
            package: config.package.clone(),
            mode: config.mode,
            language: config.language,
            output_dir: config.output_dir.clone(),
            structs: generation.structs.len(),
            written: Vec::new(),
            failed_tables: generation.failures.clone(),
            failed_writes: Vec::new(),
            skipped_tables: generation.skipped.clone(),
            not_written: Vec::new(),
        }
    }

    fn refresh_status(&mut self) {
        if !self.failed_tables.is_empty()
            || !self.failed_writes.is_empty()
            || !self.not_written.is_empty()
        {
            self.status = RunStatus::Partial;
        }
    }
}

/// Writes every artifact; one failed write does not stop the others.
///
/// `interrupted` is checked before each write. Once it is set, the
/// remaining artifacts are recorded as not written and the run is partial.
pub fn write_all(
    writer: &dyn ArtifactWriter,
    artifacts: &[Artifact],
    summary: &mut Summary,
    interrupted: &AtomicBool,
) {
    for (i, artifact) in artifacts.iter().enumerate() {
        if interrupted.load(Ordering::SeqCst) {
            warn!(remaining = artifacts.len() - i, "interrupted, stopping writes");
            summary
                .not_written
                .extend(artifacts[i..].iter().map(|a| a.name.clone()));
            break;
        }
        match writer.write(artifact) {
            Ok(path) => {
                info!(path = %path.display(), "wrote artifact");
                summary.written.push(artifact.name.clone());
            }
            Err(err) => {
                warn!(artifact = %artifact.name, error = %err, "failed to write artifact");
                summary.failed_writes.push(WriteFailure {
                    artifact: artifact.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    summary.refresh_status();
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "Generated {} struct(s)", self.structs)?;
        writeln!(f, "Output directory: {}", self.output_dir.display())?;
        writeln!(f, "Package: {}", self.package)?;
        writeln!(f, "Mode: {} ({})", self.mode, self.language)?;

        if !self.written.is_empty() {
            writeln!(f, "\nWritten files:")?;
            for name in &self.written {
                writeln!(f, "  - {name}")?;
            }
        }
        if !self.skipped_tables.is_empty() {
            writeln!(f, "\nSkipped tables (no columns):")?;
            for table in &self.skipped_tables {
                writeln!(f, "  - {table}")?;
            }
        }
        if !self.failed_tables.is_empty() {
            writeln!(f, "\nFailed tables:")?;
            for failure in &self.failed_tables {
                writeln!(f, "  - {}: {}", failure.table, failure.reason)?;
            }
        }
        if !self.failed_writes.is_empty() {
            writeln!(f, "\nFailed writes:")?;
            for failure in &self.failed_writes {
                writeln!(f, "  - {}: {}", failure.artifact, failure.reason)?;
            }
        }
        if !self.not_written.is_empty() {
            writeln!(f, "\nInterrupted, not written:")?;
            for name in &self.not_written {
                writeln!(f, "  - {name}")?;
            }
        }
        Ok(())
    }
}
