//! Discover, validate, format and write back
//!
//! The pipeline visits files strictly one after another, in discovery order.
//! Failures are handled differently depending on where they happen:
//!
//! - discovery failure ends the run before any file is touched;
//! - a file that cannot be stat'd or read is reported and skipped;
//! - a syntax error in any file aborts the run, leaving every later file alone;
//! - a failed write is reported and the run moves on to the next file.
//!
//! Every line of console output goes to the report sink handed to
//! [`Pipeline::new`]. A file's path is reported right before it is written,
//! whether or not formatting changed it.

use crate::discovery::Enumerator;
use crate::error::PipelineError;
use crate::formatter::Formatter;
use crate::validator::{Diagnostic, Validator};
use std::fs::{self, Permissions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every discovered file was visited
    Done,
    /// A file failed validation; files after it were not processed
    Aborted(Diagnostic),
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Done => 0,
            RunStatus::Aborted(_) => 1,
        }
    }
}

/// One file on its way through the pipeline
#[derive(Debug)]
pub struct TargetFile {
    pub path: PathBuf,
    /// Mode of the file before it was rewritten
    pub permissions: Permissions,
    pub original: Vec<u8>,
    pub formatted: Option<Vec<u8>>,
}

impl TargetFile {
    /// Stats and reads `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if either step fails.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let permissions = fs::metadata(path)?.permissions();
        let original = fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            permissions,
            original,
            formatted: None,
        })
    }

    /// Writes the formatted content back in place and restores the original mode.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write or the mode change fails.
    pub fn write_back(&self) -> std::io::Result<()> {
        let content = self.formatted.as_deref().unwrap_or(self.original.as_slice());
        fs::write(&self.path, content)?;
        fs::set_permissions(&self.path, self.permissions.clone())
    }

    pub fn changed(&self) -> bool {
        self.formatted
            .as_deref()
            .is_some_and(|formatted| formatted != self.original.as_slice())
    }
}

/// Sequential formatting run over one directory tree
pub struct Pipeline<E, V, F, W> {
    enumerator: E,
    validator: V,
    formatter: F,
    report: W,
}

impl<E, V, F, W> Pipeline<E, V, F, W>
where
    E: Enumerator,
    V: Validator,
    F: Formatter,
    W: Write,
{
    pub fn new(enumerator: E, validator: V, formatter: F, report: W) -> Self {
        Self {
            enumerator,
            validator,
            formatter,
            report,
        }
    }

    /// Discovers files under `base_dir` and processes them in order.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, if the formatter rejects a file that
    /// passed validation, or if the report cannot be written. A syntax error is
    /// not an error here: it is returned as [`RunStatus::Aborted`].
    pub fn run(&mut self, base_dir: &Path) -> Result<RunStatus, PipelineError> {
        let files = match self.enumerator.enumerate(base_dir) {
            Ok(files) => files,
            Err(e) => {
                writeln!(self.report, "{e}")?;
                return Err(e.into());
            }
        };
        self.run_files(&files)
    }

    /// Processes already-discovered files in the given order.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run`].
    pub fn run_files(&mut self, files: &[PathBuf]) -> Result<RunStatus, PipelineError> {
        for path in files {
            let mut target = match TargetFile::load(path) {
                Ok(target) => target,
                Err(e) => {
                    log::warn!("skipping {}: {e}", path.display());
                    writeln!(self.report, "Unable to read file {} ({e})", path.display())?;
                    continue;
                }
            };

            if let Err(diagnostic) = self.validator.validate(&target.path, &target.original) {
                log::debug!("aborting run at {}", path.display());
                writeln!(self.report, "{diagnostic}")?;
                return Ok(RunStatus::Aborted(diagnostic));
            }

            let formatted =
                self.formatter
                    .format(&target.original)
                    .map_err(|cause| PipelineError::Format {
                        path: path.clone(),
                        cause,
                    })?;
            target.formatted = Some(formatted);
            log::trace!("{} changed: {}", path.display(), target.changed());

            writeln!(self.report, "{}", path.display())?;
            if let Err(e) = target.write_back() {
                log::warn!("failed to write {}: {e}", path.display());
                writeln!(self.report, "Unable to write file {} ({e})", path.display())?;
            }
        }
        Ok(RunStatus::Done)
    }

    pub fn into_report(self) -> W {
        self.report
    }
}
