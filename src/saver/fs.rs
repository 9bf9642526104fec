//! Filesystem saver (CSV or Parquet tables, JSON figures)

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use arrow::csv::WriterBuilder;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{figure_file_stem, run_directory, table_file_stem, RunSaver, SaveReport, FIGURE_EXTENSION};
use crate::figure::Figure;
use crate::packet::VisualizedRun;
use crate::table::Table;
use crate::{Error, Result};

/// On-disk table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Comma separated values with a header row
    #[default]
    Csv,
    /// Apache Parquet
    Parquet,
}

impl TableFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Writes runs below a root directory.
#[derive(Debug, Clone)]
pub struct FsRunSaver {
    root: PathBuf,
    format: TableFormat,
}

impl FsRunSaver {
    /// Save runs below `root` as CSV.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: TableFormat::default(),
        }
    }

    /// Use `format` for tables.
    #[must_use]
    pub const fn with_format(mut self, format: TableFormat) -> Self {
        self.format = format;
        self
    }

    /// Get the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the table format.
    #[must_use]
    pub const fn format(&self) -> TableFormat {
        self.format
    }

    fn write_table(&self, file: File, table: &Table) -> Result<()> {
        match self.format {
            TableFormat::Csv => {
                let mut writer = WriterBuilder::new().with_header(true).build(file);
                writer.write(table)?;
            }
            TableFormat::Parquet => {
                let mut writer = ArrowWriter::try_new(file, table.schema(), None)?;
                writer.write(table)?;
                writer.close()?;
            }
        }
        Ok(())
    }

    fn write_figure(file: File, figure: &Figure) -> Result<()> {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, figure)?;
        writer.flush()?;
        Ok(())
    }
}

/// Open `path` for writing, refusing to replace an existing file.
fn create_new(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::StorageError(format!(
                "Refusing to overwrite existing file: {}",
                path.display()
            )),
            _ => Error::StorageError(format!("Failed to create {}: {e}", path.display())),
        })
}

impl FsRunSaver {
    /// Write every table and figure of `run` into `dir`, recording each created file.
    fn write_run(
        &self,
        run: &VisualizedRun,
        dir: &Path,
        created: &mut Vec<PathBuf>,
    ) -> Result<SaveReport> {
        let mut report = SaveReport::new(dir.to_path_buf());

        for key in run.tables().sorted_keys() {
            let table = run.table(key)?;
            if table.num_rows() == 0 {
                debug!(key = %key, "Skipping empty table");
                report.tables_skipped += 1;
                continue;
            }
            let path = dir.join(format!("{}.{}", table_file_stem(key), self.format.extension()));
            let file = create_new(&path)?;
            created.push(path);
            self.write_table(file, table)?;
            report.tables_written += 1;
        }

        for key in run.figures().sorted_keys() {
            let path = dir.join(format!("{}.{FIGURE_EXTENSION}", figure_file_stem(key)));
            let file = create_new(&path)?;
            created.push(path);
            Self::write_figure(file, run.figure(key)?)?;
            report.figures_written += 1;
        }

        Ok(report)
    }
}

/// Remove the files and directories a failed save created, newest first.
fn roll_back(created: &[PathBuf], created_dirs: &[PathBuf]) {
    for path in created.iter().rev() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove partial file");
        }
    }
    for dir in created_dirs.iter().rev() {
        if let Err(e) = fs::remove_dir(dir) {
            warn!(path = %dir.display(), error = %e, "Failed to remove partial run directory");
        }
    }
}

/// Directories between `dir` and its first existing ancestor, outermost first.
fn missing_dirs(dir: &Path) -> Vec<PathBuf> {
    let mut missing: Vec<PathBuf> = dir
        .ancestors()
        .take_while(|ancestor| !ancestor.exists())
        .map(Path::to_path_buf)
        .collect();
    missing.reverse();
    missing
}

impl RunSaver for FsRunSaver {
    fn save(&self, run: &VisualizedRun) -> Result<SaveReport> {
        let dir = run_directory(&self.root, run.record().model(), run.run_id());
        let created_dirs = missing_dirs(&dir);
        fs::create_dir_all(&dir).map_err(|e| {
            Error::StorageError(format!(
                "Failed to create run directory {}: {e}",
                dir.display()
            ))
        })?;

        // A failed save leaves nothing behind but what existed before it
        let mut created = Vec::new();
        let report = self.write_run(run, &dir, &mut created).map_err(|err| {
            warn!(
                run_id = run.run_id(),
                files = created.len(),
                error = %err,
                "Save failed, removing partial output"
            );
            roll_back(&created, &created_dirs);
            err
        })?;

        info!(
            run_id = run.run_id(),
            location = %dir.display(),
            tables = report.tables_written,
            skipped = report.tables_skipped,
            figures = report.figures_written,
            "Run persisted"
        );
        Ok(report)
    }
}
