//! CSV output.

use crate::error::{KpiError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Writes the output table as a comma-separated UTF-8 CSV with a header row
/// and no index column.
pub struct CsvOutput {
    path: PathBuf,
    atomic: bool,
}

impl CsvOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic: true,
        }
    }

    /// Write through a temporary file in the destination directory and
    /// rename it into place when done.
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `df`, creating the destination directory if needed.
    ///
    /// NaN cells are written as empty fields. An existing destination keeps
    /// its permissions; a new one gets the same mode a plain create would.
    /// Any failure is reported as [`KpiError::Write`].
    pub fn write(&self, df: &DataFrame) -> Result<PathBuf> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| KpiError::write(&self.path, e))?;
            info!("Created output directory: {}", dir.display());
        }

        let mut out = nan_as_null(df).map_err(|e| KpiError::write(&self.path, e))?;

        if self.atomic {
            let mut tmp = temp_file_in(&dir).map_err(|e| KpiError::write(&self.path, e))?;
            if let Ok(existing) = fs::metadata(&self.path) {
                tmp.as_file()
                    .set_permissions(existing.permissions())
                    .map_err(|e| KpiError::write(&self.path, e))?;
            }
            write_csv(tmp.as_file_mut(), &mut out)
                .map_err(|e| KpiError::write(&self.path, e))?;
            tmp.as_file_mut()
                .flush()
                .map_err(|e| KpiError::write(&self.path, e))?;
            debug!("Renaming {} into place", tmp.path().display());
            tmp.persist(&self.path)
                .map_err(|e| KpiError::write(&self.path, e.error))?;
        } else {
            let mut file = File::create(&self.path).map_err(|e| KpiError::write(&self.path, e))?;
            write_csv(&mut file, &mut out).map_err(|e| KpiError::write(&self.path, e))?;
        }

        info!(
            "Wrote {} rows x {} columns to {}",
            out.height(),
            out.width(),
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

/// Temporary file in `dir`, opened with the mode `File::create` would use
/// (0o666 minus the umask) instead of tempfile's private 0o600.
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".kpi").suffix(".csv.tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Copy of `df` with NaN replaced by null in every Float64 column, so the
/// CSV writer emits an empty field for it.
fn nan_as_null(df: &DataFrame) -> PolarsResult<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| -> PolarsResult<Column> {
            if col.dtype() != &DataType::Float64 {
                return Ok(col.clone());
            }
            let ca: Float64Chunked = col
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(Column::from(ca.with_name(col.name().clone()).into_series()))
        })
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

fn write_csv<W: Write>(writer: &mut W, df: &mut DataFrame) -> PolarsResult<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(b',')
        .finish(df)
}
