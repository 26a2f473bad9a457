//! CSV Table Loader Module
//! Reads and writes the delimited tables exchanged between stages using Polars.

use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to process CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Handles CSV file reading and writing.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file with every column read as text.
    ///
    /// Nothing is inferred at load time so that each stage decides how its
    /// columns are coerced. Empty cells become nulls.
    pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        tracing::debug!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded table"
        );
        Ok(df)
    }

    /// Write a DataFrame as CSV with a header row, replacing any previous file.
    ///
    /// The table is written to a sibling temporary file first and renamed into
    /// place, so a failed write never leaves a truncated output behind.
    pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), LoaderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LoaderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = Self::temp_path(path);
        let mut file = File::create(&tmp_path).map_err(|source| LoaderError::Io {
            path: tmp_path.clone(),
            source,
        })?;

        let written = CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df);
        drop(file);

        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        fs::rename(&tmp_path, path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), rows = df.height(), "wrote table");
        Ok(())
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}
