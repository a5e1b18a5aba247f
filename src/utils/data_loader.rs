//! CSV loading and saving

use crate::error::{PipelineError, Result};
use crate::utils::io::create_parent_dir;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Rows scanned when inferring column dtypes
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Load a headered CSV file
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    tracing::debug!(path = %path.display(), rows = df.height(), cols = df.width(), "loaded csv");
    Ok(df)
}

/// Write a frame as headered CSV, creating parent directories
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    create_parent_dir(path)?;

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;

    tracing::debug!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,x,3.5").unwrap();
        writeln!(file, "4,y,6.0").unwrap();

        let df = read_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_write_csv_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut df = df!("a" => [1i64, 2, 3], "b" => ["p", "q", "r"]).unwrap();
        write_csv(&mut df, &path).unwrap();

        let loaded = read_csv(&path).unwrap();
        assert_eq!(loaded.shape(), (3, 2));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv("/nonexistent/data.csv").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
