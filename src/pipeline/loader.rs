//! Dataset loader and writer for CSV files

use polars::prelude::*;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::utils::Logger;

/// Load a CSV dataset, logging the row count on success and the error on failure.
///
/// # Arguments
/// * `path` - CSV file with a header row
/// * `infer_schema_length` - Rows used for type inference; 0 scans the whole file
/// * `log` - Run logger
pub fn load_dataset(path: &Path, infer_schema_length: usize, log: &Logger) -> Result<DataFrame> {
    log.info(format!("Loading data file: {}", path.display()));

    match read_csv(path, infer_schema_length) {
        Ok(df) => {
            log.info(format!("Loaded {} rows from {}", df.height(), path.display()));
            Ok(df)
        }
        Err(err) => {
            log.error(format!("Data loading failed: {}", err));
            Err(err)
        }
    }
}

fn read_csv(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PipelineError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let load_err = |source: PolarsError| PipelineError::Load {
        path: path.to_path_buf(),
        source,
    };

    LazyCsvReader::new(path)
        .with_infer_schema_length(schema_length)
        .finish()
        .map_err(load_err)?
        .collect()
        .map_err(load_err)
}

/// Get column names from a CSV header without loading the data
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(PipelineError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let schema = LazyCsvReader::new(path)
        .finish()
        .and_then(|mut lf| lf.collect_schema())
        .map_err(|source| PipelineError::Load {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(schema.iter_names().map(|s| s.to_string()).collect())
}

/// Save dataset to a CSV file, creating parent directories as needed
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let mut file = std::fs::File::create(path).map_err(|e| PipelineError::io(path, e))?;
    CsvWriter::new(&mut file).finish(df)?;

    Ok(())
}
