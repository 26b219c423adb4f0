//! CSV directory price source: one `{SYMBOL}.csv` per symbol.
//!
//! Expected header: `time,open,high,low,close,volume` with ISO dates.

use crate::domain::error::StockcheckError;
use crate::domain::price::{normalize_history, PricePoint};
use crate::ports::price_port::PriceSource;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

impl PriceSource for CsvAdapter {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcheckError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| StockcheckError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut points = Vec::new();
        for (line, result) in rdr.deserialize::<PricePoint>().enumerate() {
            let point = result.map_err(|e| StockcheckError::Data {
                reason: format!("{} record {}: {}", path.display(), line + 1, e),
            })?;
            points.push(point);
        }

        log::debug!("read {} points from {}", points.len(), path.display());
        Ok(normalize_history(points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockcheckError> {
        list_with_extension(&self.base_path, "csv")
    }
}

/// Upper-cased file stems in `dir` with the given extension, sorted.
pub(crate) fn list_with_extension(
    dir: &std::path::Path,
    extension: &str,
) -> Result<Vec<String>, StockcheckError> {
    let entries = fs::read_dir(dir).map_err(|e| StockcheckError::Data {
        reason: format!("failed to read directory {}: {}", dir.display(), e),
    })?;

    let mut symbols = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StockcheckError::Data {
            reason: format!("directory entry error: {}", e),
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        if let Some(stem) = path.file_stem() {
            symbols.push(stem.to_string_lossy().to_uppercase());
        }
    }

    symbols.sort();
    Ok(symbols)
}
