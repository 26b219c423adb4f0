//! JSON directory price source: one `{SYMBOL}.json` per symbol, each holding
//! the price endpoint's payload, an array of
//! `{time, open, high, low, close, volume}` objects.

use crate::adapters::csv_adapter::list_with_extension;
use crate::domain::error::StockcheckError;
use crate::domain::price::{normalize_history, PricePoint};
use crate::ports::price_port::PriceSource;
use std::fs;
use std::path::PathBuf;

pub struct JsonAdapter {
    base_path: PathBuf,
}

impl JsonAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn json_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", symbol.to_uppercase()))
    }
}

impl PriceSource for JsonAdapter {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcheckError> {
        let path = self.json_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| StockcheckError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let points: Vec<PricePoint> =
            serde_json::from_str(&content).map_err(|e| StockcheckError::Data {
                reason: format!("{}: {}", path.display(), e),
            })?;
        Ok(normalize_history(points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockcheckError> {
        list_with_extension(&self.base_path, "json")
    }
}
