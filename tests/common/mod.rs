#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use stockcheck::domain::error::StockcheckError;
pub use stockcheck::domain::price::PricePoint;
use stockcheck::ports::price_port::PriceSource;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    fetches: Cell<usize>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_history(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_uppercase(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_uppercase(), reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcheckError> {
        self.fetches.set(self.fetches.get() + 1);
        let symbol = symbol.to_uppercase();
        if let Some(reason) = self.errors.get(&symbol) {
            return Err(StockcheckError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(&symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockcheckError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(date_str: &str, close: f64) -> PricePoint {
    PricePoint {
        time: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// `closes.len()` consecutive daily points starting at 2023-01-02.
pub fn history_from_closes(closes: &[f64]) -> Vec<PricePoint> {
    let start = date(2023, 1, 2);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            time: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// A deterministic zig-zag uptrend of `n` points.
pub fn generate_history(n: usize) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..n)
        .map(|i| 100.0 + i as f64 * 0.5 + if i % 2 == 0 { 1.5 } else { -1.5 })
        .collect();
    history_from_closes(&closes)
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, points: &[PricePoint]) {
    let mut content = String::from("time,open,high,low,close,volume\n");
    for p in points {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.time, p.open, p.high, p.low, p.close, p.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
