//! Application configuration and its validation.
//!
//! Validates all config fields before any data is loaded.

use crate::domain::error::StockcheckError;
use crate::domain::pipeline::DEFAULT_MAX_POINTS;
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub const DEFAULT_SELECTION_FILE: &str = "selection.json";
pub const DEFAULT_POOL_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Csv,
    Json,
    Sqlite,
}

impl FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(DataSourceKind::Csv),
            "json" => Ok(DataSourceKind::Json),
            "sqlite" => Ok(DataSourceKind::Sqlite),
            other => Err(format!("unknown source '{}', expected csv, json or sqlite", other)),
        }
    }
}

/// Validated settings read from the `[chart]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub max_points: usize,
    pub default_timeframe: Timeframe,
    /// `None` keeps every cached result for the process lifetime.
    pub lru_capacity: Option<usize>,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockcheckError> {
    validate_source(config)?;
    validate_path(config)?;
    pool_size(config)?;
    chart_settings(config)?;
    Ok(())
}

pub fn data_source(config: &dyn ConfigPort) -> Result<DataSourceKind, StockcheckError> {
    let raw = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    raw.parse().map_err(|reason| StockcheckError::ConfigInvalid {
        section: "data".to_string(),
        key: "source".to_string(),
        reason,
    })
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), StockcheckError> {
    data_source(config).map(|_| ())
}

fn validate_path(config: &dyn ConfigPort) -> Result<(), StockcheckError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(StockcheckError::ConfigInvalid {
            section: "data".to_string(),
            key: "path".to_string(),
            reason: "path must not be empty".to_string(),
        }),
        None => Err(StockcheckError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

/// SQLite connection pool size from `[data] pool_size`.
pub fn pool_size(config: &dyn ConfigPort) -> Result<u32, StockcheckError> {
    let raw = config.get_int("data", "pool_size", DEFAULT_POOL_SIZE as i64);
    match u32::try_from(raw) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(StockcheckError::ConfigInvalid {
            section: "data".to_string(),
            key: "pool_size".to_string(),
            reason: format!("pool_size must be between 1 and {}", u32::MAX),
        }),
    }
}

pub fn chart_settings(config: &dyn ConfigPort) -> Result<ChartSettings, StockcheckError> {
    let max_points = config.get_int("chart", "max_points", DEFAULT_MAX_POINTS as i64);
    if max_points <= 0 {
        return Err(StockcheckError::ConfigInvalid {
            section: "chart".to_string(),
            key: "max_points".to_string(),
            reason: "max_points must be positive".to_string(),
        });
    }

    let default_timeframe = match config.get_string("chart", "default_timeframe") {
        Some(s) => s.parse().map_err(|reason| StockcheckError::ConfigInvalid {
            section: "chart".to_string(),
            key: "default_timeframe".to_string(),
            reason,
        })?,
        None => Timeframe::default(),
    };

    let lru_capacity = config.get_int("chart", "lru_capacity", 0);
    if lru_capacity < 0 {
        return Err(StockcheckError::ConfigInvalid {
            section: "chart".to_string(),
            key: "lru_capacity".to_string(),
            reason: "lru_capacity must be non-negative".to_string(),
        });
    }

    Ok(ChartSettings {
        max_points: max_points as usize,
        default_timeframe,
        lru_capacity: (lru_capacity > 0).then_some(lru_capacity as usize),
    })
}
