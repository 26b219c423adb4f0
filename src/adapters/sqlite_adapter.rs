//! SQLite price source.

use crate::domain::error::StockcheckError;
use crate::domain::price::PricePoint;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> StockcheckError {
    StockcheckError::Data {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> StockcheckError {
    StockcheckError::Data {
        reason: format!("query failed: {}", e),
    }
}

impl SqliteAdapter {
    pub fn open(db_path: &Path, pool_size: u32) -> Result<Self, StockcheckError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, StockcheckError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockcheckError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), StockcheckError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS prices (
                    symbol TEXT NOT NULL,
                    time TEXT NOT NULL,
                    open REAL NOT NULL,
                    high REAL NOT NULL,
                    low REAL NOT NULL,
                    close REAL NOT NULL,
                    volume REAL NOT NULL,
                    PRIMARY KEY (symbol, time)
                );
                CREATE INDEX IF NOT EXISTS idx_prices_symbol ON prices(symbol);",
            )
            .map_err(query_error)
    }

    pub fn insert_points(&self, symbol: &str, points: &[PricePoint]) -> Result<(), StockcheckError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        let symbol = symbol.to_uppercase();

        for p in points {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, time, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    symbol,
                    p.time.format("%Y-%m-%d").to_string(),
                    p.open,
                    p.high,
                    p.low,
                    p.close,
                    p.volume
                ],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)
    }
}

impl PriceSource for SqliteAdapter {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcheckError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT time, open, high, low, close, volume
                 FROM prices
                 WHERE symbol = ?1
                 ORDER BY time ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![symbol.to_uppercase()], |row| {
                let time_str: String = row.get(0)?;
                let time = NaiveDate::parse_from_str(&time_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(PricePoint {
                    time,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    volume: row.get(5)?,
                })
            })
            .map_err(query_error)?;

        let mut points = Vec::new();
        for row in rows {
            points.push(row.map_err(query_error)?);
        }
        Ok(points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockcheckError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_error)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockcheckError> {
        let conn = self.conn()?;
        let (min, max, count): (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(time), MAX(time), COUNT(*) FROM prices WHERE symbol = ?1",
                params![symbol.to_uppercase()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| StockcheckError::Data {
                reason: format!("invalid date '{}': {}", s, e),
            })
        };

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => {
                Ok(Some((parse(&min)?, parse(&max)?, count as usize)))
            }
            _ => Ok(None),
        }
    }
}
