//! Price history source port trait.

use crate::domain::error::StockcheckError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait PriceSource {
    /// Full daily history for `symbol`, ascending by date.
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcheckError>;

    fn list_symbols(&self) -> Result<Vec<String>, StockcheckError>;

    /// First date, last date and number of points, if any data exists.
    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockcheckError> {
        let history = self.fetch_history(symbol)?;
        Ok(match (history.first(), history.last()) {
            (Some(first), Some(last)) => Some((first.time, last.time, history.len())),
            _ => None,
        })
    }
}
