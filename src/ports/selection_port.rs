//! Selection persistence port trait.

use crate::domain::error::StockcheckError;
use crate::domain::selection::Selection;

pub trait SelectionStore {
    /// The stored selection, `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Selection>, StockcheckError>;

    /// Overwrite the stored selection.
    fn save(&self, selection: &Selection) -> Result<(), StockcheckError>;
}
