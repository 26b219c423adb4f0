//! JSON file persistence for the user's indicator/timeframe selection.

use crate::domain::error::StockcheckError;
use crate::domain::selection::Selection;
use crate::ports::selection_port::SelectionStore;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct JsonSelectionStore {
    path: PathBuf,
}

impl JsonSelectionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SelectionStore for JsonSelectionStore {
    fn load(&self) -> Result<Option<Selection>, StockcheckError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no saved selection at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StockcheckError::Selection {
                reason: format!("{}: {}", self.path.display(), e),
            })
    }

    fn save(&self, selection: &Selection) -> Result<(), StockcheckError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(selection)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
