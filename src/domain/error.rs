//! Domain error types.

/// Top-level error type for stockcheck.
#[derive(Debug, thiserror::Error)]
pub enum StockcheckError {
    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data to compute indicators for {symbol}")]
    NoData { symbol: String },

    #[error("invalid selection: {reason}")]
    Selection { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<&StockcheckError> for std::process::ExitCode {
    fn from(err: &StockcheckError) -> Self {
        let code: u8 = match err {
            StockcheckError::Io(_) | StockcheckError::Json(_) => 1,
            StockcheckError::ConfigParse { .. }
            | StockcheckError::ConfigMissing { .. }
            | StockcheckError::ConfigInvalid { .. } => 2,
            StockcheckError::Data { .. } => 3,
            StockcheckError::Selection { .. } => 4,
            StockcheckError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_message_names_symbol() {
        let err = StockcheckError::NoData {
            symbol: "AAPL".into(),
        };
        assert_eq!(err.to_string(), "no data to compute indicators for AAPL");
    }

    #[test]
    fn config_invalid_message() {
        let err = StockcheckError::ConfigInvalid {
            section: "chart".into(),
            key: "max_points".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [chart] max_points: must be positive"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StockcheckError = io.into();
        assert!(matches!(err, StockcheckError::Io(_)));
    }
}
