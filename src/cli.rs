//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_adapter::JsonAdapter;
use crate::adapters::json_selection_store::JsonSelectionStore;
use crate::domain::cache::IndicatorCache;
use crate::domain::config_validation::{
    chart_settings, data_source, validate_config, ChartSettings, DataSourceKind,
    DEFAULT_SELECTION_FILE,
};
use crate::domain::dashboard::Dashboard;
use crate::domain::error::StockcheckError;
use crate::domain::indicator::standard_options;
use crate::domain::pipeline::{IndicatorBatch, IndicatorOutput};
use crate::domain::selection::{resolve_tags, Selection};
use crate::domain::timeframe::Timeframe;
use crate::ports::price_port::PriceSource;
use crate::ports::selection_port::SelectionStore;

#[derive(Parser, Debug)]
#[command(name = "stockcheck", about = "Stock price indicator dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators for a symbol and print them as JSON
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        timeframe: Option<Timeframe>,
        /// Indicator tag such as SMA-20, BB-20-2 or MACD-12-26-9 (repeatable)
        #[arg(short, long = "indicator")]
        indicators: Vec<String>,
        /// Persist the timeframe and indicators used for this run
        #[arg(long)]
        save: bool,
    },
    /// Show or change the saved indicator selection
    Select {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        timeframe: Option<Timeframe>,
        #[arg(short, long = "indicator")]
        indicators: Vec<String>,
        /// Toggle a single tag on or off
        #[arg(long)]
        toggle: Option<String>,
        /// Remove every selected indicator
        #[arg(long)]
        clear: bool,
    },
    /// List symbols available in the configured data source
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the standard indicator choices and timeframes
    Options,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Indicators {
            config,
            symbol,
            timeframe,
            indicators,
            save,
        } => run_indicators(&config, &symbol, timeframe, &indicators, save),
        Command::Select {
            config,
            timeframe,
            indicators,
            toggle,
            clear,
        } => run_select(&config, timeframe, &indicators, toggle.as_deref(), clear),
        Command::Symbols { config } => run_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, &symbol),
        Command::Validate { config } => run_validate(&config),
        Command::Options => run_options(),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Open the price source named by `[data] source`, rooted at `[data] path`.
pub fn build_price_source(
    config: &FileConfigAdapter,
) -> Result<Box<dyn PriceSource>, StockcheckError> {
    let kind = data_source(config)?;
    let path = config
        .get_path("data", "path")
        .ok_or_else(|| StockcheckError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    match kind {
        DataSourceKind::Csv => Ok(Box::new(CsvAdapter::new(path))),
        DataSourceKind::Json => Ok(Box::new(JsonAdapter::new(path))),
        DataSourceKind::Sqlite => open_sqlite(config, &path),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(
    config: &FileConfigAdapter,
    path: &std::path::Path,
) -> Result<Box<dyn PriceSource>, StockcheckError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;
    use crate::domain::config_validation::pool_size;

    let adapter = SqliteAdapter::open(path, pool_size(config)?)?;
    adapter.initialize_schema()?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(
    _config: &FileConfigAdapter,
    _path: &std::path::Path,
) -> Result<Box<dyn PriceSource>, StockcheckError> {
    Err(StockcheckError::ConfigInvalid {
        section: "data".into(),
        key: "source".into(),
        reason: "sqlite feature is required for source = sqlite".into(),
    })
}

/// The selection store at `[selection] state_file`, or `selection.json` next to the config.
pub fn build_selection_store(config: &FileConfigAdapter) -> JsonSelectionStore {
    let path = config
        .get_path("selection", "state_file")
        .unwrap_or_else(|| config.resolve_path(DEFAULT_SELECTION_FILE));
    JsonSelectionStore::new(path)
}

pub fn build_cache(chart: &ChartSettings) -> IndicatorCache<IndicatorOutput> {
    match chart.lru_capacity {
        Some(capacity) => IndicatorCache::lru(capacity),
        None => IndicatorCache::new(),
    }
}

/// The saved selection, falling back to an empty one on the configured
/// default timeframe, with command-line overrides applied on top.
pub fn effective_selection(
    stored: Option<Selection>,
    chart: &ChartSettings,
    timeframe: Option<Timeframe>,
    indicators: &[String],
) -> Selection {
    let mut selection =
        stored.unwrap_or_else(|| Selection::new(Vec::<String>::new(), chart.default_timeframe));
    if let Some(tf) = timeframe {
        selection.timeframe = tf;
    }
    if !indicators.is_empty() {
        selection.set_indicators(indicators.iter().cloned());
    }
    selection
}

/// Fetch `symbol` from `source` and compute `selection` over it.
pub fn compute_batch(
    source: &dyn PriceSource,
    symbol: &str,
    selection: Selection,
    chart: &ChartSettings,
) -> Result<IndicatorBatch, StockcheckError> {
    let mut dashboard =
        Dashboard::with_cache(symbol, selection, build_cache(chart)).with_max_points(chart.max_points);
    let history = source.fetch_history(dashboard.symbol())?;
    dashboard.load_history(history);
    dashboard.recompute()
}

fn run_indicators(
    config_path: &PathBuf,
    symbol: &str,
    timeframe: Option<Timeframe>,
    indicators: &[String],
    save: bool,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let chart = match chart_settings(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let source = match build_price_source(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let store = build_selection_store(&config);
    let stored = match store.load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let selection = effective_selection(stored, &chart, timeframe, indicators);
    if selection.indicators.is_empty() {
        eprintln!("No indicators selected (use --indicator or the select command)");
    }

    let batch = match compute_batch(source.as_ref(), symbol, selection.clone(), &chart) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for tag in &batch.skipped {
        eprintln!("warning: skipping malformed indicator '{}'", tag);
    }
    eprintln!(
        "{} {}: {} points, {} series",
        batch.symbol,
        batch.timeframe,
        batch.window_len,
        batch.series.len()
    );

    if save {
        if let Err(e) = store.save(&selection) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Selection saved to {}", store.path().display());
    }

    match serde_json::to_string_pretty(&batch) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let err = StockcheckError::from(e);
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn run_select(
    config_path: &PathBuf,
    timeframe: Option<Timeframe>,
    indicators: &[String],
    toggle: Option<&str>,
    clear: bool,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let chart = match chart_settings(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let store = build_selection_store(&config);
    let stored = match store.load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let changed = clear || toggle.is_some() || timeframe.is_some() || !indicators.is_empty();
    let mut selection = effective_selection(stored, &chart, timeframe, indicators);
    if clear {
        selection.set_indicators(Vec::<String>::new());
    }
    if let Some(tag) = toggle {
        let on = selection.toggle(tag);
        eprintln!("{} {}", tag.trim(), if on { "on" } else { "off" });
    }

    let resolved = resolve_tags(&selection.indicators);
    for tag in &resolved.skipped {
        eprintln!("warning: '{}' is not a valid indicator tag", tag);
    }

    if changed {
        if let Err(e) = store.save(&selection) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Selection saved to {}", store.path().display());
    }

    println!("timeframe: {}", selection.timeframe);
    if selection.indicators.is_empty() {
        println!("indicators: (none)");
    } else {
        println!("indicators: {}", selection.indicators.join(", "));
    }
    ExitCode::SUCCESS
}

fn run_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let source = match build_price_source(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let symbols = match source.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, symbol: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let source = match build_price_source(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let symbol = symbol.to_uppercase();
    match source.data_range(&symbol) {
        Ok(Some((first, last, count))) => {
            println!("{}: {} points, {} to {}", symbol, count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            let err = StockcheckError::NoData { symbol };
            eprintln!("{err}");
            (&err).into()
        }
        Err(e) => {
            eprintln!("error querying {}: {}", symbol, e);
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let (source, chart) = match (data_source(&config), chart_settings(&config)) {
        (Ok(s), Ok(c)) => (s, c),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_path = config.get_path("data", "path").unwrap_or_default();

    eprintln!("\nData:");
    eprintln!("  source: {:?}", source);
    eprintln!("  path:   {}", data_path.display());
    eprintln!("\nChart:");
    eprintln!("  max_points:        {}", chart.max_points);
    eprintln!("  default_timeframe: {}", chart.default_timeframe);
    match chart.lru_capacity {
        Some(n) => eprintln!("  cache:             lru ({} entries)", n),
        None => eprintln!("  cache:             unbounded"),
    }
    eprintln!("\nSelection file: {}", build_selection_store(&config).path().display());

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_options() -> ExitCode {
    println!("Indicators:");
    for (label, kind) in standard_options() {
        println!("  {:<14} {}", label, kind);
    }
    println!("Timeframes:");
    for tf in Timeframe::ALL_VARIANTS {
        match tf.trading_days() {
            Some(days) => println!("  {:<4} last {} trading days", tf.as_str(), days),
            None => println!("  {:<4} full history", tf.as_str()),
        }
    }
    ExitCode::SUCCESS
}
