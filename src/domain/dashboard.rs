//! Per-symbol chart state: price history, selection and the indicator cache.
//!
//! A change to the timeframe or to the indicator list re-runs the window
//! slice and indicator dispatch. Unchanged windows are served from the cache.

use crate::domain::cache::IndicatorCache;
use crate::domain::error::StockcheckError;
use crate::domain::pipeline::{
    cap_history, compute_indicators, slice_timeframe, CloseVector, IndicatorBatch,
    IndicatorOutput, DEFAULT_MAX_POINTS,
};
use crate::domain::price::{normalize_history, PricePoint};
use crate::domain::selection::Selection;
use crate::domain::timeframe::Timeframe;

#[derive(Debug)]
pub struct Dashboard {
    symbol: String,
    history: Vec<PricePoint>,
    max_points: usize,
    selection: Selection,
    cache: IndicatorCache<IndicatorOutput>,
}

impl Dashboard {
    pub fn new(symbol: &str, selection: Selection) -> Self {
        Self::with_cache(symbol, selection, IndicatorCache::new())
    }

    pub fn with_cache(
        symbol: &str,
        selection: Selection,
        cache: IndicatorCache<IndicatorOutput>,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            history: Vec::new(),
            max_points: DEFAULT_MAX_POINTS,
            selection,
            cache,
        }
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        let capped = cap_history(&self.history, max_points).to_vec();
        self.history = capped;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn cache(&self) -> &IndicatorCache<IndicatorOutput> {
        &self.cache
    }

    /// Switch to another symbol. History is cleared; cache entries are kept
    /// since they are keyed by symbol.
    pub fn set_symbol(&mut self, symbol: &str) {
        self.symbol = symbol.to_uppercase();
        self.history.clear();
    }

    /// Install a freshly fetched history, sorted and capped.
    pub fn load_history(&mut self, history: Vec<PricePoint>) {
        let history = normalize_history(history);
        self.history = cap_history(&history, self.max_points).to_vec();
        log::debug!(
            "{}: loaded {} points ({} after cap)",
            self.symbol,
            history.len(),
            self.history.len()
        );
    }

    /// The capped history.
    pub fn history(&self) -> &[PricePoint] {
        &self.history
    }

    /// The points visible in the selected timeframe.
    pub fn window(&self) -> &[PricePoint] {
        slice_timeframe(&self.history, self.selection.timeframe)
    }

    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> Result<IndicatorBatch, StockcheckError> {
        self.selection.timeframe = timeframe;
        self.recompute()
    }

    pub fn set_indicators<I, S>(&mut self, tags: I) -> Result<IndicatorBatch, StockcheckError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.set_indicators(tags);
        self.recompute()
    }

    pub fn toggle_indicator(&mut self, tag: &str) -> Result<IndicatorBatch, StockcheckError> {
        self.selection.toggle(tag);
        self.recompute()
    }

    /// Slice the window, derive closes and compute the selected indicators.
    ///
    /// With nothing selected the batch is empty even if there is no data;
    /// otherwise an empty window is a [`StockcheckError::NoData`].
    pub fn recompute(&mut self) -> Result<IndicatorBatch, StockcheckError> {
        let resolved = self.selection.resolve();
        let window = slice_timeframe(&self.history, self.selection.timeframe);
        let closes = CloseVector::from_points(window);

        log::debug!(
            "{}: {} window of {} points, {} indicators",
            self.symbol,
            self.selection.timeframe,
            closes.len(),
            resolved.kinds.len()
        );

        let series = if resolved.kinds.is_empty() {
            Vec::new()
        } else {
            compute_indicators(&self.symbol, &closes, &resolved.kinds, &mut self.cache)?
        };

        Ok(IndicatorBatch {
            symbol: self.symbol.clone(),
            timeframe: self.selection.timeframe,
            window_len: closes.len(),
            first: closes.times.first().copied(),
            last: closes.times.last().copied(),
            series,
            skipped: resolved.skipped,
        })
    }
}
