//! Windowing and indicator derivation.
//!
//! Raw history -> cap -> timeframe slice -> close vector -> indicator
//! dispatch through the cache -> timestamp-aligned series.

use crate::domain::cache::{fingerprint, IndicatorCache};
use crate::domain::error::StockcheckError;
use crate::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    BollingerBands, IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue, MacdLines,
    Panel,
};
use crate::domain::price::PricePoint;
use crate::domain::timeframe::Timeframe;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Upper bound on points kept from a provider's history.
pub const DEFAULT_MAX_POINTS: usize = 1000;

/// The most recent `max_points` of `history`.
pub fn cap_history(history: &[PricePoint], max_points: usize) -> &[PricePoint] {
    &history[history.len().saturating_sub(max_points)..]
}

/// The most recent points covered by `timeframe`, or all of them if fewer.
pub fn slice_timeframe(points: &[PricePoint], timeframe: Timeframe) -> &[PricePoint] {
    match timeframe.trading_days() {
        Some(days) => &points[points.len().saturating_sub(days)..],
        None => points,
    }
}

/// Closing prices and their dates as two parallel vectors of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseVector {
    pub closes: Vec<f64>,
    pub times: Vec<NaiveDate>,
}

impl CloseVector {
    pub fn from_points(points: &[PricePoint]) -> Self {
        Self {
            closes: points.iter().map(|p| p.close).collect(),
            times: points.iter().map(|p| p.time).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.closes)
    }

    /// Pair each value with the date of the close it ends on. Every indicator
    /// drops its warm-up from the front, so the outputs line up with the tail
    /// of `times`.
    pub fn align<'a>(&'a self, values: &'a [f64]) -> impl Iterator<Item = (NaiveDate, f64)> + 'a {
        let offset = self.times.len().saturating_sub(values.len());
        self.times[offset..].iter().copied().zip(values.iter().copied())
    }
}

/// Raw result of one indicator computation, as stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutput {
    Line(Vec<f64>),
    Bands(BollingerBands),
    Macd(MacdLines),
}

pub fn compute_output(kind: &IndicatorKind, closes: &[f64]) -> IndicatorOutput {
    match *kind {
        IndicatorKind::Sma(period) => IndicatorOutput::Line(calculate_sma(closes, period)),
        IndicatorKind::Ema(period) => IndicatorOutput::Line(calculate_ema(closes, period)),
        IndicatorKind::Rsi(period) => IndicatorOutput::Line(calculate_rsi(closes, period)),
        IndicatorKind::Bollinger { period, mult } => {
            IndicatorOutput::Bands(calculate_bollinger(closes, period, mult.value()))
        }
        IndicatorKind::Macd { fast, slow, signal } => {
            IndicatorOutput::Macd(calculate_macd(closes, fast, slow, signal))
        }
    }
}

/// Turn a cached output into named, timestamped series.
fn to_series(kind: IndicatorKind, output: &IndicatorOutput, window: &CloseVector) -> Vec<IndicatorSeries> {
    let line = |name: String, values: &[f64]| IndicatorSeries {
        name,
        kind,
        points: window
            .align(values)
            .map(|(time, value)| IndicatorPoint {
                time,
                value: IndicatorValue::Line { value },
            })
            .collect(),
    };

    match output {
        IndicatorOutput::Line(values) => vec![line(kind.to_string(), values)],
        IndicatorOutput::Bands(bands) => {
            let tag = kind.to_string();
            vec![
                line(format!("{}-Middle", tag), &bands.middle),
                line(format!("{}-Upper", tag), &bands.upper),
                line(format!("{}-Lower", tag), &bands.lower),
            ]
        }
        IndicatorOutput::Macd(lines) => {
            let points = window
                .align(&lines.macd)
                .zip(lines.signal.iter().zip(&lines.hist))
                .map(|((time, macd), (&signal, &hist))| IndicatorPoint {
                    time,
                    value: IndicatorValue::Macd { macd, signal, hist },
                })
                .collect();
            vec![IndicatorSeries {
                name: kind.to_string(),
                kind,
                points,
            }]
        }
    }
}

/// Compute every requested indicator over `window`, going through `cache`.
///
/// Cache keys are `"{symbol}:{tag}"` plus the window fingerprint, so two
/// symbols with coincidentally equal fingerprints never share an entry.
pub fn compute_indicators(
    symbol: &str,
    window: &CloseVector,
    kinds: &[IndicatorKind],
    cache: &mut IndicatorCache<IndicatorOutput>,
) -> Result<Vec<IndicatorSeries>, StockcheckError> {
    if window.is_empty() {
        return Err(StockcheckError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let fp = window.fingerprint();
    let mut series = Vec::with_capacity(kinds.len());

    for kind in kinds {
        if window.len() < kind.min_points() {
            log::debug!(
                "{}: window of {} closes is shorter than {} needs ({})",
                symbol,
                window.len(),
                kind,
                kind.min_points()
            );
        }
        let key = format!("{}:{}", symbol, kind);
        let output = cache.memoize(&key, &fp, || compute_output(kind, &window.closes));
        series.extend(to_series(*kind, output, window));
    }

    Ok(series)
}

/// Chart-ready result of one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorBatch {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub window_len: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub series: Vec<IndicatorSeries>,
    /// Tags that could not be parsed and were left out.
    pub skipped: Vec<String>,
}

impl IndicatorBatch {
    pub fn get(&self, name: &str) -> Option<&IndicatorSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Series grouped by the chart panel they belong in.
    pub fn by_panel(&self) -> BTreeMap<Panel, Vec<&IndicatorSeries>> {
        let mut panels: BTreeMap<Panel, Vec<&IndicatorSeries>> = BTreeMap::new();
        for s in &self.series {
            panels.entry(s.kind.panel()).or_default().push(s);
        }
        panels
    }

    /// Identifies what is on screen: window length, its first and last day,
    /// and how many series are drawn. A renderer redraws when this changes.
    pub fn chart_key(&self) -> String {
        let day = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        format!(
            "k-{}-{}-{}-{}",
            self.window_len,
            day(self.first),
            day(self.last),
            self.series.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn history(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                time: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn cap_keeps_most_recent() {
        let h = history(&ramp(10));
        let capped = cap_history(&h, 4);
        assert_eq!(capped.len(), 4);
        assert_eq!(capped[0].close, 106.0);
        assert_eq!(cap_history(&h, 100).len(), 10);
        assert!(cap_history(&h, 0).is_empty());
    }

    #[test]
    fn slice_by_timeframe() {
        let h = history(&ramp(300));
        assert_eq!(slice_timeframe(&h, Timeframe::ThreeMonths).len(), 63);
        assert_eq!(slice_timeframe(&h, Timeframe::SixMonths).len(), 126);
        assert_eq!(slice_timeframe(&h, Timeframe::OneYear).len(), 252);
        assert_eq!(slice_timeframe(&h, Timeframe::All).len(), 300);
        assert_eq!(slice_timeframe(&h, Timeframe::ThreeMonths)[62].close, 399.0);
    }

    #[test]
    fn slice_shorter_history_returns_everything() {
        let h = history(&ramp(40));
        assert_eq!(slice_timeframe(&h, Timeframe::OneYear).len(), 40);
    }

    #[test]
    fn close_vector_is_parallel() {
        let h = history(&[1.0, 2.0, 3.0]);
        let cv = CloseVector::from_points(&h);
        assert_eq!(cv.closes, vec![1.0, 2.0, 3.0]);
        assert_eq!(cv.times.len(), 3);
        assert_eq!(cv.times[2], h[2].time);
        assert_eq!(cv.fingerprint(), "3:1:3");
    }

    #[test]
    fn align_pairs_with_trailing_dates() {
        let h = history(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let cv = CloseVector::from_points(&h);
        let sma = calculate_sma(&cv.closes, 3);
        let aligned: Vec<_> = cv.align(&sma).collect();
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[0], (h[2].time, 2.0));
        assert_eq!(aligned[2], (h[4].time, 4.0));
    }

    #[test]
    fn empty_window_is_no_data() {
        let mut cache = IndicatorCache::new();
        let err = compute_indicators(
            "AAPL",
            &CloseVector::default(),
            &[IndicatorKind::Sma(20)],
            &mut cache,
        )
        .unwrap_err();
        assert!(matches!(err, StockcheckError::NoData { ref symbol } if symbol == "AAPL"));
        assert!(cache.is_empty());
    }

    #[test]
    fn bollinger_expands_to_three_series() {
        let cv = CloseVector::from_points(&history(&ramp(30)));
        let mut cache = IndicatorCache::new();
        let series =
            compute_indicators("X", &cv, &[IndicatorKind::bollinger(20, 2.0)], &mut cache)
                .unwrap();
        let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["BB-20-2-Middle", "BB-20-2-Upper", "BB-20-2-Lower"]);
        for s in &series {
            assert_eq!(s.points.len(), 11);
            assert_eq!(s.points.last().unwrap().time, *cv.times.last().unwrap());
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn macd_points_carry_all_fields() {
        let cv = CloseVector::from_points(&history(&ramp(60)));
        let kind = IndicatorKind::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        let mut cache = IndicatorCache::new();
        let series = compute_indicators("X", &cv, &[kind], &mut cache).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "MACD-12-26-9");
        assert_eq!(series[0].points.len(), 60 - 26 - 9 + 2);
        for p in &series[0].points {
            match p.value {
                IndicatorValue::Macd { macd, signal, hist } => {
                    assert_relative_eq!(hist, macd - signal)
                }
                _ => panic!("expected MACD value"),
            }
        }
    }

    #[test]
    fn short_window_yields_empty_series() {
        let cv = CloseVector::from_points(&history(&ramp(5)));
        let mut cache = IndicatorCache::new();
        let series = compute_indicators("X", &cv, &[IndicatorKind::Sma(20)], &mut cache).unwrap();
        assert_eq!(series.len(), 1);
        assert!(series[0].points.is_empty());
    }

    #[test]
    fn repeated_compute_hits_cache() {
        let cv = CloseVector::from_points(&history(&ramp(40)));
        let kinds = [IndicatorKind::Sma(20), IndicatorKind::Rsi(14)];
        let mut cache = IndicatorCache::new();

        let first = compute_indicators("X", &cv, &kinds, &mut cache).unwrap();
        let second = compute_indicators("X", &cv, &kinds, &mut cache).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn symbols_do_not_share_entries() {
        let cv = CloseVector::from_points(&history(&ramp(40)));
        let mut cache = IndicatorCache::new();
        compute_indicators("AAA", &cv, &[IndicatorKind::Sma(5)], &mut cache).unwrap();
        compute_indicators("BBB", &cv, &[IndicatorKind::Sma(5)], &mut cache).unwrap();
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn batch_panels_and_chart_key() {
        let cv = CloseVector::from_points(&history(&ramp(60)));
        let kinds = [
            IndicatorKind::Sma(20),
            IndicatorKind::Rsi(14),
            IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
        ];
        let mut cache = IndicatorCache::new();
        let series = compute_indicators("X", &cv, &kinds, &mut cache).unwrap();
        let batch = IndicatorBatch {
            symbol: "X".into(),
            timeframe: Timeframe::All,
            window_len: cv.len(),
            first: cv.times.first().copied(),
            last: cv.times.last().copied(),
            series,
            skipped: vec![],
        };

        let panels = batch.by_panel();
        assert_eq!(panels[&Panel::Price].len(), 1);
        assert_eq!(panels[&Panel::Rsi][0].name, "RSI-14");
        assert_eq!(panels[&Panel::Macd][0].name, "MACD-12-26-9");
        assert_eq!(batch.chart_key(), "k-60-2024-01-01-2024-02-29-3");
        assert!(batch.get("SMA-20").is_some());
        assert!(batch.get("SMA-50").is_none());
    }
}
