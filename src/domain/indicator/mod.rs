//! Technical indicator implementations.
//!
//! The calculation functions are pure and operate on a chronological slice of
//! closing prices. Each one drops the leading warm-up region instead of
//! padding it, so an output is always a suffix-aligned, shorter-or-equal
//! sequence of the input:
//! - `calculate_sma`: `len - period + 1` points
//! - `calculate_ema`: `len - period + 1` points
//! - `calculate_rsi`: `len - period` points
//! - `calculate_bollinger`: `len - period + 1` points per band
//! - `calculate_macd`: `len - slow - signal + 2` points per line
//!
//! This module also holds the typed identity of an indicator
//! ([`IndicatorKind`]), parsed from and printed as the dashboard's tag strings
//! (`"SMA-20"`, `"BB-20-2"`, `"MACD-12-26-9"`).

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdLines};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Chart region an indicator is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    /// Overlaid on the candlestick chart, same y-axis as price.
    Price,
    /// Separate 0..100 oscillator pane.
    Rsi,
    /// Separate MACD pane (two lines plus histogram).
    Macd,
}

/// Bollinger band width in standard deviations, kept exactly as given.
///
/// Equality and hashing go through the bit pattern so the value can sit in a
/// cache key. `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct Multiplier(f64);

impl Multiplier {
    pub fn new(value: f64) -> Self {
        Multiplier(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Multiplier {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Multiplier {}

impl Hash for Multiplier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Bollinger { period: usize, mult: Multiplier },
    Macd { fast: usize, slow: usize, signal: usize },
}

impl IndicatorKind {
    pub fn bollinger(period: usize, mult: f64) -> Self {
        IndicatorKind::Bollinger {
            period,
            mult: Multiplier::new(mult),
        }
    }

    pub fn panel(&self) -> Panel {
        match self {
            IndicatorKind::Sma(_) | IndicatorKind::Ema(_) | IndicatorKind::Bollinger { .. } => {
                Panel::Price
            }
            IndicatorKind::Rsi(_) => Panel::Rsi,
            IndicatorKind::Macd { .. } => Panel::Macd,
        }
    }

    /// Shortest close vector that yields at least one output value.
    /// Saturates at `usize::MAX`, which no window can satisfy.
    pub fn min_points(&self) -> usize {
        match *self {
            IndicatorKind::Sma(period) | IndicatorKind::Ema(period) => period,
            IndicatorKind::Rsi(period) => period.saturating_add(1),
            IndicatorKind::Bollinger { period, .. } => period,
            IndicatorKind::Macd { slow, signal, .. } => slow.saturating_add(signal),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(period) => write!(f, "SMA-{}", period),
            IndicatorKind::Ema(period) => write!(f, "EMA-{}", period),
            IndicatorKind::Rsi(period) => write!(f, "RSI-{}", period),
            IndicatorKind::Bollinger { period, mult } => write!(f, "BB-{}-{}", period, mult),
            IndicatorKind::Macd { fast, slow, signal } => {
                write!(f, "MACD-{}-{}-{}", fast, slow, signal)
            }
        }
    }
}

/// Why an indicator tag could not be turned into an [`IndicatorKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("unknown indicator kind '{0}'")]
    UnknownKind(String),

    #[error("missing {0} parameter")]
    MissingParameter(&'static str),

    #[error("invalid {name} parameter '{value}'")]
    InvalidParameter { name: &'static str, value: String },
}

impl FromStr for IndicatorKind {
    type Err = TagError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = tag.trim().split('-').map(str::trim).collect();
        let kind = parts[0].to_uppercase();
        let param = |idx: usize| parts.get(idx).copied().filter(|s| !s.is_empty());

        match kind.as_str() {
            "SMA" | "EMA" | "RSI" => {
                let period = match param(1) {
                    Some(raw) => parse_period("period", raw)?,
                    None => return Err(TagError::MissingParameter("period")),
                };
                Ok(match kind.as_str() {
                    "SMA" => IndicatorKind::Sma(period),
                    "EMA" => IndicatorKind::Ema(period),
                    _ => IndicatorKind::Rsi(period),
                })
            }
            "BB" | "BBANDS" => {
                let period = param(1)
                    .map(|raw| parse_period("period", raw))
                    .transpose()?
                    .unwrap_or(bollinger::DEFAULT_PERIOD);
                let mult = param(2)
                    .map(parse_multiplier)
                    .transpose()?
                    .unwrap_or(bollinger::DEFAULT_MULTIPLIER);
                Ok(IndicatorKind::bollinger(period, mult))
            }
            "MACD" => {
                let fast = param(1)
                    .map(|raw| parse_period("fast", raw))
                    .transpose()?
                    .unwrap_or(macd::DEFAULT_FAST);
                let slow = param(2)
                    .map(|raw| parse_period("slow", raw))
                    .transpose()?
                    .unwrap_or(macd::DEFAULT_SLOW);
                let signal = param(3)
                    .map(|raw| parse_period("signal", raw))
                    .transpose()?
                    .unwrap_or(macd::DEFAULT_SIGNAL);
                Ok(IndicatorKind::Macd { fast, slow, signal })
            }
            _ => Err(TagError::UnknownKind(parts[0].to_string())),
        }
    }
}

fn parse_period(name: &'static str, raw: &str) -> Result<usize, TagError> {
    match raw.parse::<usize>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(TagError::InvalidParameter {
            name,
            value: raw.to_string(),
        }),
    }
}

fn parse_multiplier(raw: &str) -> Result<f64, TagError> {
    match raw.parse::<f64>() {
        Ok(m) if m.is_finite() && m >= 0.0 => Ok(m),
        _ => Err(TagError::InvalidParameter {
            name: "multiplier",
            value: raw.to_string(),
        }),
    }
}

/// The indicator choices the dashboard offers, in display order.
pub fn standard_options() -> Vec<(&'static str, IndicatorKind)> {
    vec![
        ("SMA 20", IndicatorKind::Sma(20)),
        ("SMA 50", IndicatorKind::Sma(50)),
        ("EMA 20", IndicatorKind::Ema(20)),
        ("EMA 50", IndicatorKind::Ema(50)),
        ("RSI 14", IndicatorKind::Rsi(14)),
        ("BB 20/2", IndicatorKind::bollinger(20, 2.0)),
        (
            "MACD 12-26-9",
            IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Line { value: f64 },
    Macd { macd: f64, signal: f64, hist: f64 },
}

/// One timestamped output value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub time: NaiveDate,
    #[serde(flatten)]
    pub value: IndicatorValue,
}

/// A named, chart-ready indicator series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: String,
    #[serde(skip)]
    pub kind: IndicatorKind,
    #[serde(rename = "data")]
    pub points: Vec<IndicatorPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_dashboard_tags() {
        assert_eq!(IndicatorKind::Sma(20).to_string(), "SMA-20");
        assert_eq!(IndicatorKind::Ema(50).to_string(), "EMA-50");
        assert_eq!(IndicatorKind::Rsi(14).to_string(), "RSI-14");
        assert_eq!(IndicatorKind::bollinger(20, 2.0).to_string(), "BB-20-2");
        assert_eq!(IndicatorKind::bollinger(20, 2.5).to_string(), "BB-20-2.5");
        let macd = IndicatorKind::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD-12-26-9");
    }

    #[test]
    fn parse_round_trips_standard_options() {
        for (_, kind) in standard_options() {
            let parsed: IndicatorKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("sma-20".parse(), Ok(IndicatorKind::Sma(20)));
        assert_eq!(" Ema-9 ".parse(), Ok(IndicatorKind::Ema(9)));
    }

    #[test]
    fn parse_bollinger_defaults_and_alias() {
        assert_eq!("BB".parse(), Ok(IndicatorKind::bollinger(20, 2.0)));
        assert_eq!("BBANDS-10".parse(), Ok(IndicatorKind::bollinger(10, 2.0)));
        assert_eq!("BB-10-1.5".parse(), Ok(IndicatorKind::bollinger(10, 1.5)));
    }

    #[test]
    fn parse_macd_defaults() {
        assert_eq!(
            "MACD".parse(),
            Ok(IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            })
        );
        assert_eq!(
            "MACD-5".parse(),
            Ok(IndicatorKind::Macd {
                fast: 5,
                slow: 26,
                signal: 9
            })
        );
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert_eq!(
            "VWAP-20".parse::<IndicatorKind>(),
            Err(TagError::UnknownKind("VWAP".into()))
        );
        assert_eq!(
            "".parse::<IndicatorKind>(),
            Err(TagError::UnknownKind("".into()))
        );
    }

    #[test]
    fn parse_rejects_missing_or_bad_period() {
        assert_eq!(
            "SMA".parse::<IndicatorKind>(),
            Err(TagError::MissingParameter("period"))
        );
        assert!(matches!(
            "SMA-0".parse::<IndicatorKind>(),
            Err(TagError::InvalidParameter { name: "period", .. })
        ));
        assert!(matches!(
            "RSI-abc".parse::<IndicatorKind>(),
            Err(TagError::InvalidParameter { name: "period", .. })
        ));
        assert!(matches!(
            "BB-20-x".parse::<IndicatorKind>(),
            Err(TagError::InvalidParameter {
                name: "multiplier",
                ..
            })
        ));
        assert!(matches!(
            "MACD-12-slow".parse::<IndicatorKind>(),
            Err(TagError::InvalidParameter { name: "slow", .. })
        ));
    }

    #[test]
    fn panels() {
        assert_eq!(IndicatorKind::Sma(20).panel(), Panel::Price);
        assert_eq!(IndicatorKind::bollinger(20, 2.0).panel(), Panel::Price);
        assert_eq!(IndicatorKind::Rsi(14).panel(), Panel::Rsi);
        assert_eq!(
            IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
            .panel(),
            Panel::Macd
        );
    }

    #[test]
    fn min_points_matches_warmup() {
        assert_eq!(IndicatorKind::Sma(20).min_points(), 20);
        assert_eq!(IndicatorKind::Rsi(14).min_points(), 15);
        assert_eq!(
            IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
            .min_points(),
            35
        );
    }

    #[test]
    fn min_points_saturates_on_huge_periods() {
        assert_eq!(IndicatorKind::Rsi(usize::MAX).min_points(), usize::MAX);
        assert_eq!(
            IndicatorKind::Macd {
                fast: 12,
                slow: usize::MAX,
                signal: 9
            }
            .min_points(),
            usize::MAX
        );
    }

    #[test]
    fn bollinger_multiplier_is_kept_exactly() {
        let kind: IndicatorKind = "BB-20-2.125".parse().unwrap();
        assert_eq!(kind.to_string(), "BB-20-2.125");
        assert_eq!(kind, IndicatorKind::bollinger(20, 2.125));
        assert_ne!(kind, IndicatorKind::bollinger(20, 2.13));

        let wide: IndicatorKind = "BB-20-1e12".parse().unwrap();
        assert_eq!(wide.to_string(), "BB-20-1000000000000");
        assert_eq!(wide.to_string().parse::<IndicatorKind>(), Ok(wide));

        assert_eq!(IndicatorKind::bollinger(20, -0.0), IndicatorKind::bollinger(20, 0.0));
    }

    #[test]
    fn kind_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorKind::Sma(20), "sma20");
        map.insert(IndicatorKind::bollinger(20, 2.0), "bb");
        assert_eq!(map.get(&IndicatorKind::Sma(20)), Some(&"sma20"));
        assert_eq!(map.get(&"BB-20-2".parse().unwrap()), Some(&"bb"));
        assert_eq!(map.get(&IndicatorKind::Sma(50)), None);
    }

    #[test]
    fn point_serializes_flat() {
        let line = IndicatorPoint {
            time: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            value: IndicatorValue::Line { value: 1.5 },
        };
        assert_eq!(
            serde_json::to_string(&line).unwrap(),
            r#"{"time":"2024-01-02","value":1.5}"#
        );

        let macd = IndicatorPoint {
            time: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            value: IndicatorValue::Macd {
                macd: 1.0,
                signal: 0.5,
                hist: 0.5,
            },
        };
        assert_eq!(
            serde_json::to_string(&macd).unwrap(),
            r#"{"time":"2024-01-02","macd":1.0,"signal":0.5,"hist":0.5}"#
        );
    }
}
