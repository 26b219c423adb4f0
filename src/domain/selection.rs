//! User selection state: which indicators are shown and over what timeframe.
//!
//! Tags are kept as the user entered them so the selection survives a
//! round-trip through storage unchanged; they are parsed into
//! [`IndicatorKind`] once, via [`Selection::resolve`], before any computation.

use crate::domain::indicator::IndicatorKind;
use crate::domain::timeframe::Timeframe;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub indicators: Vec<String>,
    pub timeframe: Timeframe,
}

/// Parsed selection: the kinds to compute, in selection order, plus the
/// tags that could not be parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSelection {
    pub kinds: Vec<IndicatorKind>,
    pub skipped: Vec<String>,
}

impl Selection {
    pub fn new<I, S>(indicators: I, timeframe: Timeframe) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Selection {
            indicators: Vec::new(),
            timeframe,
        };
        selection.set_indicators(indicators);
        selection
    }

    /// Replace the indicator list, dropping blanks and repeats but keeping order.
    pub fn set_indicators<I, S>(&mut self, indicators: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indicators.clear();
        for tag in indicators {
            let tag = tag.into().trim().to_string();
            if !tag.is_empty() && !self.indicators.contains(&tag) {
                self.indicators.push(tag);
            }
        }
    }

    /// Checkbox behaviour: add the tag if absent, remove it if present.
    /// Returns whether the tag is selected afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        if let Some(pos) = self.indicators.iter().position(|t| t == tag) {
            self.indicators.remove(pos);
            false
        } else {
            self.indicators.push(tag.to_string());
            true
        }
    }

    pub fn resolve(&self) -> ResolvedSelection {
        resolve_tags(&self.indicators)
    }
}

/// Parse indicator tags, skipping malformed ones and collapsing tags that name
/// the same indicator (`"sma-20"` and `"SMA-20"`).
pub fn resolve_tags<S: AsRef<str>>(tags: &[S]) -> ResolvedSelection {
    let mut resolved = ResolvedSelection::default();
    for tag in tags {
        let tag = tag.as_ref();
        match tag.parse::<IndicatorKind>() {
            Ok(kind) => {
                if !resolved.kinds.contains(&kind) {
                    resolved.kinds.push(kind);
                }
            }
            Err(e) => {
                log::warn!("skipping indicator '{}': {}", tag, e);
                resolved.skipped.push(tag.to_string());
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_order_and_dedups() {
        let s = Selection::new(["EMA-50", "SMA-20", "EMA-50", " "], Timeframe::OneYear);
        assert_eq!(s.indicators, vec!["EMA-50", "SMA-20"]);
        assert_eq!(s.timeframe, Timeframe::OneYear);
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut s = Selection::default();
        assert!(s.toggle("RSI-14"));
        assert!(s.toggle("SMA-20"));
        assert!(!s.toggle("RSI-14"));
        assert_eq!(s.indicators, vec!["SMA-20"]);
    }

    #[test]
    fn toggle_ignores_blank_tags() {
        let mut s = Selection::new(["SMA-20"], Timeframe::All);
        assert!(!s.toggle(""));
        assert!(!s.toggle("   "));
        assert_eq!(s.indicators, vec!["SMA-20"]);
        assert!(s.resolve().skipped.is_empty());
    }

    #[test]
    fn resolve_skips_malformed_tags() {
        let s = Selection::new(["SMA-20", "FOO-3", "RSI-x", "MACD-12-26-9"], Timeframe::All);
        let r = s.resolve();
        assert_eq!(
            r.kinds,
            vec![
                IndicatorKind::Sma(20),
                IndicatorKind::Macd {
                    fast: 12,
                    slow: 26,
                    signal: 9
                }
            ]
        );
        assert_eq!(r.skipped, vec!["FOO-3", "RSI-x"]);
    }

    #[test]
    fn resolve_collapses_equivalent_tags() {
        let r = resolve_tags(&["sma-20", "SMA-20", "BB", "BB-20-2"]);
        assert_eq!(
            r.kinds,
            vec![IndicatorKind::Sma(20), IndicatorKind::bollinger(20, 2.0)]
        );
        assert!(r.skipped.is_empty());
    }

    #[test]
    fn json_round_trip() {
        let s = Selection::new(["SMA-20", "BB-20-2"], Timeframe::ThreeMonths);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"indicators":["SMA-20","BB-20-2"],"timeframe":"3M"}"#);
        let back: Selection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: Selection = serde_json::from_str(r#"{"indicators":["RSI-14"]}"#).unwrap();
        assert_eq!(s.timeframe, Timeframe::SixMonths);
        let s: Selection = serde_json::from_str("{}").unwrap();
        assert!(s.indicators.is_empty());
    }
}
