//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! The two EMAs have different warm-ups, so the longer one is trimmed from
//! the front before subtracting; likewise the MACD line is trimmed to the
//! signal line's length. All three outputs end on the last input close.
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Requires at least slow + signal closes.

use crate::domain::indicator::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// MACD line, signal line and histogram, all of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

impl MacdLines {
    pub fn len(&self) -> usize {
        self.macd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }
}

pub fn calculate_macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdLines {
    if fast == 0
        || slow == 0
        || signal_period == 0
        || values.len() < slow.saturating_add(signal_period)
    {
        return MacdLines::default();
    }

    let ema_fast = calculate_ema(values, fast);
    let ema_slow = calculate_ema(values, slow);

    let macd_line: Vec<f64> = tail(&ema_fast, ema_slow.len())
        .iter()
        .zip(tail(&ema_slow, ema_fast.len()))
        .map(|(f, s)| f - s)
        .collect();

    let signal = calculate_ema(&macd_line, signal_period);
    let macd = tail(&macd_line, signal.len()).to_vec();
    let hist = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdLines { macd, signal, hist }
}

pub fn calculate_macd_default(values: &[f64]) -> MacdLines {
    calculate_macd(values, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// Last `n` elements of `values` (all of them if shorter).
fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}
