//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: the first (period-1) closes produce no output.

use crate::domain::indicator::calculate_sma;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Three aligned bands of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

pub fn calculate_bollinger(values: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    if period == 0 || values.len() < period {
        return BollingerBands::default();
    }

    let middle = calculate_sma(values, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (window, &mean) in values.windows(period).zip(&middle) {
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let sd = variance.sqrt();

        upper.push(mean + multiplier * sd);
        lower.push(mean - multiplier * sd);
    }

    BollingerBands {
        middle,
        upper,
        lower,
    }
}

pub fn calculate_bollinger_default(values: &[f64]) -> BollingerBands {
    calculate_bollinger(values, DEFAULT_PERIOD, DEFAULT_MULTIPLIER)
}
