//! RSI (Relative Strength Index) using Wilder's smoothing.
//!
//! - First average: simple mean of the first n gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss)).
//! A zero avg_loss is replaced by [`ZERO_LOSS_EPSILON`], so an all-gain
//! window saturates just below 100 rather than dividing by zero.
//!
//! Warmup: the first n closes produce no output (n price changes are needed).

pub const DEFAULT_PERIOD: usize = 14;
pub const ZERO_LOSS_EPSILON: f64 = 1e-9;

pub fn calculate_rsi(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() <= period {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() - period);
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (step, pair) in values.windows(2).enumerate() {
        let change = pair[1] - pair[0];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if step < period {
            avg_gain += gain;
            avg_loss += loss;
            if step + 1 < period {
                continue;
            }
            avg_gain /= period as f64;
            avg_loss /= period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        out.push(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

pub fn calculate_rsi_default(values: &[f64]) -> Vec<f64> {
    calculate_rsi(values, DEFAULT_PERIOD)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let denom = if avg_loss == 0.0 {
        ZERO_LOSS_EPSILON
    } else {
        avg_loss
    };
    100.0 - 100.0 / (1.0 + avg_gain / denom)
}
