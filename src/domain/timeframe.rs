//! Chart timeframe selection.
//!
//! Months are approximated as 21 trading days.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TRADING_DAYS_PER_MONTH: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "3M")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl Timeframe {
    pub const ALL_VARIANTS: [Timeframe; 4] = [
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::OneYear,
        Timeframe::All,
    ];

    /// Number of most recent trading days shown, `None` for unbounded.
    pub fn trading_days(&self) -> Option<usize> {
        match self {
            Timeframe::ThreeMonths => Some(3 * TRADING_DAYS_PER_MONTH),
            Timeframe::SixMonths => Some(6 * TRADING_DAYS_PER_MONTH),
            Timeframe::OneYear => Some(12 * TRADING_DAYS_PER_MONTH),
            Timeframe::All => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::ThreeMonths => "3M",
            Timeframe::SixMonths => "6M",
            Timeframe::OneYear => "1Y",
            Timeframe::All => "ALL",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "3M" => Ok(Timeframe::ThreeMonths),
            "6M" => Ok(Timeframe::SixMonths),
            "1Y" | "12M" => Ok(Timeframe::OneYear),
            "ALL" => Ok(Timeframe::All),
            other => Err(format!(
                "unknown timeframe '{}', expected one of 3M, 6M, 1Y, ALL",
                other
            )),
        }
    }
}
