//! Daily price point representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of a symbol's history, as delivered by the price provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Sort ascending by date and drop repeated days, keeping the last record for a day.
pub fn normalize_history(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    points.sort_by_key(|p| p.time);
    let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match out.last_mut() {
            Some(last) if last.time == point.time => *last = point,
            _ => out.push(point),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, open: f64, close: f64) -> PricePoint {
        PricePoint {
            time: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn normalize_sorts_and_dedups() {
        let points = vec![
            point("2024-01-17", 1.0, 3.0),
            point("2024-01-15", 1.0, 1.0),
            point("2024-01-16", 1.0, 2.0),
            point("2024-01-16", 1.0, 2.5),
        ];
        let out = normalize_history(points);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].close, 1.0);
        assert_eq!(out[1].close, 2.5);
        assert_eq!(out[2].close, 3.0);
    }

    #[test]
    fn deserializes_provider_payload() {
        let json = r#"{"time":"2024-03-01","open":10.5,"high":11,"low":10,"close":10.75,"volume":123456}"#;
        let p: PricePoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.time, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(p.close, 10.75);
        assert_eq!(p.volume, 123_456.0);
    }
}
