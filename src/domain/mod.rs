//! Core domain types and logic.

pub mod cache;
pub mod config_validation;
pub mod dashboard;
pub mod error;
pub mod indicator;
pub mod pipeline;
pub mod price;
pub mod selection;
pub mod timeframe;
