//! Core library for the caliper body-composition tracker.
//!
//! Everything here is UI-agnostic: entry models and their derived-value
//! rules, the circumference-based body-fat estimator, the time-range trend
//! aggregator, and the SQLite persistence layer behind them.

pub mod bodyfat;
pub mod db;
pub mod export;
pub mod models;
pub mod service;
pub mod trend;
pub mod units;
