#![forbid(unsafe_code)]

//! Core domain model and business logic for the minmin sleep diary.
//!
//! This crate provides:
//! - Domain types (calendar days, sleep/condition/diary records)
//! - The date-keyed record store and its range queries
//! - The validating tracker (one record per kind per day, last write wins)
//! - Derived metrics (diary streak, sleep recommendation)
//! - Persistence (JSON snapshot, CSV export)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod validate;
pub mod store;
pub mod query;
pub mod streak;
pub mod recommend;
pub mod snapshot;
pub mod export;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result, ValidationError};
pub use types::*;
pub use config::{Config, RecommendationConfig};
pub use store::{DayMap, RecordStore, UpsertOutcome};
pub use query::trailing_window;
pub use streak::continuous_diary_days;
pub use recommend::{suggest_optimal_sleep_time, RecommendationTier, SleepRecommendation};
pub use snapshot::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore, StoreLock};
pub use export::export_csv;
pub use tracker::{ImportSummary, Recorded, Tracker};
