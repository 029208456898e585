//! # Meterspread Core Library
//!
//! This library provides the core logic for Meterspread, which turns two meter
//! readings into a plausible hour-by-hour usage breakdown. It follows a
//! CLI-first layout: every operation is available through the standalone
//! `meterspread-cli` binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Distribution Engine**: a staged pipeline (weight policy, raw
//!   generation, ceiling clamp, smoothing, exact-sum reconciliation, result
//!   assembly) whose output always sums exactly to the meter delta
//! - **Adaptive Memory**: per-hour running averages of past shares that bias
//!   future runs, persisted through a key-value store
//! - **Storage**: SQLite key-value persistence and TOML-based configuration
//! - **Report**: summary statistics, tables and ASCII charts
//!
//! ## Key Components
//!
//! - [`UsageDistributor`]: the distribution engine
//! - [`WeightMemory`]: trait for learned per-hour bias
//! - [`Database`]: key-value persistence
//! - [`Config`]: application configuration management

pub mod distribution;
pub mod error;
pub mod memory;
pub mod report;
pub mod storage;

pub use distribution::{
    distribute, DistributionRequest, EngineConfig, PeriodResult, Trend, UsageDistributor,
    UsageProfile, UsageStatus,
};
pub use error::{ConfigError, CoreError, DatabaseError, DistributionError, MemoryError};
pub use memory::{HourlyMemory, KvWeightMemory, NoMemory, WeightMemory};
pub use report::{format_number, DistributionSummary};
pub use storage::{Config, Database, KvStore};
