#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Rangos rank engine – counts, for every query point, the reference points
//! lying strictly below it, with a brute-force and a sorted strategy.

/// Points, point sets and text parsing.
pub mod point;

/// Error taxonomy for guarded computations.
pub mod error;

/// Strategy selection.
pub mod strategy;

/// Pure rank computations.
pub mod ranks;

/// Seeded random point sets.
pub mod generator;

/// TOML configuration.
pub mod config;

/// A/B session state used by interactive callers.
pub mod workbench;

/// Telemetry for the rank engine.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Runtime entry wrapping the strategies with validation and logging.
#[path = "../main.rs"]
pub mod runtime;

/// Interactive console menu.
#[path = "../console.rs"]
pub mod console;

pub use config::{EngineConfig, LoggingConfig};
pub use console::{Console, MenuChoice};
pub use error::RankError;
pub use generator::PointGenerator;
pub use point::{parse_point, parse_point_list, FormatError, Point, PointSet, SetRole};
pub use ranks::{
    compute_ranks, compute_ranks_brute_force, compute_ranks_sorted, RankResult, SortedReference,
};
pub use runtime::{RankReport, RankRuntime, RankRuntimeBuilder, RankedPoint, StrategyComparison};
pub use strategy::RankStrategy;
pub use telemetry::{RankTelemetry, RankTelemetryBuilder};
pub use workbench::{example_pair, render_results, Workbench};
