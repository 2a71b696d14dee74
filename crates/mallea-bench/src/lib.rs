//! # mallea-bench
//!
//! Benchmark suite for the Mallea warp engine.
//!
//! Provides four scripted editing scenarios, a runner that drives a
//! [`mallea_solver::WarpSession`] through them, and CSV export of the
//! collected metrics for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::{pin_error, BenchmarkRunner};
pub use scenarios::{PinMotion, Scenario, ScenarioKind, ScriptedPin};
