//! Benchmark utilities for the Strata engine.
//!
//! - **Microbenchmarks**: individual simulation operations (create, query, migrate, remove, tick)
//! - **Scenario benchmarks**: a particle workload driven entirely by systems and commands
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p strata_bench
//!
//! # Run specific benchmark group
//! cargo bench -p strata_bench -- create
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;
pub mod scenarios;
