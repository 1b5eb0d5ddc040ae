//! Strata engine: a shape-partitioned entity component system.
//!
//! Entities are stored in tables keyed by the exact set of component types they carry. Queries
//! select whole tables by a superset test, systems run once per tick with explicitly named
//! inputs, and every structural change is recorded so later systems can react to deltas.
//!
//! See [`ecs::Simulation`] for the entry point.

// Lets `#[derive(Component)]` expand to `::strata_engine::...` inside this crate too.
extern crate self as strata_engine;

pub mod ecs;
