//! Workloads that exercise the whole tick: systems, queries, commands and pruning together.

pub mod particles;

pub use particles::{ParticleConfig, ParticleScenario};

/// A benchmark workload driven one tick at a time.
pub trait Scenario {
    /// Short identifier used in reports.
    fn name(&self) -> &'static str;

    /// One line about what the workload stresses.
    fn description(&self) -> &'static str;

    /// How many entities the workload keeps alive.
    fn entity_count(&self) -> usize;

    /// Create the initial entities and register the systems.
    fn setup(&mut self);

    /// Advance by one tick.
    fn update(&mut self);

    /// Remove everything `setup` created.
    fn teardown(&mut self);
}
