//! Error types for simulation operations.
//!
//! Every failure is raised synchronously at the call that violates a contract and propagated with
//! `?`. Nothing in the engine retries or swallows an error; the scheduler logs a failing system
//! and aborts the tick.

use thiserror::Error;

use crate::ecs::entity::Entity;

/// Convenience alias used throughout the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised by the simulation core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The operation targets an entity with no live row in any table.
    #[error("no such entity {0}")]
    EntityNotFound(Entity),

    /// A system declared an input that no earlier system produced this tick.
    #[error("system '{system}' depends on '{dependency}', which has no producer earlier in the tick")]
    UnresolvedDependency {
        /// The system that could not be invoked.
        system: String,
        /// The missing input name.
        dependency: String,
    },

    /// A system read an input as a different type than its producer returned.
    #[error("system '{system}' read '{dependency}' as {expected}, but the producer returned another type")]
    DependencyType {
        /// The system reading the input.
        system: String,
        /// The input name.
        dependency: String,
        /// The type name the reader asked for.
        expected: &'static str,
    },

    /// A malformed query or system registration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
