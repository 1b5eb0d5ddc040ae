//! Systems: named units of per-tick logic.
//!
//! # Overview
//!
//! A [`System`] is a named closure run once per tick. It receives a [`Context`] giving it the
//! simulation, the values returned by systems that ran earlier in the same tick, and a deferred
//! [`Commands`] queue:
//!
//! ```rust,ignore
//! use strata_engine::ecs::{Component, Simulation, System};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Component)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! struct Timing { delta: f32 }
//!
//! let mut sim = Simulation::new();
//!
//! sim.add_system(System::new("timing", |_ctx| Ok(Timing { delta: 0.016 })))?;
//!
//! sim.add_system(
//!     System::new("movement", |ctx| {
//!         let timing = ctx.input::<Timing>("timing")?;
//!         for (_entity, (pos, vel)) in ctx.sim().execute::<(&mut Position, &Velocity)>()? {
//!             pos.x += vel.dx * timing.delta;
//!             pos.y += vel.dy * timing.delta;
//!         }
//!         Ok(())
//!     })
//!     .depends_on(["timing"]),
//! )?;
//!
//! sim.tick()?;
//! ```
//!
//! # Dependencies
//!
//! Dependencies are declared by name. Systems run in registration order, and a system whose
//! declared dependency has not produced a value earlier in the tick fails the tick with
//! [`Error::UnresolvedDependency`](crate::ecs::Error::UnresolvedDependency). The name `sim` is
//! reserved: it is always satisfied and refers to the simulation itself, reached through
//! [`Context::sim`].
//!
//! # Structural Changes While Iterating
//!
//! A query borrows the simulation until it is dropped, so entities cannot be created, removed or
//! reshaped mid-iteration. Take a [`Commands`] handle before iterating and record the change
//! there; the scheduler applies queued commands in order as soon as the system returns.

use std::{any::Any, fmt};

use crate::ecs::error::Result;

mod command;
mod context;
mod registry;

pub use command::{Command, CommandBuffer, Commands};
pub use context::{Context, Results};
pub use registry::Registry;

/// The reserved dependency name that refers to the simulation itself.
pub const SIM: &str = "sim";

/// The type-erased value a system produced.
pub type Output = Box<dyn Any + Send>;

type Run = Box<dyn FnMut(&mut Context<'_>) -> Result<Output> + Send>;

/// System identifier, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new system ID from a raw value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index for this ID.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A named unit of per-tick logic with declared input dependencies.
pub struct System {
    /// Unique name; later systems read this system's value under it.
    name: String,

    /// Names of systems whose values this system reads.
    dependencies: Vec<String>,

    /// The type-erased closure.
    run: Run,
}

impl System {
    /// Create a system named `name` running `func` every tick.
    ///
    /// The value `func` returns is stored under `name` for systems later in the same tick. Return
    /// `Ok(())` when there is nothing to share.
    pub fn new<T, F>(name: impl Into<String>, mut func: F) -> Self
    where
        T: Any + Send,
        F: FnMut(&mut Context<'_>) -> Result<T> + Send + 'static,
    {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            run: Box::new(move |ctx| func(ctx).map(|value| Box::new(value) as Output)),
        }
    }

    /// Declare the systems whose values this system reads.
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    /// Get the system name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the declared dependencies.
    #[inline]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Find the first declared dependency without a value in `results`.
    pub(crate) fn unresolved(&self, results: &Results) -> Option<&str> {
        self.dependencies
            .iter()
            .map(String::as_str)
            .find(|dependency| !results.contains(dependency))
    }

    /// Run the system once.
    pub(crate) fn run(&mut self, ctx: &mut Context<'_>) -> Result<Output> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
