//! Query API for iterating entities and their components across tables.
//!
//! The query system is built on three main concepts:
//!
//! - **[Parameter]**: Individual query elements, `&Component` or `&mut Component`.
//!
//! - **[Data]**: Complete query specifications composed of one or more parameters. Tuples of
//!   parameters automatically implement `Data`, allowing queries like `(&Position, &mut
//!   Velocity)`.
//!
//! - **[Result]**: The iterator returned by invoking a query. It yields an [`entity::Ref`] for
//!   each matching entity together with the requested data.
//!
//! A table matches a query when its shape contains every component the query names. Other
//! components the entity has do not matter, and there are no optional or negated terms.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strata_engine::ecs::{Component, Simulation};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Component)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let mut sim = Simulation::new();
//!
//! // Build once, run every tick
//! let query = sim.query::<(&mut Position, &Velocity)>()?;
//!
//! for (_entity, (pos, vel)) in query.invoke(&mut sim) {
//!     pos.x += vel.dx;
//!     pos.y += vel.dy;
//! }
//! ```
//!
//! # Validation
//!
//! Requesting the same component more than once, e.g. `(&Foo, &mut Foo)`, is rejected with
//! [`Error::Configuration`] when the query is built.
//!
//! [Parameter]: param::Parameter
//! [Data]: data::Data
//! [Result]: result::Result
//! [`entity::Ref`]: crate::ecs::entity::Ref
//! [`Error::Configuration`]: crate::ecs::Error::Configuration

use std::marker::PhantomData;

use crate::ecs::{Simulation, component, error, query::data::DataSpec};

mod data;
mod param;
mod result;

pub use data::{Columns, Data};
pub use param::{Parameter, ParameterSpec};
pub use result::Result;

/// A reusable query for accessing entities and components across tables.
///
/// `Query<D>` is parameterized by a [`Data`] type that specifies which components are accessed
/// and how. The specification is computed and validated once, at construction.
///
/// A query is bound to the component ids of the simulation whose registry built it; invoke it
/// only on that simulation.
pub struct Query<D> {
    /// The specification describing what data this query accesses.
    data_spec: DataSpec,

    /// Phantom data to tie the Data type to the struct.
    phantom: PhantomData<D>,
}

impl<D: Data> Query<D> {
    /// Construct a new query for the given data type, registering its component types.
    ///
    /// # Errors
    /// [`Error::Configuration`](crate::ecs::Error::Configuration) if a component is requested
    /// more than once.
    pub fn new(components: &component::Registry) -> error::Result<Self> {
        let data_spec = D::spec(components);
        data_spec.validate(components)?;
        Ok(Self {
            data_spec,
            phantom: PhantomData,
        })
    }

    /// Get the specification of this query.
    #[inline]
    pub fn spec(&self) -> &DataSpec {
        &self.data_spec
    }

    /// Execute the query and return an iterator over matching entities.
    ///
    /// The iterator borrows the simulation mutably until it is dropped, so no entity can be
    /// created, removed or reshaped mid-iteration. Record such changes on
    /// [`Commands`](crate::ecs::Commands) instead.
    pub fn invoke<'w>(&self, sim: &'w mut Simulation) -> Result<'w, D> {
        Result::new(sim.storage_mut(), self.data_spec.clone())
    }
}
