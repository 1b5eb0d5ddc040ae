//! Component management for the simulation.
//!
//! Components are plain values addressed only by their type. Each simulation owns a
//! [`Registry`] that assigns every Rust component type a small dense [`Id`] the first time it is
//! seen. A [`Shape`] is a canonical set of those ids and is the key that partitions storage.
//!
//! ## Usage
//!
//! ```ignore
//! use strata_engine::ecs::component::{Component, Registry};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let registry = Registry::new();
//! let pos_id = registry.register::<Position>();
//! ```

use std::{any::TypeId as StdTypeId, fmt, hash::Hash};

mod registry;
mod set;
mod shape;

pub use registry::Registry;
pub use set::{BoxedSet, BoxedValue, Set, Target};
pub use shape::{IntoShape, Shape};

use crate::ecs::storage::Column;

/// A component identifier, dense and assigned in registration order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<usize> for Id {
    #[inline]
    fn from(value: usize) -> Self {
        Self::new(value as u32)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A trait representing a component in the simulation.
///
/// At present this only sets the required trait bounds for a type to be used as a component.
/// Use `#[derive(Component)]` to implement it.
pub trait Component: 'static + Sized + Send + Sync {}

/// Metadata about a registered component type.
#[derive(Debug, Clone, Copy)]
pub struct Info {
    /// The component id.
    id: Id,

    /// The Rust TypeId for runtime type checking.
    type_id: StdTypeId,

    /// The Rust type name, for diagnostics.
    name: &'static str,

    /// Builds an empty, typed column for this component.
    column: fn(Info, usize) -> Column,
}

impl Info {
    /// Construct Info for component type `C`.
    pub(crate) fn new<C: Component>(id: Id) -> Self {
        Self {
            id,
            type_id: StdTypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            column: Column::new::<C>,
        }
    }

    /// Get the component id.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the Rust TypeId.
    #[inline]
    pub fn type_id(&self) -> StdTypeId {
        self.type_id
    }

    /// Get the Rust type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Determine if this info describes component type `C`.
    #[inline]
    pub fn is<C: Component>(&self) -> bool {
        self.type_id == StdTypeId::of::<C>()
    }

    /// Create an empty column for this component with room for `capacity` rows.
    #[inline]
    pub(crate) fn new_column(&self, capacity: usize) -> Column {
        (self.column)(*self, capacity)
    }
}
