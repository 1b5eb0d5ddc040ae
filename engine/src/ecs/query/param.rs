//! Query parameter types and specifications.
//!
//! This module defines the [`Parameter`] trait and [`ParameterSpec`], which represent individual
//! elements that can be used in queries.
//!
//! # Parameter vs Data
//!
//! - **Parameter**: A single query element (`&Component` or `&mut Component`)
//! - **Data**: A complete query composed of one or more parameters (e.g. `(&C1, &mut C2)`)
//!
//! Any type implementing `Parameter` automatically implements `Data` for single-element queries.
//! Tuples of `Parameter` types implement `Data` for multi-element queries.

use std::slice;

use crate::ecs::{
    component::{self, Component},
    query::data::Columns,
};

/// A single query parameter that can be fetched from a table.
///
/// | Type | Description | Mutability |
/// |------|-------------|------------|
/// | `&C` | Immutable component reference | No |
/// | `&mut C` | Mutable component reference | Yes |
///
/// Fetching happens in two steps. [`Parameter::fetch`] claims the parameter's column from a
/// table once, producing a cursor over the column's slots. [`Parameter::next`] then advances
/// that cursor by exactly one row, yielding `None` for tombstoned slots.
pub trait Parameter: Sized {
    /// The value type yielded per row.
    ///
    /// - `&C` → `&'w C`
    /// - `&mut C` → `&'w mut C`
    type Value<'w>;

    /// The per-table cursor over this parameter's column.
    type Fetch<'w>;

    /// Get the query parameter specification for this type. The component registry is provided
    /// to allow a parameter type to lookup or register component information.
    fn spec(components: &component::Registry) -> ParameterSpec;

    /// Claim this parameter's column from a table's columns.
    ///
    /// # Panics
    /// Panics if the table does not hold the component, which cannot happen for tables selected
    /// by the query's required shape.
    fn fetch<'w>(columns: &mut Columns<'w>) -> Self::Fetch<'w>;

    /// Advance the cursor one row.
    fn next<'w>(fetch: &mut Self::Fetch<'w>) -> Option<Self::Value<'w>>;
}

/// Specification for a single query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterSpec {
    /// The component this parameter reads.
    id: component::Id,

    /// Whether the parameter needs exclusive access.
    mutable: bool,
}

impl ParameterSpec {
    /// Construct a parameter spec for component `id`.
    #[inline]
    pub const fn new(id: component::Id, mutable: bool) -> Self {
        Self { id, mutable }
    }

    /// The component id.
    #[inline]
    pub fn id(&self) -> component::Id {
        self.id
    }

    /// Whether the component is accessed mutably.
    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }
}

/// Parameter implementation for immutable component references.
impl<C: Component> Parameter for &C {
    type Value<'w> = &'w C;
    type Fetch<'w> = slice::Iter<'w, Option<C>>;

    #[inline]
    fn spec(components: &component::Registry) -> ParameterSpec {
        ParameterSpec::new(components.register::<C>(), false)
    }

    #[inline]
    fn fetch<'w>(columns: &mut Columns<'w>) -> Self::Fetch<'w> {
        columns.shared::<C>().values::<C>().iter()
    }

    #[inline]
    fn next<'w>(fetch: &mut Self::Fetch<'w>) -> Option<Self::Value<'w>> {
        fetch.next()?.as_ref()
    }
}

/// Parameter implementation for mutable component references.
impl<C: Component> Parameter for &mut C {
    type Value<'w> = &'w mut C;
    type Fetch<'w> = slice::IterMut<'w, Option<C>>;

    #[inline]
    fn spec(components: &component::Registry) -> ParameterSpec {
        ParameterSpec::new(components.register::<C>(), true)
    }

    #[inline]
    fn fetch<'w>(columns: &mut Columns<'w>) -> Self::Fetch<'w> {
        columns.exclusive::<C>().values_mut::<C>().iter_mut()
    }

    #[inline]
    fn next<'w>(fetch: &mut Self::Fetch<'w>) -> Option<Self::Value<'w>> {
        fetch.next()?.as_mut()
    }
}
