//! Query data types and specifications.
//!
//! This module defines the [`Data`] trait and [`DataSpec`] struct, which represent complete query
//! specifications that can yield results.
//!
//! # Data Trait
//!
//! The [`Data`] trait is implemented by:
//! - Any single [`Parameter`] type (automatic implementation)
//! - Tuples of `Data` types (enables nested queries)
//! - The unit type `()`, which requires nothing and so matches every entity
//!
//! # Column Access
//!
//! A query claims columns from each matching table through [`Columns`]. Columns the query reads
//! mutably are handed out exclusively and at most once; every other column stays shared, so
//! entity references produced alongside the items can still read them.

use std::{any::type_name, collections::HashSet};

use crate::{
    all_tuples,
    ecs::{
        component::{self, Component, Info, Shape},
        entity::View,
        error::{Error, Result},
        query::param::{Parameter, ParameterSpec},
        storage::Column,
    },
};

/// Types that can be used as complete query specifications.
///
/// # Implementations
///
/// - **Single Parameter**: Any type implementing [`Parameter`] automatically implements `Data`
/// - **Tuples**: Tuples of `Data` types implement `Data` (up to 26 elements)
/// - **Unit**: The unit type `()` implements `Data`
///
/// # Examples
///
/// ```rust,ignore
/// // Single parameter (Parameter → Data)
/// sim.execute::<&Position>()?;
///
/// // Tuple of parameters
/// sim.execute::<(&Position, &mut Velocity)>()?;
///
/// // Nested tuples
/// sim.execute::<(&Position, (&Velocity, &mut Health))>()?;
/// ```
pub trait Data: Sized {
    /// The item yielded per entity.
    type Item<'w>;

    /// The per-table cursor state.
    type Fetch<'w>;

    /// Get the [`DataSpec`] for this query type, registering component types as needed.
    fn spec(components: &component::Registry) -> DataSpec;

    /// Claim the columns this query reads from one table.
    fn fetch<'w>(columns: &mut Columns<'w>) -> Self::Fetch<'w>;

    /// Advance every cursor in `fetch` by exactly one row and return the row's item, or `None`
    /// if the row is a tombstone.
    fn next<'w>(fetch: &mut Self::Fetch<'w>) -> Option<Self::Item<'w>>;
}

/// A specification describing what data a query accesses.
///
/// It's used by the query system to:
/// - Validate that no component is requested multiple times (aliasing check)
/// - Determine which tables contain all required components
/// - Decide which columns are borrowed exclusively
#[derive(Debug, Default, Clone)]
pub struct DataSpec {
    /// The parameters expected in the query results.
    params: Vec<ParameterSpec>,
}

impl DataSpec {
    /// An empty data specification.
    const EMPTY: DataSpec = Self::new(vec![]);

    /// Construct a new query with provided params.
    #[inline]
    pub const fn new(params: Vec<ParameterSpec>) -> Self {
        Self { params }
    }

    /// Get the parameters for this query.
    #[inline]
    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// The shape a table must contain to be visited by this query.
    pub fn required(&self) -> Shape {
        Shape::new(self.params.iter().map(ParameterSpec::id).collect::<Vec<_>>())
    }

    /// Check if this query requires mutable access to component `id`.
    #[inline]
    pub fn is_mutable(&self, id: component::Id) -> bool {
        self.params
            .iter()
            .any(|param| param.id() == id && param.is_mutable())
    }

    /// Validate that no component is named more than once.
    ///
    /// Rust's type system cannot prevent duplicate components at compile time (e.g. `(&Foo,
    /// &Foo)` is valid Rust), so this check happens when the query is built.
    pub fn validate(&self, components: &component::Registry) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.params.len());
        for param in &self.params {
            if !seen.insert(param.id()) {
                let name = components
                    .info(param.id())
                    .map_or("<unregistered>", |info| info.name());
                return Err(Error::Configuration(format!(
                    "query requests component {name} more than once"
                )));
            }
        }
        Ok(())
    }
}

/// The columns of one table, split by how the running query borrows them.
pub struct Columns<'w> {
    /// The table's shape.
    shape: &'w Shape,

    /// Columns the query does not write.
    shared: Vec<&'w Column>,

    /// Columns the query writes, until a parameter claims them.
    exclusive: Vec<&'w mut Column>,

    /// Components whose columns have been claimed exclusively.
    borrowed: Vec<Info>,
}

impl<'w> Columns<'w> {
    /// Split `columns` according to `spec`.
    pub(crate) fn new(shape: &'w Shape, columns: &'w mut [Column], spec: &DataSpec) -> Self {
        let mut shared = Vec::with_capacity(columns.len());
        let mut exclusive = Vec::new();
        for column in columns {
            if spec.is_mutable(column.info().id()) {
                exclusive.push(column);
            } else {
                shared.push(&*column);
            }
        }

        Self {
            shape,
            shared,
            exclusive,
            borrowed: Vec::new(),
        }
    }

    /// Get the shared column for component type `C`.
    ///
    /// # Panics
    /// Panics if the table has no shared column for `C`.
    pub fn shared<C: Component>(&self) -> &'w Column {
        match self
            .shared
            .iter()
            .copied()
            .find(|column| column.info().is::<C>())
        {
            Some(column) => column,
            None => panic!("{} is not readable from this table", type_name::<C>()),
        }
    }

    /// Claim the exclusive column for component type `C`.
    ///
    /// # Panics
    /// Panics if the table has no exclusive column for `C`, or it was already claimed.
    pub fn exclusive<C: Component>(&mut self) -> &'w mut Column {
        match self
            .exclusive
            .iter()
            .position(|column| column.info().is::<C>())
        {
            Some(index) => {
                let column = self.exclusive.swap_remove(index);
                self.borrowed.push(column.info());
                column
            }
            None => panic!("{} is not writable from this table", type_name::<C>()),
        }
    }

    /// Convert what remains into a view for entity references.
    pub(crate) fn into_view(self) -> View<'w> {
        View::new(self.shape, self.shared, self.borrowed)
    }
}

/// A query implementation for any type that is a valid [`Parameter`] type.
impl<P: Parameter> Data for P {
    type Item<'w> = P::Value<'w>;
    type Fetch<'w> = P::Fetch<'w>;

    fn spec(components: &component::Registry) -> DataSpec {
        DataSpec::new(vec![P::spec(components)])
    }

    #[inline]
    fn fetch<'w>(columns: &mut Columns<'w>) -> Self::Fetch<'w> {
        P::fetch(columns)
    }

    #[inline]
    fn next<'w>(fetch: &mut Self::Fetch<'w>) -> Option<Self::Item<'w>> {
        P::next(fetch)
    }
}

/// A query implementation that is empty. It requires no components, so every live entity
/// matches and the item is `()`.
impl Data for () {
    type Item<'w> = ();
    type Fetch<'w> = ();

    fn spec(_components: &component::Registry) -> DataSpec {
        DataSpec::EMPTY
    }

    #[inline]
    fn fetch<'w>(_columns: &mut Columns<'w>) -> Self::Fetch<'w> {}

    #[inline]
    fn next<'w>(_fetch: &mut Self::Fetch<'w>) -> Option<Self::Item<'w>> {
        Some(())
    }
}

/// Implement Data for tuples of [Data] types.
macro_rules! tuple_query {
    ($($name: ident),*) => {
        impl<$($name: Data),*> Data for ($($name,)*) {
            type Item<'w> = ($($name::Item<'w>,)*);
            type Fetch<'w> = ($($name::Fetch<'w>,)*);

            fn spec(components: &component::Registry) -> DataSpec {
                let mut params = Vec::new();
                $(
                    params.extend(
                        <$name>::spec(components).params().iter().copied()
                    );
                )*
                DataSpec::new(params)
            }

            #[inline]
            fn fetch<'w>(columns: &mut Columns<'w>) -> Self::Fetch<'w> {
                ($(<$name>::fetch(columns),)*)
            }

            #[inline]
            #[allow(non_snake_case)]
            fn next<'w>(fetch: &mut Self::Fetch<'w>) -> Option<Self::Item<'w>> {
                let ($($name,)*) = fetch;
                // Every cursor must move, even if an earlier one hit a tombstone.
                $(let $name = <$name>::next($name);)*
                Some(($($name?,)*))
            }
        }
    }
}

// Generate implementations for tuples up to 26 elements (A-Z)
all_tuples!(tuple_query);
