use std::hash::{Hash, Hasher};

use fixedbitset::FixedBitSet;

use crate::{
    all_tuples,
    ecs::component::{Component, Id, Registry},
};

/// The set of component types attached to an entity or held by a table.
///
/// Ids are kept sorted and de-duplicated so any permutation of the same types produces an equal
/// shape with an equal hash. A bitset mask mirrors the ids so superset tests against a query are
/// a handful of word operations instead of a search per id.
#[derive(Debug, Clone)]
pub struct Shape {
    /// Sorted, unique component ids.
    ids: Vec<Id>,

    /// One bit per component id in `ids`.
    mask: FixedBitSet,
}

impl Shape {
    /// The shape with no components.
    pub fn empty() -> Self {
        Self {
            ids: Vec::new(),
            mask: FixedBitSet::new(),
        }
    }

    /// Construct a new Shape from the given component IDs.
    pub fn new(ids: impl Into<Vec<Id>>) -> Self {
        let mut ids = ids.into();
        ids.sort();
        ids.dedup();
        ids.shrink_to_fit();

        let mut mask = FixedBitSet::with_capacity(ids.last().map_or(0, |id| id.index() + 1));
        for id in &ids {
            mask.insert(id.index());
        }

        Self { ids, mask }
    }

    /// Get the component IDs in this shape, in ascending order.
    #[inline]
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    /// Determine if this shape contains the given component ID.
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.mask.contains(id.index())
    }

    /// Determine if this shape contains every component ID in `other`.
    #[inline]
    pub fn contains_all(&self, other: &Shape) -> bool {
        self.mask.is_superset(&other.mask)
    }

    /// Create a new shape that also holds `id`.
    pub fn with(&self, id: Id) -> Self {
        if self.contains(id) {
            return self.clone();
        }
        let mut ids = Vec::with_capacity(self.ids.len() + 1);
        ids.extend_from_slice(&self.ids);
        ids.push(id);
        Self::new(ids)
    }

    /// Create a new shape without `id`.
    pub fn without(&self, id: Id) -> Self {
        Self::new(
            self.ids
                .iter()
                .copied()
                .filter(|other| *other != id)
                .collect::<Vec<_>>(),
        )
    }

    /// Returns true if this shape is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of component IDs in this shape.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::empty()
    }
}

// Equality and hashing only look at the ids; the mask is derived from them.
impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ids.hash(state);
    }
}

impl From<Vec<Id>> for Shape {
    #[inline]
    fn from(value: Vec<Id>) -> Self {
        Shape::new(value)
    }
}

/// Trait for converting a type into a [`Shape`].
pub trait IntoShape {
    /// Convert the type into a shape, registering component types with `registry` as needed.
    fn into_shape(registry: &Registry) -> Shape;
}

/// [`IntoShape`] implementation for the empty tuple.
impl IntoShape for () {
    fn into_shape(_registry: &Registry) -> Shape {
        Shape::empty()
    }
}

/// [`IntoShape`] implementation for single component types.
impl<C: Component> IntoShape for C {
    fn into_shape(registry: &Registry) -> Shape {
        Shape::new([registry.register::<C>()])
    }
}

/// [`IntoShape`] implementation for tuples of other [`IntoShape`] types.
macro_rules! tuple_shape {
    ($($name: ident),*) => {
        impl<$($name: IntoShape),*> IntoShape for ($($name,)*) {
            fn into_shape(registry: &Registry) -> Shape {
                let mut ids = Vec::new();
                $(
                    ids.extend(<$name>::into_shape(registry).ids());
                )*
                Shape::new(ids)
            }
        }
    }
}

// Implement the tuple -> Shape for all tuples up to 26 elements.
all_tuples!(tuple_shape);
