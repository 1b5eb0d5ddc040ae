use std::any::Any;

use crate::{
    all_tuples,
    ecs::component::{Component, Id, IntoShape, Registry, Shape},
};

/// A type-erased component value.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

/// Trait describing a target that can have component values applied to it from a `Set`.
pub trait Target {
    fn apply<C: Component>(&mut self, id: Id, value: C);
}

/// A set of component values for one entity.
///
/// This lets callers hand over a single component, a tuple of components, or nested tuples, while
/// storage walks the values in a type-erased manner. If a set names the same component type more
/// than once, targets keep the last value.
pub trait Set: IntoShape + Sized + Send + 'static {
    /// Apply the component values in this set to the given target. This takes ownership of self.
    fn apply<T: Target>(self, registry: &Registry, target: &mut T);
}

/// Implement Set for single component types.
impl<C: Component> Set for C {
    fn apply<T: Target>(self, registry: &Registry, target: &mut T) {
        target.apply::<C>(registry.register::<C>(), self);
    }
}

impl Set for () {
    fn apply<T: Target>(self, _registry: &Registry, _target: &mut T) {}
}

/// Implement Set for tuples of component types.
macro_rules! tuple_set {
    ($($name: ident),*) => {
        impl<$($name: Set),*> Set for ($($name,)*) {
            fn apply<CT: Target>(self, registry: &Registry, target: &mut CT) {
                #[allow(non_snake_case)]
                let ( $($name,)* ) = self;
                $(<$name as Set>::apply($name, registry, target);)*
            }
        }
    }
}

// Implement the tuple Set for all tuples up to 26 elements.
all_tuples!(tuple_set);

/// An owned, type-erased set of component values.
///
/// This is how component values travel when their types are no longer known statically: through
/// the deferred command queue, and between tables when an entity changes shape. Values are kept
/// one per component id in ascending id order.
#[derive(Default)]
pub struct BoxedSet {
    values: Vec<(Id, BoxedValue)>,
}

impl BoxedSet {
    /// Box every value of `set`, registering its component types with `registry`.
    pub fn new<S: Set>(set: S, registry: &Registry) -> Self {
        let mut boxed = Self::default();
        set.apply(registry, &mut boxed);
        boxed
    }

    /// Insert a value for component `id`, returning the value it replaced if any.
    pub fn insert(&mut self, id: Id, value: BoxedValue) -> Option<BoxedValue> {
        match self.values.binary_search_by_key(&id, |(other, _)| *other) {
            Ok(index) => Some(std::mem::replace(&mut self.values[index].1, value)),
            Err(index) => {
                self.values.insert(index, (id, value));
                None
            }
        }
    }

    /// Remove and return the value for component `id`.
    pub fn take(&mut self, id: Id) -> Option<BoxedValue> {
        let index = self
            .values
            .binary_search_by_key(&id, |(other, _)| *other)
            .ok()?;
        Some(self.values.remove(index).1)
    }

    /// Get the component ids held by this set, in ascending order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = Id> + '_ {
        self.values.iter().map(|(id, _)| *id)
    }

    /// The shape this set of values would give an entity.
    pub fn shape(&self) -> Shape {
        Shape::new(self.ids().collect::<Vec<_>>())
    }

    /// Get the number of values in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the set holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Target for BoxedSet {
    fn apply<C: Component>(&mut self, id: Id, value: C) {
        self.insert(id, Box::new(value));
    }
}

impl IntoIterator for BoxedSet {
    type Item = (Id, BoxedValue);
    type IntoIter = std::vec::IntoIter<(Id, BoxedValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl std::fmt::Debug for BoxedSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
