use std::{
    any::TypeId,
    sync::RwLock,
    sync::atomic::{AtomicU32, Ordering},
};

use dashmap::DashMap;

use crate::ecs::component::{Component, Id, Info, IntoShape, Shape};

/// A component registry. This is responsible for assigning component types their identifiers
/// within one simulation.
///
/// Lookups from a Rust `TypeId` are lock-free via `DashMap`, so queries and entity references can
/// resolve component ids from `&self`. Registration only takes a write lock on the info table the
/// first time a type is seen.
pub struct Registry {
    /// Map from TypeId to component Id. Lock-free reads via sharded concurrent hashmap.
    type_map: DashMap<TypeId, Id>,

    /// List of registered component entries. Protected by RwLock for rare writes.
    components: RwLock<Vec<Option<Info>>>,

    /// Next available component identifier.
    next_id: AtomicU32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new component registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            type_map: DashMap::new(),
            components: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        }
    }

    /// Register a component type and get its identifier.
    ///
    /// If the component type is already registered, returns the existing ID.
    pub fn register<C: Component>(&self) -> Id {
        let type_id = TypeId::of::<C>();

        // Fast path: check if already registered (lock-free read)
        if let Some(id) = self.type_map.get(&type_id) {
            return *id;
        }

        // Slow path: use the entry API so two callers can't both allocate an id for one type.
        *self
            .type_map
            .entry(type_id)
            .or_insert_with(|| {
                let id = Id(self.next_id.fetch_add(1, Ordering::Relaxed));

                let mut components = self.components.write().unwrap();
                if id.index() >= components.len() {
                    components.resize(id.index() + 1, None);
                }
                components[id.index()] = Some(Info::new::<C>(id));

                log::trace!("registered component {} as {}", std::any::type_name::<C>(), id);
                id
            })
            .value()
    }

    /// Get the component ID for a provided type `C`, if registered.
    #[inline]
    pub fn get<C: Component>(&self) -> Option<Id> {
        self.type_map
            .get(&TypeId::of::<C>())
            .map(|entry| *entry.value())
    }

    /// Get the component info for a provided type `C`, if registered.
    #[inline]
    pub fn info_of<C: Component>(&self) -> Option<Info> {
        self.info(self.get::<C>()?)
    }

    /// Get component info by ID.
    #[inline]
    pub fn info(&self, id: Id) -> Option<Info> {
        let components = self.components.read().unwrap();
        components.get(id.index()).and_then(|i| *i)
    }

    /// Get the shape for a generic type `IS` which implements [`IntoShape`], registering any
    /// component types it names.
    #[inline]
    pub fn shape<IS: IntoShape>(&self) -> Shape {
        IS::into_shape(self)
    }

    /// Get the number of registered component types.
    #[inline]
    pub fn len(&self) -> usize {
        self.next_id.load(Ordering::Relaxed) as usize
    }

    /// Check if no component types are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::ecs::{
        Component,
        component::{Id, Registry},
    };

    #[derive(Component)]
    struct Position;

    #[derive(Component)]
    struct Velocity;

    #[test]
    fn register_assigns_dense_ids() {
        // Given
        let registry = Registry::new();

        // When
        let pos = registry.register::<Position>();
        let vel = registry.register::<Velocity>();

        // Then
        assert_eq!(pos, Id::new(0));
        assert_eq!(vel, Id::new(1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn register_is_idempotent() {
        // Given
        let registry = Registry::new();
        let first = registry.register::<Position>();

        // When
        let second = registry.register::<Position>();

        // Then
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn info_describes_the_type() {
        // Given
        let registry = Registry::new();
        assert!(registry.get::<Velocity>().is_none());
        let id = registry.register::<Velocity>();

        // When
        let info = registry.info(id).unwrap();

        // Then
        assert_eq!(info.id(), id);
        assert!(info.is::<Velocity>());
        assert!(!info.is::<Position>());
        assert!(info.name().ends_with("Velocity"));
        assert_eq!(registry.info_of::<Velocity>().unwrap().id(), id);
    }

    #[test]
    fn registries_are_independent() {
        // Given
        let a = Registry::new();
        let b = Registry::new();

        // When
        a.register::<Position>();
        let vel_in_a = a.register::<Velocity>();
        let vel_in_b = b.register::<Velocity>();

        // Then
        assert_eq!(vel_in_a, Id::new(1));
        assert_eq!(vel_in_b, Id::new(0));
    }
}
