//! Shaped columnar storage for the simulation.
//!
//! Entities with the **exact same set of components** (their [`Shape`]) share a [`Table`]. Each
//! table keeps one typed column per component type, so iterating a single component reads
//! sequential memory:
//!
//! ```text
//! Table {Position, Velocity}:
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Entities: [E1          , E2  , E3          ]                 │
//! │ Position: [Pos{x:1,y:2}, None, Pos{x:5,y:6}]                 │
//! │ Velocity: [Vel{dx:0.5} , None, Vel{dx:0.0} ]                 │
//! └──────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  tombstone (E2 moved or removed)
//! ```
//!
//! Rows are never moved while the simulation is running a tick. Removing an entity, or moving it
//! to another shape when a component is added or removed, clears its row and leaves a tombstone.
//! At the end of each tick the [`Storage`] directory prunes every table, evicts tables with no
//! live rows and rebuilds its entity index.
//!
//! # Entity Movement
//!
//! ```text
//! Add Velocity to E1 {Position}:
//!
//! Table {Position}            Table {Position, Velocity}
//! ┌────────────┐              ┌──────────────────────┐
//! │ E1 │ Pos   │ ──pop────►   │ E1 │ Pos │ Vel       │
//! └────────────┘  + Vel       └──────────────────────┘
//! ```
//!
//! Adding a component the entity already has does not move it: the value is overwritten in
//! place.

use std::collections::HashMap;

use crate::ecs::{
    component::{self, BoxedSet, BoxedValue, Shape},
    entity::Entity,
};

mod column;
mod location;
pub(crate) mod table;

pub use column::Column;
pub use location::{Location, Row};
pub use table::Id as TableId;
pub use table::Table;

/// How a component write was applied to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    /// The entity did not have the component and moved to a new shape.
    Inserted,
    /// The entity already had the component and its value was replaced in place.
    Overwritten,
}

/// The totals of an end-of-tick maintenance pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pruned {
    /// Tombstoned rows physically removed.
    pub rows: usize,
    /// Tables dropped because they had no live rows.
    pub tables: usize,
}

/// The storage directory: every table in the simulation, the shape → table mapping, and the
/// entity → location index.
///
/// # Example
///
/// ```rust,ignore
/// let mut storage = Storage::new(0);
/// let registry = component::Registry::new();
/// let allocator = entity::Allocator::new();
///
/// let entity = allocator.alloc();
/// storage.spawn(entity, Position { x: 0.0, y: 0.0 }, &registry);
///
/// // Migrates the entity to the {Position, Velocity} table
/// storage.add_boxed(entity, registry.register::<Velocity>(), Box::new(Velocity::default()), &registry);
/// ```
pub struct Storage {
    /// Tables in creation order. A table's id is its index.
    tables: Vec<Table>,

    /// Canonical shape to table mapping.
    by_shape: HashMap<Shape, TableId>,

    /// Where each live entity is stored.
    locations: HashMap<Entity, Location>,

    /// Initial row reservation for new tables.
    capacity: usize,
}

impl Storage {
    /// Create an empty storage directory. New tables reserve room for `capacity` rows.
    pub fn new(capacity: usize) -> Self {
        Self {
            tables: Vec::new(),
            by_shape: HashMap::new(),
            locations: HashMap::new(),
            capacity,
        }
    }

    /// Get the table for `shape`, creating it if this is the first time the shape is seen.
    pub fn get_or_create(&mut self, shape: &Shape, registry: &component::Registry) -> TableId {
        if let Some(id) = self.by_shape.get(shape) {
            return *id;
        }

        let id = TableId::new(self.tables.len() as u32);
        self.tables
            .push(Table::new(id, shape.clone(), registry, self.capacity));
        self.by_shape.insert(shape.clone(), id);
        log::debug!("created {id} for shape {:?}", shape.ids());
        id
    }

    /// Get the table that stores `shape`, if one exists.
    #[inline]
    pub fn table_for(&self, shape: &Shape) -> Option<TableId> {
        self.by_shape.get(shape).copied()
    }

    /// Get the ids of every table whose shape contains all of `required`, in creation order.
    pub fn matching(&self, required: &Shape) -> Vec<TableId> {
        self.tables
            .iter()
            .filter(|table| table.shape().contains_all(required))
            .map(Table::id)
            .collect()
    }

    /// Get every table, in creation order.
    #[inline]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Get every table mutably, in creation order.
    #[inline]
    pub fn tables_mut(&mut self) -> &mut [Table] {
        &mut self.tables
    }

    /// Get a table by id.
    ///
    /// # Panics
    /// - if the id is out of bounds
    #[inline]
    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.index()]
    }

    /// Get a table by id, mutably.
    ///
    /// # Panics
    /// - if the id is out of bounds
    #[inline]
    pub fn table_mut(&mut self, id: TableId) -> &mut Table {
        &mut self.tables[id.index()]
    }

    /// Get the number of tables.
    #[inline]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Get the number of live entities across all tables.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.locations.len()
    }

    /// Get the location of a live entity.
    #[inline]
    pub fn location(&self, entity: Entity) -> Option<Location> {
        self.locations.get(&entity).copied()
    }

    /// Determine if `entity` has a live row.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Get the shape of a live entity.
    pub fn shape_of(&self, entity: Entity) -> Option<&Shape> {
        let location = self.location(entity)?;
        Some(self.table(location.table_id()).shape())
    }

    /// Store a new entity with the component values in `set`.
    pub fn spawn<S: component::Set>(
        &mut self,
        entity: Entity,
        set: S,
        registry: &component::Registry,
    ) -> Location {
        let shape = registry.shape::<S>();
        let table_id = self.get_or_create(&shape, registry);
        let row = self.table_mut(table_id).insert(entity, set, registry);
        self.place(entity, Location::new(table_id, row))
    }

    /// Store a new entity from type-erased component values.
    pub fn spawn_boxed(
        &mut self,
        entity: Entity,
        values: BoxedSet,
        registry: &component::Registry,
    ) -> Location {
        let table_id = self.get_or_create(&values.shape(), registry);
        let row = self.table_mut(table_id).insert_boxed(entity, values);
        self.place(entity, Location::new(table_id, row))
    }

    fn place(&mut self, entity: Entity, location: Location) -> Location {
        let previous = self.locations.insert(entity, location);
        debug_assert!(previous.is_none(), "{entity} was stored twice");
        location
    }

    /// Tombstone an entity's row and return its component values. Returns `None` if the entity
    /// has no live row.
    pub fn despawn(&mut self, entity: Entity) -> Option<BoxedSet> {
        let location = self.locations.remove(&entity)?;
        let (_, values) = self.table_mut(location.table_id()).pop_row(location.row())?;
        Some(values)
    }

    /// Give `entity` the component `id` with `value`.
    ///
    /// An entity that already has the component keeps its row and the value is overwritten.
    /// Otherwise the entity's row is popped and reinserted, with the new value, into the table for
    /// its grown shape. Returns `None` if the entity has no live row.
    pub fn add_boxed(
        &mut self,
        entity: Entity,
        id: component::Id,
        value: BoxedValue,
        registry: &component::Registry,
    ) -> Option<Write> {
        let location = self.location(entity)?;
        let table = self.table_mut(location.table_id());
        if table.shape().contains(id) {
            table.set_boxed(location.row(), id, value);
            return Some(Write::Overwritten);
        }

        let mut values = self.despawn(entity)?;
        values.insert(id, value);
        let moved = self.spawn_boxed(entity, values, registry);
        log::trace!(
            "moved {entity} from {} to {} adding {id}",
            location.table_id(),
            moved.table_id()
        );
        Some(Write::Inserted)
    }

    /// Take the component `id` away from `entity`, moving it to the table for its reduced shape.
    ///
    /// Returns `None` if the entity has no live row or does not have the component. Otherwise
    /// returns the removed value.
    pub fn remove_boxed(
        &mut self,
        entity: Entity,
        id: component::Id,
        registry: &component::Registry,
    ) -> Option<BoxedValue> {
        let location = self.location(entity)?;
        if !self.table(location.table_id()).shape().contains(id) {
            return None;
        }

        let mut values = self.despawn(entity)?;
        let removed = values.take(id);
        let moved = self.spawn_boxed(entity, values, registry);
        log::trace!(
            "moved {entity} from {} to {} removing {id}",
            location.table_id(),
            moved.table_id()
        );
        removed
    }

    /// Compact every table, drop tables with no live rows and rebuild the indexes.
    ///
    /// Table ids and rows may change; any previously obtained [`Location`] is stale afterwards.
    pub fn prune(&mut self) -> Pruned {
        let rows = self.tables.iter_mut().map(Table::prune).sum::<usize>();
        let before = self.tables.len();
        self.tables.retain(|table| !table.is_empty());
        let tables = before - self.tables.len();

        if rows == 0 && tables == 0 {
            return Pruned::default();
        }

        self.by_shape.clear();
        self.locations.clear();
        for (index, table) in self.tables.iter_mut().enumerate() {
            let id = TableId::new(index as u32);
            table.set_id(id);
            self.by_shape.insert(table.shape().clone(), id);
            for (row, slot) in table.entities().iter().enumerate() {
                if let Some(entity) = slot {
                    self.locations
                        .insert(*entity, Location::new(id, Row::new(row)));
                }
            }
        }

        log::debug!("pruned {rows} rows and evicted {tables} empty tables");
        Pruned { rows, tables }
    }
}

#[cfg(test)]
mod tests {
    use crate::ecs::{
        Component,
        component::{BoxedSet, Registry},
        entity::Allocator,
        storage::{Pruned, Row, Storage, Write},
    };

    #[derive(Component, Debug, PartialEq)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[derive(Component, Debug, PartialEq)]
    struct Velocity {
        dx: i32,
        dy: i32,
    }

    #[derive(Component, Debug, PartialEq)]
    struct Tag;

    #[test]
    fn permutations_share_a_table() {
        // Given
        let registry = Registry::new();
        let mut storage = Storage::new(0);

        // When
        let a = storage.get_or_create(&registry.shape::<(Position, Velocity)>(), &registry);
        let b = storage.get_or_create(&registry.shape::<(Velocity, Position)>(), &registry);

        // Then
        assert_eq!(a, b);
        assert_eq!(storage.table_count(), 1);
    }

    #[test]
    fn matching_returns_supersets_in_creation_order() {
        // Given
        let registry = Registry::new();
        let allocator = Allocator::new();
        let mut storage = Storage::new(0);
        storage.spawn(allocator.alloc(), Position { x: 0, y: 0 }, &registry);
        storage.spawn(allocator.alloc(), Velocity { dx: 0, dy: 0 }, &registry);
        storage.spawn(
            allocator.alloc(),
            (Position { x: 0, y: 0 }, Velocity { dx: 0, dy: 0 }),
            &registry,
        );

        // When
        let with_position = storage.matching(&registry.shape::<Position>());
        let with_both = storage.matching(&registry.shape::<(Position, Velocity)>());
        let everything = storage.matching(&registry.shape::<()>());

        // Then
        assert_eq!(with_position.len(), 2);
        assert!(with_position[0].index() < with_position[1].index());
        assert_eq!(with_both.len(), 1);
        assert_eq!(everything.len(), 3);
        assert!(storage.matching(&registry.shape::<Tag>()).is_empty());
    }

    #[test]
    fn add_moves_entity_to_new_shape() {
        // Given
        let registry = Registry::new();
        let allocator = Allocator::new();
        let mut storage = Storage::new(0);
        let entity = allocator.alloc();
        let before = storage.spawn(entity, Position { x: 1, y: 2 }, &registry);
        let velocity = registry.register::<Velocity>();

        // When
        let write = storage.add_boxed(entity, velocity, Box::new(Velocity { dx: 3, dy: 4 }), &registry);

        // Then
        assert_eq!(write, Some(Write::Inserted));
        let after = storage.location(entity).unwrap();
        assert_ne!(before.table_id(), after.table_id());
        let table = storage.table(after.table_id());
        assert_eq!(table.get::<Position>(after.row()), Some(&Position { x: 1, y: 2 }));
        assert_eq!(table.get::<Velocity>(after.row()), Some(&Velocity { dx: 3, dy: 4 }));
        assert_eq!(storage.table(before.table_id()).len(), 0);
        assert_eq!(storage.table(before.table_id()).rows(), 1);
    }

    #[test]
    fn add_existing_component_overwrites_in_place() {
        // Given
        let registry = Registry::new();
        let allocator = Allocator::new();
        let mut storage = Storage::new(0);
        let entity = allocator.alloc();
        let before = storage.spawn(entity, Position { x: 1, y: 2 }, &registry);
        let position = registry.register::<Position>();

        // When
        let write = storage.add_boxed(entity, position, Box::new(Position { x: 5, y: 5 }), &registry);

        // Then
        assert_eq!(write, Some(Write::Overwritten));
        assert_eq!(storage.location(entity), Some(before));
        assert_eq!(
            storage.table(before.table_id()).get::<Position>(before.row()),
            Some(&Position { x: 5, y: 5 })
        );
    }

    #[test]
    fn add_then_remove_restores_shape() {
        // Given
        let registry = Registry::new();
        let allocator = Allocator::new();
        let mut storage = Storage::new(0);
        let entity = allocator.alloc();
        let before = storage.spawn(entity, Position { x: 1, y: 2 }, &registry);
        let velocity = registry.register::<Velocity>();
        storage.add_boxed(entity, velocity, Box::new(Velocity { dx: 3, dy: 4 }), &registry);

        // When
        let removed = storage.remove_boxed(entity, velocity, &registry);

        // Then
        assert_eq!(
            removed.and_then(|v| v.downcast::<Velocity>().ok()).map(|v| *v),
            Some(Velocity { dx: 3, dy: 4 })
        );
        let after = storage.location(entity).unwrap();
        assert_eq!(after.table_id(), before.table_id());
        assert_eq!(storage.shape_of(entity), Some(&registry.shape::<Position>()));
        assert!(storage.remove_boxed(entity, velocity, &registry).is_none());
    }

    #[test]
    fn unknown_entities_are_rejected() {
        // Given
        let registry = Registry::new();
        let allocator = Allocator::new();
        let mut storage = Storage::new(0);
        let ghost = allocator.alloc();
        let position = registry.register::<Position>();

        // Then
        assert!(storage.despawn(ghost).is_none());
        assert!(storage.add_boxed(ghost, position, Box::new(Position { x: 0, y: 0 }), &registry).is_none());
        assert!(storage.remove_boxed(ghost, position, &registry).is_none());
    }

    #[test]
    fn prune_evicts_empty_tables_and_reindexes() {
        // Given
        let registry = Registry::new();
        let allocator = Allocator::new();
        let mut storage = Storage::new(0);
        let lonely = allocator.alloc();
        storage.spawn(lonely, Tag, &registry);
        let first = allocator.alloc();
        let second = allocator.alloc();
        storage.spawn(first, Position { x: 1, y: 1 }, &registry);
        storage.spawn(second, Position { x: 2, y: 2 }, &registry);
        storage.despawn(lonely);
        storage.despawn(first);

        // When
        let pruned = storage.prune();

        // Then
        assert_eq!(pruned, Pruned { rows: 2, tables: 1 });
        assert_eq!(storage.table_count(), 1);
        assert_eq!(storage.entity_count(), 1);
        let location = storage.location(second).unwrap();
        assert_eq!(location.table_id().index(), 0);
        assert_eq!(location.row(), Row::new(0));
        assert_eq!(
            storage.table_for(&registry.shape::<Position>()),
            Some(location.table_id())
        );
        assert_eq!(storage.table_for(&registry.shape::<Tag>()), None);
        assert_eq!(storage.prune(), Pruned::default());
    }

    #[test]
    fn spawn_boxed_uses_value_shape() {
        // Given
        let registry = Registry::new();
        let allocator = Allocator::new();
        let mut storage = Storage::new(0);
        let entity = allocator.alloc();
        let values = BoxedSet::new((Velocity { dx: 1, dy: 1 }, Position { x: 0, y: 0 }), &registry);

        // When
        let location = storage.spawn_boxed(entity, values, &registry);

        // Then
        assert_eq!(
            storage.table(location.table_id()).shape(),
            &registry.shape::<(Position, Velocity)>()
        );
        assert!(storage.contains(entity));
    }
}
