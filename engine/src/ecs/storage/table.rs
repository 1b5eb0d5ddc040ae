use std::fmt;

use fixedbitset::FixedBitSet;

use crate::ecs::{
    component::{self, BoxedSet, BoxedValue, Component, Shape},
    entity::Entity,
    storage::{Column, Row},
};

/// The identifier for a table in storage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(u32);

impl Id {
    /// Create a new Id with the given unique identifier.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Id(id)
    }

    /// Get the index for this Id.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {}", self.0)
    }
}

/// A table stores every entity of one shape and their component data in a columnar format.
///
/// Each column stores all instances of a single component type, ordered by component id to match
/// the shape. Removing a row does not move anything: the entity slot and each column slot are
/// cleared, leaving a tombstone that iteration skips. [`Table::prune`] compacts tombstones away,
/// which is the only operation that changes the row of a live entity.
///
/// # Example Usage
///
/// ```rust,ignore
/// let registry = component::Registry::new();
/// let shape = registry.shape::<(Position, Velocity)>();
/// let mut table = Table::new(table::Id::new(0), shape, &registry, 0);
///
/// let row = table.insert(entity, (Position { x: 1.0, y: 2.0 }, Velocity { dx: 0.5, dy: 0.3 }), &registry);
/// ```
///
/// # Invariants
/// - `entities.len()` equals the length of every column
/// - a row's entity slot is `None` exactly when every column slot in that row is `None`
pub struct Table {
    /// The unique identifier for this table.
    id: Id,

    /// The component types every entity in this table has.
    shape: Shape,

    /// The entities stored in this table, one per row. `None` marks a tombstone.
    entities: Vec<Option<Entity>>,

    /// The component columns, in shape order.
    columns: Vec<Column>,

    /// Number of rows that are not tombstones.
    live: usize,
}

impl Table {
    /// Create a new table for the given shape. Each component in the shape gets its own column.
    ///
    /// # Panics
    /// - Panics if any component in the shape is not registered in the provided registry.
    pub fn new(id: Id, shape: Shape, registry: &component::Registry, capacity: usize) -> Self {
        let columns = shape
            .ids()
            .iter()
            .map(|&component| match registry.info(component) {
                Some(info) => info.new_column(capacity),
                None => panic!("component {component} is not registered"),
            })
            .collect();

        Self {
            id,
            shape,
            entities: Vec::with_capacity(capacity),
            columns,
            live: 0,
        }
    }

    /// Get the unique identifier for this table.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    #[inline]
    pub(crate) fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    /// Get the shape of this table.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Get the number of live entities in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the table has no live entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Get the number of physical rows, tombstones included.
    #[inline]
    pub fn rows(&self) -> usize {
        self.entities.len()
    }

    /// Get the entity slots of this table, one per row.
    #[inline]
    pub fn entities(&self) -> &[Option<Entity>] {
        &self.entities
    }

    /// Get the entity stored at a row, if the row is live.
    #[inline]
    pub fn entity(&self, row: Row) -> Option<Entity> {
        self.entities.get(row.index()).copied().flatten()
    }

    /// Determine if `entity` has a live row in this table.
    ///
    /// This scans the entity slots; the storage directory keeps an index for fast lookups.
    pub fn has(&self, entity: Entity) -> bool {
        self.row_of(entity).is_some()
    }

    /// Find the live row holding `entity`.
    pub fn row_of(&self, entity: Entity) -> Option<Row> {
        self.entities
            .iter()
            .position(|slot| *slot == Some(entity))
            .map(Row::new)
    }

    /// Append a row for `entity` with the component values in `set`.
    ///
    /// # Panics
    /// - Panics if the set holds a component that is not part of this table's shape.
    /// - In debug builds, panics if the set does not cover every column or `entity` already has
    ///   a live row here.
    pub fn insert<S: component::Set>(
        &mut self,
        entity: Entity,
        set: S,
        registry: &component::Registry,
    ) -> Row {
        debug_assert!(!self.has(entity), "{entity} already has a row in {}", self.id);
        let row = Row::new(self.entities.len());
        set.apply(
            registry,
            &mut RowWriter {
                table: self,
                row,
            },
        );
        self.commit(entity, row)
    }

    /// Append a row for `entity` from type-erased values.
    ///
    /// # Panics
    /// Same as [`Table::insert`].
    pub fn insert_boxed(&mut self, entity: Entity, values: BoxedSet) -> Row {
        debug_assert!(!self.has(entity), "{entity} already has a row in {}", self.id);
        let row = Row::new(self.entities.len());
        let table = self.id;
        for (id, value) in values {
            self.column_by_id_mut(id)
                .unwrap_or_else(|| panic!("component {id} is not part of {table}"))
                .write_boxed(row, value);
        }
        self.commit(entity, row)
    }

    fn commit(&mut self, entity: Entity, row: Row) -> Row {
        self.entities.push(Some(entity));
        self.live += 1;

        #[cfg(debug_assertions)]
        self.verify_invariants();

        row
    }

    /// Tombstone the row holding `entity` and return its component values.
    pub fn pop(&mut self, entity: Entity) -> Option<BoxedSet> {
        let row = self.row_of(entity)?;
        self.pop_row(row).map(|(_, values)| values)
    }

    /// Tombstone `row` and return the entity it held along with its component values. Returns
    /// `None` if the row is already a tombstone or out of bounds.
    pub fn pop_row(&mut self, row: Row) -> Option<(Entity, BoxedSet)> {
        let entity = self.entities.get_mut(row.index())?.take()?;
        let mut values = BoxedSet::default();
        for column in self.columns.iter_mut() {
            if let Some(value) = column.take_boxed(row) {
                values.insert(column.info().id(), value);
            }
        }
        self.live -= 1;
        Some((entity, values))
    }

    /// Physically remove every tombstoned row, keeping survivors in their relative order.
    ///
    /// Returns the number of rows removed.
    pub fn prune(&mut self) -> usize {
        let dead = self.entities.len() - self.live;
        if dead == 0 {
            return 0;
        }

        let mut keep = FixedBitSet::with_capacity(self.entities.len());
        for (index, slot) in self.entities.iter().enumerate() {
            if slot.is_some() {
                keep.insert(index);
            }
        }
        for column in self.columns.iter_mut() {
            column.compact(&keep);
        }
        self.entities.retain(Option::is_some);

        #[cfg(debug_assertions)]
        self.verify_invariants();

        dead
    }

    /// Get a component reference for a specific row.
    ///
    /// Returns `None` if the row is a tombstone or `C` is not part of this table.
    #[inline]
    pub fn get<C: Component>(&self, row: Row) -> Option<&C> {
        self.column::<C>()?.get(row)
    }

    /// Get a mutable component reference for a specific row.
    ///
    /// Returns `None` if the row is a tombstone or `C` is not part of this table.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, row: Row) -> Option<&mut C> {
        self.column_mut::<C>()?.get_mut(row)
    }

    /// Overwrite the value of component `C` at a live row in place.
    ///
    /// # Panics
    /// Panics if `C` is not part of this table or the row is not live.
    pub fn set<C: Component>(&mut self, row: Row, value: C) {
        assert!(self.entity(row).is_some(), "row {} of {} is not live", row.index(), self.id);
        let id = self.id;
        self.column_mut::<C>()
            .unwrap_or_else(|| panic!("{} is not part of {id}", std::any::type_name::<C>()))
            .write(row, value);
    }

    /// Overwrite the value of component `id` at a live row in place with a type-erased value.
    ///
    /// # Panics
    /// Same as [`Table::set`].
    pub fn set_boxed(&mut self, row: Row, id: component::Id, value: BoxedValue) {
        assert!(self.entity(row).is_some(), "row {} of {} is not live", row.index(), self.id);
        let table = self.id;
        self.column_by_id_mut(id)
            .unwrap_or_else(|| panic!("component {id} is not part of {table}"))
            .write_boxed(row, value);
    }

    /// Get the column for component type `C`.
    #[inline]
    pub fn column<C: Component>(&self) -> Option<&Column> {
        self.columns.iter().find(|col| col.info().is::<C>())
    }

    /// Get the column for component type `C` mutably.
    #[inline]
    pub fn column_mut<C: Component>(&mut self) -> Option<&mut Column> {
        self.columns.iter_mut().find(|col| col.info().is::<C>())
    }

    /// Get the column for a component id.
    #[inline]
    pub fn column_by_id(&self, id: component::Id) -> Option<&Column> {
        let index = self.shape.ids().binary_search(&id).ok()?;
        self.columns.get(index)
    }

    /// Get the column for a component id mutably.
    #[inline]
    pub fn column_by_id_mut(&mut self, id: component::Id) -> Option<&mut Column> {
        let index = self.shape.ids().binary_search(&id).ok()?;
        self.columns.get_mut(index)
    }

    /// Get the columns of this table, in shape order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Split the table into its shape, entity slots, and mutable columns so an iterator can hold
    /// all three for the same lifetime.
    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&Shape, &[Option<Entity>], &mut [Column]) {
        (&self.shape, &self.entities, &mut self.columns)
    }

    /// Verify that all columns have the same length as entities.
    ///
    /// # Panics
    /// Panics if any column length doesn't match the entity count.
    #[cfg(debug_assertions)]
    pub fn verify_invariants(&self) {
        let expected_len = self.entities.len();
        for column in self.columns.iter() {
            assert_eq!(
                column.len(),
                expected_len,
                "{:?} length {} doesn't match entity count {}",
                column,
                column.len(),
                expected_len
            );
        }
        debug_assert_eq!(
            self.entities.iter().filter(|slot| slot.is_some()).count(),
            self.live
        );
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("shape", &self.shape.ids())
            .field("live", &self.live)
            .field("rows", &self.entities.len())
            .finish()
    }
}

/// Writes the values of a [`component::Set`] into one row of a table.
struct RowWriter<'a> {
    table: &'a mut Table,
    row: Row,
}

impl component::Target for RowWriter<'_> {
    fn apply<C: Component>(&mut self, id: component::Id, value: C) {
        let table = self.table.id;
        match self.table.column_by_id_mut(id) {
            Some(column) => column.write(self.row, value),
            None => panic!(
                "{} is not part of {table}",
                std::any::type_name::<C>()
            ),
        }
    }
}
