//! Query result iterator that yields matching entities across multiple tables.
//!
//! The iterator traverses tables in creation order:
//!
//! 1. For each table whose shape contains all required components
//! 2. For each row within that table, skipping tombstones
//! 3. Yield an entity reference and the requested component data
//!
//! It implements [`ExactSizeIterator`]: the number of live rows in the visited tables is known
//! up front and cannot change while the iterator holds the storage borrow.

use std::{iter::Enumerate, rc::Rc, slice};

use crate::ecs::{
    entity::{self, Entity},
    query::data::{Columns, Data, DataSpec},
    storage::{Row, Storage, Table},
};

/// An iterator over query results yielding `(entity::Ref, item)` pairs.
///
/// # Type Parameters
///
/// - `'w`: The lifetime of the storage being queried
/// - `D`: The query data type (implements [`Data`])
///
/// # Examples
///
/// ```rust,ignore
/// let results = sim.execute::<(&Position, &mut Velocity)>()?;
///
/// // Know the count ahead of time
/// println!("Found {} entities", results.len());
///
/// for (entity, (pos, vel)) in results {
///     vel.dx += pos.x * 0.01;
/// }
/// ```
pub struct Result<'w, D: Data> {
    /// Matching tables not yet visited.
    tables: std::vec::IntoIter<&'w mut Table>,

    /// The query's column access.
    spec: DataSpec,

    /// The table currently being walked.
    cursor: Option<Cursor<'w, D>>,

    /// Items left to yield.
    remaining: usize,
}

/// Iteration state within one table.
struct Cursor<'w, D: Data> {
    entities: Enumerate<slice::Iter<'w, Option<Entity>>>,
    fetch: D::Fetch<'w>,
    view: Rc<entity::View<'w>>,
}

impl<'w, D: Data> Cursor<'w, D> {
    fn new(table: &'w mut Table, spec: &DataSpec) -> Self {
        let (shape, entities, columns) = table.parts_mut();
        let mut columns = Columns::new(shape, columns, spec);
        let fetch = D::fetch(&mut columns);
        Self {
            entities: entities.iter().enumerate(),
            fetch,
            view: Rc::new(columns.into_view()),
        }
    }
}

impl<'w, D: Data> Result<'w, D> {
    /// Construct a result over every non-empty table in `storage` whose shape contains the
    /// spec's required components.
    pub(crate) fn new(storage: &'w mut Storage, spec: DataSpec) -> Self {
        let required = spec.required();
        let tables: Vec<&'w mut Table> = storage
            .tables_mut()
            .iter_mut()
            .filter(|table| !table.is_empty() && table.shape().contains_all(&required))
            .collect();
        let remaining = tables.iter().map(|table| table.len()).sum();

        Self {
            tables: tables.into_iter(),
            spec,
            cursor: None,
            remaining,
        }
    }

    /// Get the number of results left to yield.
    #[inline]
    pub fn len(&self) -> usize {
        self.remaining
    }

    /// Determine if no results are left.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl<'w, D: Data> Iterator for Result<'w, D> {
    type Item = (entity::Ref<'w>, D::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cursor) = self.cursor.as_mut() {
                for (index, slot) in cursor.entities.by_ref() {
                    // Advance the fetch for every row so columns stay aligned with entities.
                    let item = D::next(&mut cursor.fetch);
                    if let (Some(entity), Some(item)) = (slot, item) {
                        self.remaining -= 1;
                        let reference =
                            entity::Ref::new(*entity, Row::new(index), Rc::clone(&cursor.view));
                        return Some((reference, item));
                    }
                }
            }

            let table = self.tables.next()?;
            self.cursor = Some(Cursor::new(table, &self.spec));
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<D: Data> ExactSizeIterator for Result<'_, D> {}
