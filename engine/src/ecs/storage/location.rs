use std::fmt;

use crate::ecs::storage::table;

/// Index of a slot in a table's entity list and in each of its columns.
///
/// Valid until the table is next pruned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row(usize);

impl Row {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for Row {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// Where a live entity sits: a table and a row in it.
///
/// The storage directory keeps one per entity and rewrites it whenever the entity migrates or
/// its table is compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    table_id: table::Id,
    row: Row,
}

impl Location {
    #[inline]
    pub const fn new(table_id: table::Id, row: Row) -> Self {
        Self { table_id, row }
    }

    #[inline]
    pub fn table_id(&self) -> table::Id {
        self.table_id
    }

    #[inline]
    pub fn row(&self) -> Row {
        self.row
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.table_id, self.row)
    }
}
