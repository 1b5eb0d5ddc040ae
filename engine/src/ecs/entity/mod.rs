//! Entity identifiers and allocation.
//!
//! An [`Entity`] is an opaque, monotonically increasing identifier. Ids are never recycled: once
//! an entity is removed its id is retired for the lifetime of the owning simulation, so a stale
//! id can never alias a newer entity.
//!
//! The [`Allocator`] hands out ids from an atomic counter. It is shared (behind an `Arc`) between a
//! simulation and the command queues it gives to systems, so deferred creation can return the new
//! entity immediately even though its row is written later.

mod reference;

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

pub use reference::Ref;
pub(crate) use reference::View;

/// An entity in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u64);

impl Entity {
    /// Get the raw id of this entity.
    #[inline]
    pub const fn id(&self) -> u64 {
        self.0
    }

    /// Get the index of this entity if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for Entity {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An allocator for entity ids.
///
/// Allocation only needs `&self`, which lets the simulation and its command queues share one
/// counter.
#[derive(Default, Debug)]
pub struct Allocator {
    /// Next fresh id to allocate.
    next_id: AtomicU64,
}

impl Allocator {
    /// Construct a new entity allocator starting from id 0.
    #[inline]
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
        }
    }

    /// Allocate a new entity.
    #[inline]
    pub fn alloc(&self) -> Entity {
        Entity(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate `count` entities with consecutive ids.
    pub fn alloc_many(&self, count: usize) -> Vec<Entity> {
        let first = self.next_id.fetch_add(count as u64, Ordering::Relaxed);
        (first..first + count as u64).map(Entity).collect()
    }

    /// The number of ids handed out so far.
    #[inline]
    pub fn allocated(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}
