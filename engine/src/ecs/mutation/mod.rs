//! Structural mutation tracking.
//!
//! Every structural change to the simulation (entity creation or removal, a component being added,
//! overwritten or removed) is recorded as a [`Mutation`] tagged with the tick it happened in.
//! Systems read these records to react to changes without diffing storage themselves.
//!
//! # Visibility Window
//!
//! The [`Tracker`] keeps two buffers, like a double-buffered event stream:
//!
//! ```text
//!            tick N                 tick N+1               tick N+2
//!  ┌────────────────────┐ ┌────────────────────┐ ┌────────────────────┐
//!  │ record ─► current  │ │ current ─► previous│ │ previous dropped   │
//!  │ visible            │ │ still visible      │ │ not visible        │
//!  └────────────────────┘ └────────────────────┘ └────────────────────┘
//! ```
//!
//! A record is readable from the moment it is made until the end of the tick after the one it
//! was recorded in, so a system running before the mutating system in tick order still sees the
//! change on the next tick. Mutations made between ticks belong to the upcoming tick.
//!
//! Reads yield the previous buffer, then the current one, each in occurrence order. Records are
//! never coalesced.

use crate::ecs::{component, entity::Entity};

/// The kind of structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The entity was created, or the component was present at creation.
    Created,
    /// The entity was removed, or the component was dropped with it.
    Deleted,
    /// The component was attached to an existing entity.
    Added,
    /// The component was detached from an entity that still exists.
    Removed,
    /// The component's value was replaced by a new add.
    Changed,
}

/// What a mutation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The entity itself.
    Entity,
    /// One of the entity's components.
    Component(component::Id),
}

/// A single structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    /// The entity that changed.
    pub entity: Entity,
    /// What about the entity changed.
    pub target: Target,
    /// How it changed.
    pub kind: Kind,
    /// The tick the change happened in.
    pub tick: u64,
}

impl Mutation {
    /// Determine if this mutation concerns component `id`.
    #[inline]
    pub fn is_component(&self, id: component::Id) -> bool {
        self.target == Target::Component(id)
    }
}

/// Double-buffered record of structural mutations.
#[derive(Debug)]
pub struct Tracker {
    /// Index of the buffer being recorded into: 0 or 1.
    active_index: usize,

    /// The two buffers, one current and one previous.
    buffers: [Vec<Mutation>; 2],

    /// When false nothing is recorded.
    enabled: bool,
}

impl Tracker {
    /// Create a new tracker.
    pub fn new(enabled: bool) -> Self {
        Self {
            active_index: 0,
            buffers: [Vec::new(), Vec::new()],
            enabled,
        }
    }

    /// Determine if mutations are being recorded.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a record to the current buffer.
    pub fn record(&mut self, entity: Entity, target: Target, kind: Kind, tick: u64) {
        if !self.enabled {
            return;
        }
        log::trace!("{kind:?} {target:?} on {entity} in tick {tick}");
        self.buffers[self.active_index].push(Mutation {
            entity,
            target,
            kind,
            tick,
        });
    }

    /// Record a mutation of each component in `ids`.
    pub fn record_components(
        &mut self,
        entity: Entity,
        ids: impl IntoIterator<Item = component::Id>,
        kind: Kind,
        tick: u64,
    ) {
        if !self.enabled {
            return;
        }
        for id in ids {
            self.record(entity, Target::Component(id), kind, tick);
        }
    }

    /// Iterate every visible record: previous window first, then current, in occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.buffers[1 - self.active_index]
            .iter()
            .chain(self.buffers[self.active_index].iter())
    }

    /// Iterate the visible records for component `id`.
    pub fn for_component(&self, id: component::Id) -> impl Iterator<Item = &Mutation> {
        self.iter().filter(move |mutation| mutation.is_component(id))
    }

    /// Iterate the visible records for `entity`.
    pub fn for_entity(&self, entity: Entity) -> impl Iterator<Item = &Mutation> {
        self.iter().filter(move |mutation| mutation.entity == entity)
    }

    /// Get the number of visible records.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffers[0].len() + self.buffers[1].len()
    }

    /// Returns `true` if no records are visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the current window at the end of a tick.
    ///
    /// The previous window is dropped and the current one becomes previous.
    pub(crate) fn rotate(&mut self) {
        self.active_index = 1 - self.active_index;
        self.buffers[self.active_index].clear();
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(true)
    }
}
