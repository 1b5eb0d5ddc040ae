//! Deferred command buffer for entity and component operations.
//!
//! A query borrows the simulation for as long as it is iterated, so a system cannot create or
//! remove entities, or change an entity's shape, in the middle of a loop. Instead it records the
//! change on a [`Commands`] handle and the scheduler applies the queue as soon as the system
//! returns.
//!
//! # Lifecycle
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Tick                               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  System A ──push──► CommandBuffer ──flush──► Simulation      │
//! │  System B ──push──► CommandBuffer ──flush──► Simulation      │
//! │                        (after each system)                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! sim.add_system(System::new("reaper", |ctx| {
//!     let commands = ctx.commands();
//!     for (entity, health) in ctx.sim().execute::<&Health>()? {
//!         if health.0 == 0 {
//!             commands.remove_entity(entity.id());
//!         }
//!     }
//!     Ok(())
//! }))?;
//! ```

use std::sync::Arc;

use crossbeam::queue::SegQueue;

use crate::ecs::{
    component::{self, BoxedSet, BoxedValue, Component, Set},
    entity::{Allocator, Entity},
};

/// A deferred entity command.
pub enum Command {
    /// Create a new entity with the given components.
    ///
    /// The entity ID is allocated when the command is recorded, so the caller can refer to the
    /// entity before it exists in storage.
    Create {
        /// The pre-allocated entity ID.
        entity: Entity,
        /// Type-erased component values to attach.
        components: BoxedSet,
    },

    /// Remove an entity and all its components.
    Remove {
        /// The entity to remove.
        entity: Entity,
    },

    /// Add a component to an existing entity, overwriting any value it already has.
    AddComponent {
        /// The target entity.
        entity: Entity,
        /// The component type.
        id: component::Id,
        /// The component value.
        value: BoxedValue,
    },

    /// Remove a component from an existing entity.
    RemoveComponent {
        /// The target entity.
        entity: Entity,
        /// The component type.
        id: component::Id,
    },
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Create { entity, components } => f
                .debug_struct("Create")
                .field("entity", entity)
                .field("components", components)
                .finish(),
            Command::Remove { entity } => f.debug_struct("Remove").field("entity", entity).finish(),
            Command::AddComponent { entity, id, .. } => f
                .debug_struct("AddComponent")
                .field("entity", entity)
                .field("id", id)
                .finish(),
            Command::RemoveComponent { entity, id } => f
                .debug_struct("RemoveComponent")
                .field("entity", entity)
                .field("id", id)
                .finish(),
        }
    }
}

/// Thread-safe command buffer using a lock-free queue.
///
/// Uses `crossbeam::queue::SegQueue` internally, so recording is lock-free and handles can be
/// cloned freely.
#[derive(Default)]
pub struct CommandBuffer {
    commands: SegQueue<Command>,
}

impl CommandBuffer {
    /// Create a new empty command buffer.
    pub fn new() -> Self {
        Self {
            commands: SegQueue::new(),
        }
    }

    /// Push a command to the buffer.
    pub fn push(&self, command: Command) {
        self.commands.push(command);
    }

    /// Drain all commands from the buffer in FIFO order.
    pub fn drain(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.commands.len());
        while let Some(cmd) = self.commands.pop() {
            commands.push(cmd);
        }
        commands
    }

    /// Get the number of queued commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A handle for recording deferred structural changes.
///
/// Handles are cheap to clone and all handles of one simulation share a single queue. They do
/// not borrow the simulation, so one can be held while a query is being iterated.
#[derive(Clone)]
pub struct Commands {
    buffer: Arc<CommandBuffer>,
    allocator: Arc<Allocator>,
    components: Arc<component::Registry>,
}

impl Commands {
    pub(crate) fn new(
        buffer: Arc<CommandBuffer>,
        allocator: Arc<Allocator>,
        components: Arc<component::Registry>,
    ) -> Self {
        Self {
            buffer,
            allocator,
            components,
        }
    }

    /// Queue the creation of an entity and return its id right away.
    pub fn create_entity<S: Set>(&self, set: S) -> Entity {
        let entity = self.allocator.alloc();
        self.buffer.push(Command::Create {
            entity,
            components: BoxedSet::new(set, &self.components),
        });
        entity
    }

    /// Queue the removal of an entity.
    pub fn remove_entity(&self, entity: Entity) {
        self.buffer.push(Command::Remove { entity });
    }

    /// Queue adding (or overwriting) a component on an entity.
    pub fn add_component<C: Component>(&self, entity: Entity, component: C) {
        self.buffer.push(Command::AddComponent {
            entity,
            id: self.components.register::<C>(),
            value: Box::new(component),
        });
    }

    /// Queue removing a component from an entity.
    pub fn remove_component<C: Component>(&self, entity: Entity) {
        self.buffer.push(Command::RemoveComponent {
            entity,
            id: self.components.register::<C>(),
        });
    }

    /// Get the number of queued commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
