//! The simulation: entities, their components, the systems that run over them, and the record
//! of what changed.
//!
//! # Overview
//!
//! A [`Simulation`] owns everything it needs and shares nothing with other simulations:
//!
//! - **Components**: a per-simulation registry assigning dense ids to component types
//! - **Storage**: one table per shape plus the entity → location index
//! - **Systems**: named closures run in registration order by [`Simulation::tick`]
//! - **Mutations**: a two-tick window of structural changes
//! - **Commands**: a queue of deferred structural changes
//!
//! # Tick
//!
//! ```text
//! tick():
//!   for each system in registration order:
//!     check declared dependencies ──► UnresolvedDependency
//!     run(Context) ──► store value under the system's name
//!     apply queued commands
//!   prune tables, evict empty tables
//!   advance the tick counter
//!   rotate the mutation window
//! ```
//!
//! A failing system aborts the tick: the error is logged and returned, later systems do not run,
//! and the end-of-tick steps are skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_engine::ecs::{Component, Simulation, System};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Component)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let mut sim = Simulation::new();
//! let entity = sim.create_entity((Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 1.0 }));
//!
//! sim.add_system(System::new("movement", |ctx| {
//!     for (_, (pos, vel)) in ctx.sim().execute::<(&mut Position, &Velocity)>()? {
//!         pos.x += vel.dx;
//!         pos.y += vel.dy;
//!     }
//!     Ok(())
//! }))?;
//!
//! sim.tick()?;
//! assert_eq!(sim.get_entity_component::<Position>(entity).map(|p| p.x), Some(1.0));
//! ```

use std::sync::Arc;

use crate::ecs::{
    component::{self, BoxedSet, BoxedValue, Component, Set},
    entity::{self, Entity},
    error::{Error, Result},
    mutation::{Kind, Mutation, Target, Tracker},
    query::{self, Data, Query},
    storage::{Location, Storage, Write},
    system::{self, Command, CommandBuffer, Commands, Context, Results, System},
};

mod config;

pub use config::Config;

/// A self-contained entity component simulation.
pub struct Simulation {
    /// Settings this simulation was built with.
    config: Config,

    /// Component type registry, shared with command handles.
    components: Arc<component::Registry>,

    /// Tables and the entity index.
    storage: Storage,

    /// Entity id source, shared with command handles.
    allocator: Arc<entity::Allocator>,

    /// Deferred structural changes.
    command_buffer: Arc<CommandBuffer>,

    /// Registered systems.
    systems: system::Registry,

    /// Values produced by the systems of the last completed tick.
    results: Results,

    /// Structural change window.
    mutations: Tracker,

    /// The tick being run, or the next one to run between ticks.
    tick: u64,

    /// Set while `tick` runs systems, so a system cannot start another tick.
    in_tick: bool,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Create a simulation with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a simulation with the given settings.
    pub fn with_config(config: Config) -> Self {
        Self {
            storage: Storage::new(config.table_capacity),
            mutations: Tracker::new(config.track_mutations),
            config,
            components: Arc::new(component::Registry::new()),
            allocator: Arc::new(entity::Allocator::new()),
            command_buffer: Arc::new(CommandBuffer::new()),
            systems: system::Registry::new(),
            results: Results::default(),
            tick: 0,
            in_tick: false,
        }
    }

    /// Get the settings this simulation was built with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the component registry.
    #[inline]
    pub fn components(&self) -> &component::Registry {
        &self.components
    }

    #[inline]
    pub(crate) fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Get the number of the tick being run, or the next one to run between ticks.
    #[inline]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.storage.entity_count()
    }

    /// Get the number of tables, one per distinct shape in use.
    #[inline]
    pub fn table_count(&self) -> usize {
        self.storage.table_count()
    }

    /// Determine if `entity` is alive.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.storage.contains(entity)
    }

    /// Create an entity with the component values in `set` and return its id.
    ///
    /// Ids increase monotonically and are never reused. If `set` holds the same component type
    /// more than once, the last value wins.
    pub fn create_entity<S: Set>(&mut self, set: S) -> Entity {
        let entity = self.allocator.alloc();
        let location = self.storage.spawn(entity, set, &self.components);
        self.created(entity, location)
    }

    fn create_entity_boxed(&mut self, entity: Entity, values: BoxedSet) -> Entity {
        let location = self.storage.spawn_boxed(entity, values, &self.components);
        self.created(entity, location)
    }

    fn created(&mut self, entity: Entity, location: Location) -> Entity {
        log::trace!("created {entity} in {}", location.table_id());
        if self.mutations.is_enabled() {
            let ids = self.storage.table(location.table_id()).shape().ids();
            self.mutations
                .record(entity, Target::Entity, Kind::Created, self.tick);
            self.mutations
                .record_components(entity, ids.iter().copied(), Kind::Created, self.tick);
        }
        entity
    }

    /// Remove an entity and drop its components.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] if the entity is not alive.
    pub fn remove_entity(&mut self, entity: Entity) -> Result<()> {
        let values = self
            .storage
            .despawn(entity)
            .ok_or(Error::EntityNotFound(entity))?;
        log::trace!("removed {entity}");
        self.mutations
            .record_components(entity, values.ids(), Kind::Deleted, self.tick);
        self.mutations
            .record(entity, Target::Entity, Kind::Deleted, self.tick);
        Ok(())
    }

    /// Give an entity a component. If the entity already has a `C`, the value is replaced in
    /// place and recorded as [`Kind::Changed`].
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] if the entity is not alive.
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> Result<()> {
        let id = self.components.register::<C>();
        self.add_component_boxed(entity, id, Box::new(component))
    }

    fn add_component_boxed(
        &mut self,
        entity: Entity,
        id: component::Id,
        value: BoxedValue,
    ) -> Result<()> {
        let write = self
            .storage
            .add_boxed(entity, id, value, &self.components)
            .ok_or(Error::EntityNotFound(entity))?;
        let kind = match write {
            Write::Inserted => Kind::Added,
            Write::Overwritten => Kind::Changed,
        };
        self.mutations
            .record(entity, Target::Component(id), kind, self.tick);
        Ok(())
    }

    /// Take a component away from an entity and return it. Returns `Ok(None)`, recording
    /// nothing, if the entity has no `C`.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] if the entity is not alive.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> Result<Option<C>> {
        if !self.contains(entity) {
            return Err(Error::EntityNotFound(entity));
        }
        let Some(id) = self.components.get::<C>() else {
            return Ok(None);
        };
        let removed = self.remove_component_by_id(entity, id)?;
        Ok(removed
            .and_then(|value| value.downcast::<C>().ok())
            .map(|value| *value))
    }

    fn remove_component_by_id(
        &mut self,
        entity: Entity,
        id: component::Id,
    ) -> Result<Option<BoxedValue>> {
        if !self.contains(entity) {
            return Err(Error::EntityNotFound(entity));
        }
        let removed = self.storage.remove_boxed(entity, id, &self.components);
        if removed.is_some() {
            self.mutations
                .record(entity, Target::Component(id), Kind::Removed, self.tick);
        }
        Ok(removed)
    }

    /// Get a reference to a live entity.
    pub fn get_entity(&self, entity: Entity) -> Option<entity::Ref<'_>> {
        let location = self.storage.location(entity)?;
        let table = self.storage.table(location.table_id());
        Some(entity::Ref::of(table, entity, location.row()))
    }

    /// Get one component of a live entity.
    pub fn get_entity_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        let location = self.storage.location(entity)?;
        self.storage
            .table(location.table_id())
            .get::<C>(location.row())
    }

    /// Get one component of a live entity mutably. Writing through the reference is not a
    /// structural change and is not recorded.
    pub fn get_entity_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        let location = self.storage.location(entity)?;
        self.storage
            .table_mut(location.table_id())
            .get_mut::<C>(location.row())
    }

    /// Run a one-off query over every entity that has all the components `D` names.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `D` names a component more than once.
    pub fn execute<D: Data>(&mut self) -> Result<query::Result<'_, D>> {
        let spec = D::spec(&self.components);
        spec.validate(&self.components)?;
        Ok(query::Result::new(&mut self.storage, spec))
    }

    /// Build a reusable query for `D`.
    ///
    /// # Errors
    /// [`Error::Configuration`] if `D` names a component more than once.
    pub fn query<D: Data>(&self) -> Result<Query<D>> {
        Query::new(&self.components)
    }

    /// Register a system. Systems run in registration order; one registered while a tick is
    /// running first runs in the next tick.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the name is empty, `sim`, or already registered.
    pub fn add_system(&mut self, system: System) -> Result<system::Id> {
        self.systems.register(system)
    }

    /// Get the registered systems.
    #[inline]
    pub fn systems(&self) -> &system::Registry {
        &self.systems
    }

    /// Get the values the systems produced in the last completed tick.
    #[inline]
    pub fn results(&self) -> &Results {
        &self.results
    }

    /// Run every system once, then prune storage and advance the tick.
    ///
    /// # Errors
    /// The first error raised by a system, by a system's unmet dependency, or by applying a
    /// system's queued commands. The tick does not complete and any commands still queued are
    /// dropped. Calling `tick` from inside a running system is a [`Error::Configuration`].
    pub fn tick(&mut self) -> Result<()> {
        let tick = self.tick;
        if self.in_tick {
            let err = Error::Configuration(format!("tick {tick} is already running"));
            log::error!("{err}");
            return Err(err);
        }

        self.in_tick = true;
        let mut systems = self.systems.take();
        let outcome = self.run_systems(&mut systems);
        self.systems.restore(systems);
        self.in_tick = false;

        self.results = match outcome {
            Ok(results) => results,
            Err(err) => {
                let dropped = self.command_buffer.drain().len();
                if dropped > 0 {
                    log::warn!("tick {tick} aborted, dropped {dropped} queued commands");
                }
                return Err(err);
            }
        };

        let pruned = self.storage.prune();
        self.tick += 1;
        self.mutations.rotate();

        log::debug!(
            "tick {tick} complete: {} entities in {} tables, pruned {} rows and {} tables",
            self.entity_count(),
            self.table_count(),
            pruned.rows,
            pruned.tables
        );
        Ok(())
    }

    fn run_systems(&mut self, systems: &mut [System]) -> Result<Results> {
        let mut results = Results::default();
        for system in systems.iter_mut() {
            let name = system.name().to_string();
            if let Some(dependency) = system.unresolved(&results) {
                let err = Error::UnresolvedDependency {
                    system: name,
                    dependency: dependency.to_string(),
                };
                log::error!("{err}");
                return Err(err);
            }

            log::trace!("running system '{name}' in tick {}", self.tick);
            let output = system.run(&mut Context::new(self, &results, &name));
            let output = output.inspect_err(|err| log::error!("system '{name}' failed: {err}"))?;
            results.insert(name.as_str(), output);

            self.flush_commands().inspect_err(|err| {
                log::error!("commands queued by system '{name}' failed: {err}")
            })?;
        }
        Ok(results)
    }

    /// Get a handle for deferring structural changes.
    pub fn commands(&self) -> Commands {
        Commands::new(
            self.command_buffer.clone(),
            self.allocator.clone(),
            self.components.clone(),
        )
    }

    /// Apply every queued command in the order it was recorded.
    ///
    /// # Errors
    /// The first failing command's error. Commands queued after it are discarded.
    pub fn flush_commands(&mut self) -> Result<()> {
        for command in self.command_buffer.drain() {
            self.apply(command)?;
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Create { entity, components } => {
                self.create_entity_boxed(entity, components);
                Ok(())
            }
            Command::Remove { entity } => self.remove_entity(entity),
            Command::AddComponent { entity, id, value } => {
                self.add_component_boxed(entity, id, value)
            }
            Command::RemoveComponent { entity, id } => {
                self.remove_component_by_id(entity, id).map(|_| ())
            }
        }
    }

    /// Get the mutation window.
    #[inline]
    pub fn mutations(&self) -> &Tracker {
        &self.mutations
    }

    /// Iterate the visible mutations of component type `C`, in occurrence order.
    pub fn get_component_mutations<C: Component>(&self) -> impl Iterator<Item = &Mutation> {
        self.components
            .get::<C>()
            .into_iter()
            .flat_map(move |id| self.mutations.for_component(id))
    }

    /// Iterate the visible mutations of `entity`, in occurrence order.
    pub fn get_entity_mutations(&self, entity: Entity) -> impl Iterator<Item = &Mutation> {
        self.mutations.for_entity(entity)
    }
}
