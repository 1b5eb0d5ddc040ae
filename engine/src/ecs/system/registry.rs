//! System registry for storing ECS systems in execution order.

use crate::ecs::{
    error::{Error, Result},
    system::{Id, SIM, System},
};

/// A registry for storing systems in registration order.
///
/// The registry assigns unique [`Id`]s to systems and rejects names that cannot be addressed as
/// dependencies: empty names, the reserved `sim`, and names already taken.
#[derive(Default)]
pub struct Registry {
    /// Every registered name, indexed by [`Id`].
    names: Vec<String>,

    /// The systems, in execution order. Empty while a tick has them checked out.
    systems: Vec<System>,
}

impl Registry {
    /// Create a new, empty system registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            names: Vec::new(),
            systems: Vec::new(),
        }
    }

    /// Register a system and return its unique identifier.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the name is empty, reserved, or already registered.
    pub fn register(&mut self, system: System) -> Result<Id> {
        let name = system.name();
        if name.is_empty() {
            return Err(Error::Configuration("system name must not be empty".into()));
        }
        if name == SIM {
            return Err(Error::Configuration(format!(
                "system name '{SIM}' is reserved for the simulation"
            )));
        }
        if self.contains(name) {
            return Err(Error::Configuration(format!(
                "a system named '{name}' is already registered"
            )));
        }

        let id = Id::new(self.names.len() as u32);
        log::trace!("registered system '{name}' as {id:?}");
        self.names.push(name.to_string());
        self.systems.push(system);
        Ok(id)
    }

    /// Determine if a system with `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|other| other == name)
    }

    /// Retrieve a system by its identifier.
    #[inline]
    pub fn get(&self, id: Id) -> Option<&System> {
        self.systems.get(id.index())
    }

    /// Get the registered names in execution order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get the number of registered systems.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no systems are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check the systems out for a tick. Names stay reserved.
    pub(crate) fn take(&mut self) -> Vec<System> {
        std::mem::take(&mut self.systems)
    }

    /// Return checked out systems, ahead of any registered while they were out.
    pub(crate) fn restore(&mut self, mut systems: Vec<System>) {
        systems.append(&mut self.systems);
        self.systems = systems;
    }
}
