use std::{any::type_name, collections::HashMap};

use crate::ecs::{
    Simulation,
    error::{Error, Result},
    system::{Commands, Output, SIM},
};

/// The values produced by systems during one tick, keyed by system name.
///
/// Each system writes once, after it returns. Values are read-only for the rest of the tick.
#[derive(Default)]
pub struct Results {
    values: HashMap<String, Output>,
}

impl Results {
    /// Determine if a value is available under `name`. The reserved name `sim` is always
    /// available.
    pub fn contains(&self, name: &str) -> bool {
        name == SIM || self.values.contains_key(name)
    }

    /// Get the value stored under `name` if it has type `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.values.get(name)?.downcast_ref::<T>()
    }

    /// Get the number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no system has stored a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Output) {
        self.values.insert(name.into(), value);
    }
}

/// Everything a running system can reach.
pub struct Context<'a> {
    /// The simulation being ticked.
    sim: &'a mut Simulation,

    /// Values from systems that already ran this tick.
    results: &'a Results,

    /// The running system's name.
    system: &'a str,
}

impl<'a> Context<'a> {
    pub(crate) fn new(sim: &'a mut Simulation, results: &'a Results, system: &'a str) -> Self {
        Self {
            sim,
            results,
            system,
        }
    }

    /// Get the simulation. This is the value behind the reserved `sim` dependency.
    #[inline]
    pub fn sim(&mut self) -> &mut Simulation {
        self.sim
    }

    /// Get the value an earlier system produced this tick.
    ///
    /// # Errors
    /// - [`Error::UnresolvedDependency`] if no system named `name` has run yet this tick.
    /// - [`Error::DependencyType`] if that system's value is not a `T`.
    /// - [`Error::Configuration`] for `sim`, which is only reachable through [`Context::sim`].
    pub fn input<T: 'static>(&self, name: &str) -> Result<&'a T> {
        if name == SIM {
            return Err(Error::Configuration(format!(
                "system '{}' must reach '{SIM}' through Context::sim",
                self.system
            )));
        }
        let results = self.results;
        if !results.contains(name) {
            return Err(Error::UnresolvedDependency {
                system: self.system.to_string(),
                dependency: name.to_string(),
            });
        }
        results.get::<T>(name).ok_or_else(|| Error::DependencyType {
            system: self.system.to_string(),
            dependency: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Get a handle for deferring structural changes until this system returns.
    ///
    /// Take the handle before starting a query; the query borrows the simulation.
    #[inline]
    pub fn commands(&self) -> Commands {
        self.sim.commands()
    }

    /// Get the running system's name.
    #[inline]
    pub fn name(&self) -> &str {
        self.system
    }

    /// Get the number of the tick being run.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.sim.current_tick()
    }
}
