pub mod component;
pub mod entity;
pub mod error;
pub mod mutation;
pub mod query;
pub mod simulation;
pub(crate) mod storage;
pub mod system;
pub(crate) mod util;

pub use component::Component;
pub use entity::Entity;
pub use error::{Error, Result};
pub use mutation::{Kind as MutationKind, Mutation, Target as MutationTarget};
pub use simulation::{Config, Simulation};
pub use system::{Commands, Context, System};

pub use strata_macros::Component;
