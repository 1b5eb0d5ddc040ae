use strata_engine::ecs::Component;

#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health(pub f32);

/// The frame after which an entity is removed.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Lifetime(pub u64);

/// Marks an entity for one round of extra logging.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Debugging;
