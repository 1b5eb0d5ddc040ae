//! Component types shared by the micro and scenario benchmarks.

use strata_engine::ecs::Component;

/// World-space position.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Units per second along each axis.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Euler angles in radians.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Column-major model matrix. Padding for the four-component layouts.
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub matrix: [[f32; 4]; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

/// Tags particle entities.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Particle;

/// Seconds left to live out of `total`.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
    pub total: f32,
}

/// Linear RGBA, alpha fades with lifetime.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// The payload every fragmented shape shares.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Data {
    pub value: f64,
}

// One zero-sized marker per fragmented shape
macro_rules! define_marker_components {
    ($($name:ident),*) => {
        $(
            #[derive(Component, Debug, Default, Clone, Copy)]
            pub struct $name;
        )*
    };
}

define_marker_components!(
    MarkerA, MarkerB, MarkerC, MarkerD, MarkerE, MarkerF, MarkerG, MarkerH, MarkerI, MarkerJ,
    MarkerK, MarkerL, MarkerM, MarkerN, MarkerO, MarkerP, MarkerQ, MarkerR, MarkerS, MarkerT,
    MarkerU, MarkerV, MarkerW, MarkerX, MarkerY, MarkerZ
);

/// Spawn `per_shape` entities for each of 26 shapes, each `Data` plus one marker.
pub fn spawn_fragmented(sim: &mut strata_engine::ecs::Simulation, per_shape: usize) {
    macro_rules! spawn_each {
        ($($marker:ident),*) => {
            $(
                for _ in 0..per_shape {
                    sim.create_entity((Data { value: 1.0 }, $marker));
                }
            )*
        };
    }

    spawn_each!(
        MarkerA, MarkerB, MarkerC, MarkerD, MarkerE, MarkerF, MarkerG, MarkerH, MarkerI, MarkerJ,
        MarkerK, MarkerL, MarkerM, MarkerN, MarkerO, MarkerP, MarkerQ, MarkerR, MarkerS, MarkerT,
        MarkerU, MarkerV, MarkerW, MarkerX, MarkerY, MarkerZ
    );
}
