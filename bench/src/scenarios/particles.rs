//! A particle field: many small entities that move, fade, die and are replaced.
//!
//! Every tick runs five systems. `delta` publishes the step size; `movement` and
//! `lifetime_decay` read it as an input; `fade` and `kill_particles` run after the decay. Dead
//! particles are removed and replaced through commands, so the tick also measures deferred
//! structural changes and the end-of-tick prune.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_engine::ecs::{Config, Simulation, System};

use crate::{
    components::{Color, Lifetime, Particle, Position, Velocity},
    scenarios::Scenario,
};

/// The system producing the simulated delta time.
const DELTA: &str = "delta";

/// Sizing of the particle workload.
pub struct ParticleConfig {
    /// Particles alive at any time. Each dead particle is replaced in the same tick.
    pub particle_count: usize,
    /// Seconds advanced per tick, handed to systems through the `delta` system.
    pub delta_time: f32,
    /// Seed for the particle generator so runs are comparable.
    pub seed: u64,
    /// Record structural mutations while ticking.
    pub track_mutations: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 100_000,
            delta_time: 1.0 / 60.0,
            seed: 12345,
            track_mutations: true,
        }
    }
}

/// Deterministic source of fresh particles.
struct ParticleFactory(ChaCha8Rng);

impl ParticleFactory {
    fn spread(&mut self, extent: f32) -> [f32; 3] {
        let rng = &mut self.0;
        [
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        ]
    }

    fn create_particle(&mut self) -> (Particle, Position, Velocity, Lifetime, Color) {
        let [x, y, z] = self.spread(100.0);
        let [vx, vy, vz] = self.spread(10.0);
        let [r, g, b] = self.spread(1.0).map(f32::abs);
        let remaining = self.0.gen_range(1.0..5.0);

        (
            Particle,
            Position { x, y, z },
            Velocity { x: vx, y: vy, z: vz },
            Lifetime {
                remaining,
                total: 5.0,
            },
            Color { r, g, b, a: 1.0 },
        )
    }
}

fn system_delta(delta_time: f32) -> System {
    System::new(DELTA, move |_ctx| Ok(delta_time))
}

/// System: Update particle positions based on velocity.
fn system_movement() -> System {
    System::new("movement", |ctx| {
        let dt = *ctx.input::<f32>(DELTA)?;
        for (_, (pos, vel)) in ctx.sim().execute::<(&mut Position, &Velocity)>()? {
            pos.x += vel.x * dt;
            pos.y += vel.y * dt;
            pos.z += vel.z * dt;
        }
        Ok(())
    })
    .depends_on([DELTA])
}

/// System: Decay particle lifetimes.
fn system_lifetime_decay() -> System {
    System::new("lifetime_decay", |ctx| {
        let dt = *ctx.input::<f32>(DELTA)?;
        for (_, lifetime) in ctx.sim().execute::<&mut Lifetime>()? {
            lifetime.remaining -= dt;
        }
        Ok(())
    })
    .depends_on([DELTA])
}

/// System: Fade particles based on remaining lifetime.
fn system_fade() -> System {
    System::new("fade", |ctx| {
        for (_, (lifetime, color)) in ctx.sim().execute::<(&Lifetime, &mut Color)>()? {
            color.a = (lifetime.remaining / lifetime.total).max(0.0);
        }
        Ok(())
    })
    .depends_on(["lifetime_decay"])
}

/// System: Replace dead particles (lifetime <= 0) with fresh ones.
fn system_kill_particles(mut factory: ParticleFactory) -> System {
    System::new("kill_particles", move |ctx| {
        let commands = ctx.commands();
        let mut killed = 0usize;
        for (entity, life) in ctx.sim().execute::<&Lifetime>()? {
            if life.remaining <= 0.0 {
                commands.remove_entity(entity.id());
                commands.create_entity(factory.create_particle());
                killed += 1;
            }
        }
        Ok(killed)
    })
    .depends_on(["lifetime_decay"])
}

/// The particle workload and the simulation it drives.
pub struct ParticleScenario {
    config: ParticleConfig,
    sim: Simulation,
}

impl ParticleScenario {
    pub fn new() -> Self {
        Self::with_config(ParticleConfig::default())
    }

    pub fn with_config(config: ParticleConfig) -> Self {
        Self {
            sim: Simulation::with_config(
                Config::default()
                    .track_mutations(config.track_mutations)
                    .table_capacity(config.particle_count),
            ),
            config,
        }
    }

    /// Live particles right now.
    pub fn current_count(&self) -> usize {
        self.sim.entity_count()
    }

    /// Get the simulation being driven.
    pub fn sim(&self) -> &Simulation {
        &self.sim
    }
}

impl Default for ParticleScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for ParticleScenario {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn description(&self) -> &'static str {
        "High-volume particle system with movement, lifetime, and respawn"
    }

    fn entity_count(&self) -> usize {
        self.config.particle_count
    }

    fn setup(&mut self) {
        let mut factory = ParticleFactory(ChaCha8Rng::seed_from_u64(self.config.seed));
        for _ in 0..self.config.particle_count {
            self.sim.create_entity(factory.create_particle());
        }

        let systems = [
            system_delta(self.config.delta_time),
            system_movement(),
            system_lifetime_decay(),
            system_fade(),
            system_kill_particles(factory),
        ];
        for system in systems {
            if let Err(err) = self.sim.add_system(system) {
                panic!("particle scenario systems are misconfigured: {err}");
            }
        }
    }

    fn update(&mut self) {
        if let Err(err) = self.sim.tick() {
            panic!("particle scenario tick failed: {err}");
        }
    }

    fn teardown(&mut self) {
        let entities: Vec<_> = match self.sim.execute::<()>() {
            Ok(results) => results.map(|(entity, _)| entity.id()).collect(),
            Err(err) => panic!("cannot list particles: {err}"),
        };
        for entity in entities {
            let _ = self.sim.remove_entity(entity);
        }
        let _ = self.sim.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_scenario_setup() {
        let mut scenario = ParticleScenario::with_config(ParticleConfig {
            particle_count: 100,
            ..Default::default()
        });

        scenario.setup();
        assert_eq!(scenario.current_count(), 100);

        scenario.teardown();
        assert_eq!(scenario.current_count(), 0);
    }

    #[test]
    fn particle_scenario_update() {
        let mut scenario = ParticleScenario::with_config(ParticleConfig {
            particle_count: 100,
            delta_time: 1.0,
            ..Default::default()
        });

        scenario.setup();

        for _ in 0..10 {
            scenario.update();
        }

        // Every dead particle is replaced in the same tick.
        assert_eq!(scenario.current_count(), 100);
        assert!(scenario.sim().results().get::<usize>("kill_particles").is_some());

        scenario.teardown();
    }

    #[test]
    fn untracked_particles_record_nothing() {
        // Given
        let mut scenario = ParticleScenario::with_config(ParticleConfig {
            particle_count: 50,
            delta_time: 2.0,
            track_mutations: false,
            ..Default::default()
        });
        scenario.setup();

        // When
        scenario.update();
        scenario.update();

        // Then
        assert_eq!(scenario.current_count(), 50);
        assert!(scenario.sim().mutations().is_empty());
    }
}
