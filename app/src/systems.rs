use log::info;
use strata_engine::ecs::{
    MutationKind, Result, Simulation, System,
    system::{self, SIM},
};

use crate::{
    components::{Debugging, Health, Lifetime, Position, Velocity},
    timing::{Frame, TIMING, Timing},
};

/// Register the demo systems in run order.
pub fn install(sim: &mut Simulation) -> Result<Vec<system::Id>> {
    [
        Timing::new().into_system(),
        update_positions(),
        undebug(),
        remove_dead(),
        print_frame(),
        track_debug_objects(),
    ]
    .into_iter()
    .map(|system| sim.add_system(system))
    .collect()
}

/// Move every entity by its velocity and report where it ended up.
pub fn update_positions() -> System {
    System::new("update_positions", |ctx| {
        for (entity, (position, velocity)) in ctx.sim().execute::<(&mut Position, &Velocity)>()? {
            position.x += velocity.dx;
            position.y += velocity.dy;
            info!("{} at ({:.1}, {:.1})", entity.id(), position.x, position.y);

            // Other components are reachable through the entity reference.
            if let Some(health) = entity.get::<Health>() {
                info!("{} health is {}", entity.id(), health.0);
            }
        }
        Ok(())
    })
    .depends_on([SIM])
}

pub fn undebug() -> System {
    System::new("undebug", |ctx| {
        let commands = ctx.commands();
        for (entity, _) in ctx.sim().execute::<&Debugging>()? {
            info!("removing debugging from {}", entity.id());
            commands.remove_component::<Debugging>(entity.id());
        }
        Ok(())
    })
}

/// Remove entities whose lifetime has run out.
pub fn remove_dead() -> System {
    System::new("remove_dead", |ctx| {
        let frame = ctx.input::<Frame>(TIMING)?.frame;
        let commands = ctx.commands();
        let mut removed = 0usize;
        for (entity, lifetime) in ctx.sim().execute::<&Lifetime>()? {
            if lifetime.0 <= frame {
                info!("{} expired in frame {frame}", entity.id());
                commands.remove_entity(entity.id());
                removed += 1;
            }
        }
        Ok(removed)
    })
    .depends_on([SIM, TIMING])
}

pub fn print_frame() -> System {
    System::new("print_frame", |ctx| {
        let frame = ctx.input::<Frame>(TIMING)?;
        info!("frame {} ({:?} since the last)", frame.frame, frame.delta);
        Ok(())
    })
    .depends_on([TIMING])
}

/// Report entities that lost [`Debugging`] in the previous tick.
pub fn track_debug_objects() -> System {
    System::new("track_debug_objects", |ctx| {
        let tick = ctx.tick();
        let sim = ctx.sim();
        for mutation in sim.get_component_mutations::<Debugging>() {
            let disabled = matches!(mutation.kind, MutationKind::Removed | MutationKind::Deleted);
            if disabled && mutation.tick + 1 == tick {
                info!("debugging was disabled on {}", mutation.entity);
            }
        }
        Ok(())
    })
    .depends_on([SIM])
}
