use std::{thread, time::Duration};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};
use strata_engine::ecs::{Config, Simulation};

use crate::{
    components::{Debugging, Health, Lifetime, Position, Velocity},
    logger::ChannelLogger,
};

mod components;
mod logger;
mod systems;
mod timing;

#[derive(Debug, Parser)]
#[command(author, version, about = "Strata simulation demo")]
struct Cli {
    /// Number of ticks to run; runs until interrupted when omitted
    #[arg(long)]
    ticks: Option<u64>,

    /// Milliseconds to wait between ticks
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Most verbose log level to print
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Extra moving entities to create at startup
    #[arg(long, default_value_t = 0)]
    entities: u32,

    /// Turn off mutation tracking
    #[arg(long)]
    no_mutations: bool,

    /// Rows reserved up front in each new table
    #[arg(long, default_value_t = 0)]
    table_capacity: usize,
}

fn populate(sim: &mut Simulation, extra: u32) -> Result<()> {
    sim.create_entity((
        Position::default(),
        Velocity { dx: 1.0, dy: 1.0 },
        Health(25.0),
    ));
    let short_lived = sim.create_entity((Position::default(), Velocity::default(), Lifetime(3)));
    sim.add_component(short_lived, Debugging)?;

    for i in 0..extra {
        let angle = i as f32 * 0.1;
        sim.create_entity((
            Position::default(),
            Velocity {
                dx: angle.cos(),
                dy: angle.sin(),
            },
        ));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (logger, receiver) = ChannelLogger::with_receiver(cli.log_level);
    logger.install()?;

    let config = Config::default()
        .track_mutations(!cli.no_mutations)
        .table_capacity(cli.table_capacity);
    let mut sim = Simulation::with_config(config);
    systems::install(&mut sim)?;
    populate(&mut sim, cli.entities)?;
    logger::drain(&receiver);

    let interval = Duration::from_millis(cli.interval_ms);
    let mut remaining = cli.ticks;
    while remaining != Some(0) {
        let outcome = sim.tick();
        logger::drain(&receiver);
        outcome?;

        remaining = remaining.map(|ticks| ticks - 1);
        if remaining != Some(0) {
            thread::sleep(interval);
        }
    }

    info!(
        "finished after {} ticks with {} entities in {} tables",
        sim.current_tick(),
        sim.entity_count(),
        sim.table_count()
    );
    logger::drain(&receiver);
    Ok(())
}
