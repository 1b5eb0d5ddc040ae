//! Single operations measured in isolation: entity creation and removal, shaped iteration,
//! migration between tables, and the fixed cost of a tick.

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use strata_bench::components::*;
use strata_engine::ecs::{Entity, Simulation, System};

fn spawn_movers(sim: &mut Simulation, n: usize) -> Vec<Entity> {
    (0..n)
        .map(|i| {
            sim.create_entity((
                Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },
                Velocity {
                    x: 1.0,
                    y: 0.0,
                    z: 0.0,
                },
            ))
        })
        .collect()
}

// create

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("single_component", count), &count, |b, &n| {
            b.iter(|| {
                let mut sim = Simulation::new();
                for _ in 0..n {
                    black_box(sim.create_entity(Position::default()));
                }
            });
        });

        // 4 components like ecs_bench_suite
        group.bench_with_input(BenchmarkId::new("four_components", count), &count, |b, &n| {
            b.iter(|| {
                let mut sim = Simulation::new();
                for _ in 0..n {
                    black_box(sim.create_entity((
                        Transform::default(),
                        Position::default(),
                        Rotation::default(),
                        Velocity::default(),
                    )));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("deferred", count), &count, |b, &n| {
            b.iter(|| {
                let mut sim = Simulation::new();
                let commands = sim.commands();
                for _ in 0..n {
                    black_box(commands.create_entity(Position::default()));
                }
                sim.flush_commands().unwrap();
            });
        });
    }

    group.finish();
}

// iteration

fn bench_simple_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_iter");

    for count in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("pos_vel", count), &count, |b, &n| {
            let mut sim = Simulation::new();
            spawn_movers(&mut sim, n);

            b.iter(|| {
                for (_, (pos, vel)) in sim.execute::<(&mut Position, &Velocity)>().unwrap() {
                    pos.x += vel.x;
                    pos.y += vel.y;
                    pos.z += vel.z;
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("prepared", count), &count, |b, &n| {
            let mut sim = Simulation::new();
            spawn_movers(&mut sim, n);
            let query = sim.query::<(&mut Position, &Velocity)>().unwrap();

            b.iter(|| {
                for (_, (pos, vel)) in query.invoke(&mut sim) {
                    pos.x += vel.x;
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("four_components", count), &count, |b, &n| {
            let mut sim = Simulation::new();
            for _ in 0..n {
                sim.create_entity((
                    Transform::default(),
                    Position::default(),
                    Rotation::default(),
                    Velocity::default(),
                ));
            }

            b.iter(|| {
                for (_, (pos, vel, _rot, _transform)) in sim
                    .execute::<(&mut Position, &Velocity, &Rotation, &Transform)>()
                    .unwrap()
                {
                    pos.x += vel.x;
                    pos.y += vel.y;
                    pos.z += vel.z;
                }
            });
        });
    }

    group.finish();
}

// fragmented iteration

fn bench_fragmented_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragmented_iter");

    // 26 shapes with 20 entities each (like ecs_bench_suite)
    let per_shape = 20;
    group.throughput(Throughput::Elements((26 * per_shape) as u64));

    group.bench_function("26_shapes", |b| {
        let mut sim = Simulation::new();
        spawn_fragmented(&mut sim, per_shape);

        b.iter(|| {
            for (_, data) in sim.execute::<&mut Data>().unwrap() {
                data.value *= 2.0;
            }
        });
    });

    group.finish();
}

// component migration

fn bench_add_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_remove");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("add_component", count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let mut sim = Simulation::new();
                    let entities: Vec<_> =
                        (0..n).map(|_| sim.create_entity(Position::default())).collect();
                    (sim, entities)
                },
                |(mut sim, entities)| {
                    for entity in entities {
                        sim.add_component(entity, Velocity::default()).unwrap();
                    }
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(
            BenchmarkId::new("remove_component", count),
            &count,
            |b, &n| {
                b.iter_batched(
                    || {
                        let mut sim = Simulation::new();
                        let entities = spawn_movers(&mut sim, n);
                        (sim, entities)
                    },
                    |(mut sim, entities)| {
                        for entity in entities {
                            black_box(sim.remove_component::<Velocity>(entity).unwrap());
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        group.bench_with_input(BenchmarkId::new("overwrite", count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let mut sim = Simulation::new();
                    let entities = spawn_movers(&mut sim, n);
                    (sim, entities)
                },
                |(mut sim, entities)| {
                    for entity in entities {
                        sim.add_component(entity, Velocity::default()).unwrap();
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// remove

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("remove_and_prune", count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let mut sim = Simulation::new();
                    let entities = spawn_movers(&mut sim, n);
                    (sim, entities)
                },
                |(mut sim, entities)| {
                    for entity in entities.into_iter().step_by(2) {
                        sim.remove_entity(entity).unwrap();
                    }
                    sim.tick().unwrap();
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// tick

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("chained_systems", count), &count, |b, &n| {
            let mut sim = Simulation::new();
            spawn_movers(&mut sim, n);
            sim.add_system(System::new("dt", |_ctx| Ok(0.016f32))).unwrap();
            sim.add_system(
                System::new("movement", |ctx| {
                    let dt = *ctx.input::<f32>("dt")?;
                    let mut moved = 0usize;
                    for (_, (pos, vel)) in ctx.sim().execute::<(&mut Position, &Velocity)>()? {
                        pos.x += vel.x * dt;
                        moved += 1;
                    }
                    Ok(moved)
                })
                .depends_on(["dt"]),
            )
            .unwrap();

            b.iter(|| sim.tick().unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_create,
    bench_simple_iter,
    bench_fragmented_iter,
    bench_add_remove,
    bench_remove,
    bench_tick,
);

criterion_main!(benches);
