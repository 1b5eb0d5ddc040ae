use strata_engine::ecs::{
    Component, Error, MutationKind, MutationTarget, Result, Simulation, System,
};

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Component, Debug, PartialEq)]
struct X(u32);

#[derive(Component, Debug, PartialEq)]
struct Y(u32);

#[derive(Component, Debug, PartialEq)]
struct Z(u32);

fn count<D: strata_engine::ecs::query::Data>(sim: &mut Simulation) -> usize {
    sim.execute::<D>().unwrap().count()
}

#[test]
fn thousand_entities_with_one_extra() {
    // Given
    let mut sim = Simulation::new();
    for i in 0..1000 {
        sim.create_entity((X(i), Y(i)));
    }
    sim.create_entity((X(1000), Y(1000), Z(0)));

    // Then
    assert_eq!(count::<&X>(&mut sim), 1001);
    assert_eq!(count::<&Y>(&mut sim), 1001);
    assert_eq!(count::<(&X, &Y, &Z)>(&mut sim), 1);
    assert_eq!(sim.table_count(), 2);
}

#[test]
fn thousand_empty_entities_grown_one_component_at_a_time() {
    // Given
    let mut sim = Simulation::new();
    let entities: Vec<_> = (0..1000).map(|_| sim.create_entity(())).collect();

    // When
    for (i, entity) in entities.iter().enumerate() {
        sim.add_component(*entity, X(i as u32)).unwrap();
        sim.add_component(*entity, Y(i as u32)).unwrap();
    }
    sim.add_component(entities[500], Z(1)).unwrap();
    sim.tick().unwrap();

    // Then
    assert_eq!(count::<&X>(&mut sim), 1000);
    assert_eq!(count::<&Y>(&mut sim), 1000);
    assert_eq!(count::<&Z>(&mut sim), 1);
    assert_eq!(count::<(&X, &Y, &Z)>(&mut sim), 1);
    assert_eq!(sim.table_count(), 2);
}

#[test]
fn every_holder_is_yielded_once() {
    // Given
    let mut sim = Simulation::new();
    let a = sim.create_entity(X(1));
    let b = sim.create_entity((X(2), Y(2)));
    let c = sim.create_entity((Z(3), X(3)));
    sim.create_entity(Y(4));

    // When
    let mut seen: Vec<_> = sim
        .execute::<&X>()
        .unwrap()
        .map(|(entity, x)| (entity.id(), x.0))
        .collect();
    seen.sort();

    // Then
    assert_eq!(seen, vec![(a, 1), (b, 2), (c, 3)]);
}

#[test]
fn movement_system_moves_position() {
    // Given
    let mut sim = Simulation::new();
    let entity = sim.create_entity((Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 1.0 }));
    sim.add_system(
        System::new("movement", |ctx| {
            for (_, (pos, vel)) in ctx.sim().execute::<(&mut Position, &Velocity)>()? {
                pos.x += vel.dx;
                pos.y += vel.dy;
            }
            Ok(())
        })
        .depends_on(["sim"]),
    )
    .unwrap();

    // When
    sim.tick().unwrap();

    // Then
    assert_eq!(
        sim.get_entity_component::<Position>(entity),
        Some(&Position { x: 1.0, y: 1.0 })
    );
}

#[test]
fn dependent_system_receives_producer_value() {
    // Given
    let mut sim = Simulation::new();
    sim.add_system(System::new("producer", |ctx| Ok(format!("tick {}", ctx.tick()))))
        .unwrap();
    sim.add_system(
        System::new("consumer", |ctx| {
            let message = ctx.input::<String>("producer")?;
            Ok(message.len())
        })
        .depends_on(["producer"]),
    )
    .unwrap();

    // When
    sim.tick().unwrap();

    // Then
    assert_eq!(sim.results().get::<String>("producer").map(String::as_str), Some("tick 0"));
    assert_eq!(sim.results().get::<usize>("consumer"), Some(&6));
}

#[test]
fn missing_producer_fails_the_tick() {
    // Given
    let mut sim = Simulation::new();
    sim.add_system(System::new("consumer", |_ctx| Ok(())).depends_on(["producer"]))
        .unwrap();

    // When
    let result = sim.tick();

    // Then
    assert_eq!(
        result,
        Err(Error::UnresolvedDependency {
            system: "consumer".into(),
            dependency: "producer".into(),
        })
    );
}

#[test]
fn wrongly_typed_input_is_reported() {
    // Given
    let mut sim = Simulation::new();
    sim.add_system(System::new("producer", |_ctx| Ok(1u8))).unwrap();
    sim.add_system(
        System::new("consumer", |ctx| -> Result<()> {
            ctx.input::<String>("producer")?;
            Ok(())
        })
        .depends_on(["producer"]),
    )
    .unwrap();

    // When
    let result = sim.tick();

    // Then
    assert!(matches!(
        result,
        Err(Error::DependencyType { system, dependency, .. })
            if system == "consumer" && dependency == "producer"
    ));
}

#[test]
fn reserved_and_duplicate_names_are_rejected() {
    // Given
    let mut sim = Simulation::new();
    sim.add_system(System::new("movement", |_ctx| Ok(()))).unwrap();

    // Then
    assert!(matches!(
        sim.add_system(System::new("sim", |_ctx| Ok(()))),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        sim.add_system(System::new("movement", |_ctx| Ok(()))),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        sim.add_system(System::new("", |_ctx| Ok(()))),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn mutation_window_spans_two_ticks() {
    // Given
    let mut sim = Simulation::new();
    let entity = sim.create_entity((X(1), Y(1)));
    sim.add_component(entity, Z(1)).unwrap();
    sim.remove_component::<Y>(entity).unwrap();

    // Then
    assert_eq!(sim.get_entity_mutations(entity).count(), 5);
    assert_eq!(sim.get_component_mutations::<Y>().count(), 2);

    // When
    sim.tick().unwrap();

    // Then
    assert_eq!(sim.get_entity_mutations(entity).count(), 5);
    let kinds: Vec<_> = sim
        .get_component_mutations::<Y>()
        .map(|m| (m.kind, m.tick))
        .collect();
    assert_eq!(kinds, vec![(MutationKind::Created, 0), (MutationKind::Removed, 0)]);

    // When
    sim.tick().unwrap();

    // Then
    assert_eq!(sim.get_entity_mutations(entity).count(), 0);
    assert!(sim.mutations().is_empty());
}

#[test]
fn mutations_recorded_by_systems_carry_their_tick() {
    // Given
    let mut sim = Simulation::new();
    sim.tick().unwrap();
    sim.add_system(System::new("spawner", |ctx| Ok(ctx.sim().create_entity(X(7)))))
        .unwrap();

    // When
    sim.tick().unwrap();

    // Then
    let entity = *sim
        .results()
        .get::<strata_engine::ecs::Entity>("spawner")
        .unwrap();
    let records: Vec<_> = sim
        .get_entity_mutations(entity)
        .map(|m| (m.target, m.kind, m.tick))
        .collect();
    assert_eq!(records[0], (MutationTarget::Entity, MutationKind::Created, 1));
    assert_eq!(records.len(), 2);
}

#[test]
fn duplicate_add_keeps_last_value() {
    // Given
    let mut sim = Simulation::new();
    let entity = sim.create_entity(X(1));

    // When
    sim.add_component(entity, X(2)).unwrap();
    sim.add_component(entity, X(3)).unwrap();

    // Then
    assert_eq!(sim.get_entity_component::<X>(entity), Some(&X(3)));
    assert_eq!(count::<&X>(&mut sim), 1);
}

#[test]
fn add_then_remove_restores_shape() {
    // Given
    let mut sim = Simulation::new();
    let entity = sim.create_entity((X(1), Y(1)));
    let shape = sim.get_entity(entity).unwrap().shape().clone();

    // When
    sim.add_component(entity, Z(1)).unwrap();
    sim.remove_component::<Z>(entity).unwrap();
    sim.tick().unwrap();

    // Then
    assert_eq!(sim.get_entity(entity).unwrap().shape(), &shape);
    assert_eq!(sim.get_entity_component::<X>(entity), Some(&X(1)));
    assert_eq!(sim.table_count(), 1);
}

#[test]
fn removed_entity_is_gone_and_id_never_reused() {
    // Given
    let mut sim = Simulation::new();
    let doomed = sim.create_entity(X(1));
    let survivor = sim.create_entity(X(2));

    // When
    sim.remove_entity(doomed).unwrap();
    sim.tick().unwrap();
    let fresh = sim.create_entity(X(3));

    // Then
    let ids: Vec<_> = sim
        .execute::<&X>()
        .unwrap()
        .map(|(entity, _)| entity.id())
        .collect();
    assert_eq!(ids, vec![survivor, fresh]);
    assert!(fresh > survivor);
    assert_ne!(fresh, doomed);
    assert!(sim.get_entity(doomed).is_none());
}

#[test]
fn structural_changes_during_iteration_are_deferred() {
    // Given
    let mut sim = Simulation::new();
    for i in 0..10 {
        sim.create_entity((X(i), Y(i)));
    }
    sim.add_system(System::new("splitter", |ctx| {
        let commands = ctx.commands();
        let mut seen = 0;
        for (entity, (x, _)) in ctx.sim().execute::<(&X, &Y)>()? {
            seen += 1;
            if x.0 % 2 == 0 {
                commands.remove_component::<Y>(entity.id());
                commands.create_entity(Z(x.0));
            }
        }
        Ok(seen)
    }))
    .unwrap();

    // When
    sim.tick().unwrap();

    // Then
    assert_eq!(sim.results().get::<i32>("splitter"), Some(&10));
    assert_eq!(count::<(&X, &Y)>(&mut sim), 5);
    assert_eq!(count::<&X>(&mut sim), 10);
    assert_eq!(count::<&Z>(&mut sim), 5);
    assert_eq!(sim.entity_count(), 15);
}

#[test]
fn emptied_tables_are_evicted_at_tick_end() {
    // Given
    let mut sim = Simulation::new();
    let lone = sim.create_entity((X(1), Z(1)));
    sim.create_entity(X(2));

    // When
    sim.remove_entity(lone).unwrap();

    // Then
    assert_eq!(sim.table_count(), 2);
    sim.tick().unwrap();
    assert_eq!(sim.table_count(), 1);
    assert_eq!(count::<&X>(&mut sim), 1);
}

#[test]
fn failing_system_leaves_no_queued_commands_behind() {
    // Given
    let mut sim = Simulation::new();
    let target = sim.create_entity(X(1));
    sim.add_system(System::new("queues_then_fails", move |ctx| -> Result<()> {
        let commands = ctx.commands();
        commands.remove_entity(target);
        commands.create_entity(Z(0));
        Err(Error::Configuration("fails after queueing".into()))
    }))
    .unwrap();

    for _ in 0..2 {
        // When
        let result = sim.tick();

        // Then
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(sim.commands().is_empty());
        assert!(sim.contains(target));
        assert_eq!(count::<&Z>(&mut sim), 0);
        assert_eq!(sim.current_tick(), 0);
    }
}

#[test]
fn failing_command_aborts_the_tick_and_discards_the_rest() {
    // Given
    let mut sim = Simulation::new();
    let doomed = sim.create_entity(X(1));
    let survivor = sim.create_entity(X(2));
    sim.add_system(System::new("double_remove", move |ctx| {
        let commands = ctx.commands();
        commands.remove_entity(doomed);
        commands.remove_entity(doomed);
        commands.add_component(survivor, Y(2));
        commands.create_entity(Z(3));
        Ok(())
    }))
    .unwrap();
    sim.add_system(System::new("after", |_ctx| Ok(())))
        .unwrap();

    // When
    let result = sim.tick();

    // Then
    assert!(matches!(result, Err(Error::EntityNotFound(entity)) if entity == doomed));
    assert!(sim.commands().is_empty());
    assert!(!sim.contains(doomed));
    assert!(sim.get_entity_component::<Y>(survivor).is_none());
    assert_eq!(count::<&Z>(&mut sim), 0);
    assert!(sim.results().get::<()>("after").is_none());
    assert_eq!(sim.current_tick(), 0);
}

#[test]
fn failing_flush_between_ticks_discards_the_rest() {
    // Given
    let mut sim = Simulation::new();
    let gone = sim.create_entity(X(1));
    let kept = sim.create_entity(X(2));
    sim.remove_entity(gone).unwrap();
    let commands = sim.commands();
    commands.add_component(gone, Y(1));
    commands.add_component(kept, Y(2));

    // When
    let result = sim.flush_commands();

    // Then
    assert!(matches!(result, Err(Error::EntityNotFound(entity)) if entity == gone));
    assert!(commands.is_empty());
    assert!(sim.get_entity_component::<Y>(kept).is_none());
}
