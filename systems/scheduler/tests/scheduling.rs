use std::time::Duration;

use math_snake_core::{Command, GridPosition, Operation, SessionPhase};
use math_snake_system_scheduler::TickScheduler;
use math_snake_world::{self as world, query, World};

fn submit(world: &mut World, scheduler: &mut TickScheduler, command: Command) {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    scheduler.handle(&events, query::phase(world), query::tick_period(world));
}

fn frame(world: &mut World, scheduler: &mut TickScheduler, dt: Duration) -> usize {
    scheduler.elapse(dt);
    let mut ticks = 0;
    while let Some(command) = scheduler.poll() {
        ticks += 1;
        submit(world, scheduler, command);
    }
    ticks
}

fn running() -> (World, TickScheduler) {
    let mut world = World::new();
    let mut scheduler = TickScheduler::default();
    submit(
        &mut world,
        &mut scheduler,
        Command::SelectOperation {
            operation: Operation::Add,
        },
    );
    (world, scheduler)
}

#[test]
fn selecting_an_operation_arms_at_the_initial_period() {
    let (world, scheduler) = running();
    assert!(scheduler.is_armed());
    assert_eq!(scheduler.period(), Some(query::config(&world).initial_period()));
}

#[test]
fn each_period_advances_the_actor_once() {
    let (mut world, mut scheduler) = running();

    assert_eq!(frame(&mut world, &mut scheduler, Duration::from_millis(200)), 1);
    assert_eq!(query::actor(&world).head(), GridPosition::new(8, 7));

    assert_eq!(frame(&mut world, &mut scheduler, Duration::from_millis(100)), 0);
    assert_eq!(frame(&mut world, &mut scheduler, Duration::from_millis(100)), 1);
    assert_eq!(query::actor(&world).head(), GridPosition::new(9, 7));
}

#[test]
fn paused_sessions_do_not_tick() {
    let (mut world, mut scheduler) = running();
    submit(&mut world, &mut scheduler, Command::TogglePause);

    assert!(!scheduler.is_armed());
    assert_eq!(frame(&mut world, &mut scheduler, Duration::from_secs(2)), 0);
    assert_eq!(query::actor(&world).head(), GridPosition::new(7, 7));
}

#[test]
fn game_over_disarms_mid_catch_up() {
    let (mut world, mut scheduler) = running();

    let mut ticks = 0;
    for _ in 0..4 {
        ticks += frame(&mut world, &mut scheduler, Duration::from_secs(1));
    }

    assert_eq!(query::phase(&world), SessionPhase::GameOver);
    assert_eq!(ticks, 8);
    assert!(!scheduler.is_armed());
    assert_eq!(query::actor(&world).head(), GridPosition::new(14, 7));
}
