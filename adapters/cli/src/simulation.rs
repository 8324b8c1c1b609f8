//! Host-side driver that owns the world and pumps commands through every system.

use std::time::Duration;

use log::{debug, info};
use math_snake_core::{Command, Event, GridPosition, SessionConfig, SessionView};
use math_snake_rendering::{project, FrameInput, Scene};
use math_snake_system_input::{InputRouter, Intent, RoutingView};
use math_snake_system_quiz::{Quiz, QuizConfig};
use math_snake_system_scheduler::TickScheduler;
use math_snake_world::{self as world, query, World};

/// Owns the authoritative world together with the systems that react to it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    quiz: Quiz,
    router: InputRouter,
    scheduler: TickScheduler,
    ticks: u64,
}

impl Simulation {
    /// Builds a simulation waiting in the operation menu.
    pub(crate) fn new(session: SessionConfig, quiz: QuizConfig, seed: u64) -> Self {
        info!("starting session with seed {seed}");
        let mut simulation = Self {
            world: World::new(),
            quiz: Quiz::new(quiz, seed),
            router: InputRouter::default(),
            scheduler: TickScheduler::default(),
            ticks: 0,
        };
        simulation.execute(Command::ConfigureSession { config: session });
        simulation
    }

    /// Routes a frame's worth of player input and applies the surviving commands.
    pub(crate) fn submit_input(&mut self, input: &FrameInput) {
        if input.is_empty() {
            return;
        }

        let intents = intents_from_frame(input);
        let view = query::session_view(&self.world);
        let mut commands = Vec::new();
        self.router.handle(&intents, RoutingView::from(&view), &mut commands);
        for command in commands {
            self.execute(command);
        }
    }

    /// Advances host time, applying every tick the scheduler releases.
    ///
    /// Returns the number of ticks applied.
    pub(crate) fn advance(&mut self, dt: Duration) -> u32 {
        self.scheduler.elapse(dt);
        let mut applied = 0;
        while let Some(command) = self.scheduler.poll() {
            self.execute(command);
            applied += 1;
        }
        self.ticks = self.ticks.saturating_add(u64::from(applied));
        applied
    }

    /// Total ticks applied since the simulation was created.
    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Snapshot of the settled session.
    pub(crate) fn view(&self) -> SessionView {
        query::session_view(&self.world)
    }

    /// Replaces `scene` with a projection of the settled session.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        *scene = project(&self.view());
    }

    /// Applies `command` and pumps every resulting event through the systems until quiescent.
    fn execute(&mut self, command: Command) {
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            log_events(&events);

            let actor: Vec<GridPosition> = query::actor(&self.world).cells().collect();
            self.quiz.handle(
                &events,
                query::grid_size(&self.world),
                &actor,
                &mut pending,
            );
            self.scheduler.handle(
                &events,
                query::phase(&self.world),
                query::tick_period(&self.world),
            );
        }
    }
}

fn intents_from_frame(input: &FrameInput) -> Vec<Intent> {
    let mut intents = Vec::new();
    if input.return_to_menu {
        intents.push(Intent::ReturnToMenu);
    }
    if let Some(operation) = input.select_operation {
        intents.push(Intent::SelectOperation(operation));
    }
    if input.restart {
        intents.push(Intent::Restart);
    }
    if input.toggle_pause {
        intents.push(Intent::TogglePause);
    }
    intents.extend(input.steer.iter().copied().map(Intent::Steer));
    intents
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::GameOver { cause, score } => info!("game over: {cause:?} with score {score}"),
            Event::TickPeriodChanged { period } => {
                info!("tick period now {} ms", period.as_millis());
            }
            _ => debug!("{event:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_snake_core::{GridSize, Heading, Operation, SessionPhase};

    fn simulation() -> Simulation {
        Simulation::new(SessionConfig::default(), QuizConfig::default(), 5)
    }

    fn choose(simulation: &mut Simulation, operation: Operation) {
        simulation.submit_input(&FrameInput {
            select_operation: Some(operation),
            ..FrameInput::default()
        });
    }

    #[test]
    fn choosing_an_operation_installs_a_round() {
        let mut simulation = simulation();
        choose(&mut simulation, Operation::Multiply);

        let view = simulation.view();
        assert_eq!(view.phase, SessionPhase::Running);
        let problem = view.problem.expect("round installed");
        assert!(problem.question().contains(" x "));
        assert_eq!(view.targets.iter().filter(|t| t.is_correct).count(), 1);
    }

    #[test]
    fn session_settings_reach_the_world() {
        let session = SessionConfig {
            grid_size: GridSize::new(9),
            initial_period_ms: 300,
            ..SessionConfig::default()
        };
        let mut simulation = Simulation::new(session, QuizConfig::default(), 5);

        let view = simulation.view();
        assert_eq!(view.phase, SessionPhase::SelectingOperation);
        assert_eq!(view.actor, vec![GridPosition::new(4, 4)]);
        assert_eq!(view.tick_period, Duration::from_millis(300));

        choose(&mut simulation, Operation::Add);
        assert_eq!(simulation.advance(Duration::from_millis(200)), 0);
        assert_eq!(simulation.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn time_only_moves_the_actor_while_running() {
        let mut simulation = simulation();
        assert_eq!(simulation.advance(Duration::from_secs(1)), 0);

        choose(&mut simulation, Operation::Add);
        assert_eq!(simulation.advance(Duration::from_millis(200)), 1);
        assert_eq!(simulation.ticks(), 1);

        simulation.submit_input(&FrameInput {
            toggle_pause: true,
            ..FrameInput::default()
        });
        assert_eq!(simulation.advance(Duration::from_secs(1)), 0);
        assert_eq!(simulation.view().phase, SessionPhase::Paused);
    }

    #[test]
    fn steering_input_changes_the_committed_heading() {
        let mut simulation = simulation();
        choose(&mut simulation, Operation::Add);

        simulation.submit_input(&FrameInput {
            steer: vec![Heading::Left, Heading::Down],
            ..FrameInput::default()
        });

        assert_eq!(simulation.view().heading, Heading::Down);
    }

    #[test]
    fn every_round_stays_consistent_until_game_over() {
        let mut simulation = simulation();
        choose(&mut simulation, Operation::Subtract);

        for _ in 0..64 {
            let view = simulation.view();
            if view.phase == SessionPhase::GameOver {
                break;
            }
            let problem = view.problem.expect("settled sessions carry a round");
            let correct: Vec<_> = view.targets.iter().filter(|t| t.is_correct).collect();
            assert_eq!(correct.len(), 1);
            assert_eq!(correct[0].value, problem.answer());

            let mut cells = view.actor.clone();
            cells.sort();
            cells.dedup();
            assert_eq!(cells.len(), view.actor.len());

            let _ = simulation.advance(view.tick_period);
        }
        assert_eq!(simulation.view().phase, SessionPhase::GameOver);
    }

    #[test]
    fn scene_tracks_the_settled_view() {
        let mut simulation = simulation();
        choose(&mut simulation, Operation::Add);
        let mut scene = project(&simulation.view());

        let _ = simulation.advance(Duration::from_millis(200));
        simulation.populate_scene(&mut scene);

        assert_eq!(scene.actor[0].position, simulation.view().actor[0]);
        let question = simulation.view().problem.map(|p| p.question().to_owned());
        assert_eq!(scene.hud.question, question);
    }
}
