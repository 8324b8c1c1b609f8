#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Math Snake.

pub mod actor;
pub mod collision;
pub mod round;

use std::time::Duration;

use log::{debug, info, warn};
use math_snake_core::{
    Command, Event, FatalCollision, Heading, Operation, Outcome, Problem, SessionConfig,
    SessionPhase, Target,
};

pub use actor::{compute_next_head, Actor};
pub use collision::resolve;
pub use round::validate_round;

const INITIAL_HEADING: Heading = Heading::Right;

/// Represents the authoritative Math Snake session state.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    phase: SessionPhase,
    operation: Option<Operation>,
    actor: Actor,
    heading: Heading,
    problem: Option<Problem>,
    targets: Vec<Target>,
    round_pending: bool,
    score: u32,
    tick_period: Duration,
    tick_index: u64,
    fatal: Option<FatalCollision>,
}

impl World {
    /// Creates a new world waiting for an operation, using the default tuning.
    ///
    /// Hosts retune the session with [`Command::ConfigureSession`].
    #[must_use]
    pub fn new() -> Self {
        let config = SessionConfig::default();
        Self {
            actor: Actor::spawn(config.grid_size.center()),
            heading: INITIAL_HEADING,
            phase: SessionPhase::SelectingOperation,
            operation: None,
            problem: None,
            targets: Vec::new(),
            round_pending: false,
            score: 0,
            tick_period: config.initial_period(),
            tick_index: 0,
            fatal: None,
            config,
        }
    }

    fn reset_session(&mut self) {
        self.actor = Actor::spawn(self.config.grid_size.center());
        self.heading = INITIAL_HEADING;
        self.problem = None;
        self.targets.clear();
        self.round_pending = false;
        self.score = 0;
        self.tick_period = self.config.initial_period();
        self.tick_index = 0;
        self.fatal = None;
    }

    fn set_phase(&mut self, phase: SessionPhase, out_events: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        info!("session phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        out_events.push(Event::PhaseChanged { phase });
    }

    fn request_round(&mut self, out_events: &mut Vec<Event>) {
        self.problem = None;
        self.targets.clear();
        let Some(operation) = self.operation else {
            self.round_pending = false;
            return;
        };
        self.round_pending = true;
        out_events.push(Event::RoundRequested { operation });
    }

    fn steer(&mut self, heading: Heading, out_events: &mut Vec<Event>) {
        if self.heading.is_reversal(heading) {
            out_events.push(Event::SteerRejected {
                requested: heading,
                committed: self.heading,
            });
            return;
        }
        if self.heading != heading {
            self.heading = heading;
            out_events.push(Event::HeadingChanged { heading });
        }
    }

    fn publish_round(
        &mut self,
        problem: Problem,
        targets: Vec<Target>,
        out_events: &mut Vec<Event>,
    ) {
        let accepting = self.round_pending
            && matches!(self.phase, SessionPhase::Running | SessionPhase::Paused);
        if !accepting {
            out_events.push(Event::RoundRejected {
                reason: math_snake_core::RoundError::Unexpected,
            });
            return;
        }

        if let Err(reason) = validate_round(&problem, &targets, self.config.grid_size) {
            warn!("rejecting round for {:?}: {reason:?}", problem.question());
            out_events.push(Event::RoundRejected { reason });
            return;
        }

        info!(
            "round published: {} ({} targets)",
            problem.question(),
            targets.len()
        );
        self.round_pending = false;
        self.targets = targets;
        out_events.push(Event::RoundPublished {
            problem: problem.clone(),
            target_count: self.targets.len(),
        });
        self.problem = Some(problem);
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        let from = self.actor.head();
        let new_head = compute_next_head(&self.actor, self.heading);
        let outcome = resolve(&self.actor, new_head, &self.targets, self.config.grid_size);
        debug!(
            "tick {} heading {:?}: {from} -> {new_head} = {outcome:?}",
            self.tick_index, self.heading
        );

        match outcome {
            Outcome::OutOfBounds | Outcome::SelfCollision => {
                let Some(cause) = outcome.fatal() else {
                    return;
                };
                self.fatal = Some(cause);
                self.set_phase(SessionPhase::GameOver, out_events);
                out_events.push(Event::GameOver {
                    cause,
                    score: self.score,
                });
            }
            Outcome::TargetHit(target) if target.is_correct => {
                self.actor.advance(new_head, true);
                self.score = self.score.saturating_add(self.config.correct_reward);
                let faster = self
                    .tick_period
                    .saturating_sub(self.config.speed_step())
                    .max(self.config.min_period());
                out_events.push(Event::TargetEaten {
                    target,
                    length: self.actor.len(),
                });
                out_events.push(Event::ScoreChanged { score: self.score });
                if faster != self.tick_period {
                    self.tick_period = faster;
                    out_events.push(Event::TickPeriodChanged { period: faster });
                }
                self.request_round(out_events);
            }
            Outcome::TargetHit(target) => {
                self.actor.advance_and_shrink(new_head);
                let previous = self.score;
                self.score = self.score.saturating_sub(self.config.wrong_penalty);
                out_events.push(Event::TargetEaten {
                    target,
                    length: self.actor.len(),
                });
                if previous != self.score {
                    out_events.push(Event::ScoreChanged { score: self.score });
                }
                self.request_round(out_events);
            }
            Outcome::FreeMove => {
                self.actor.advance(new_head, false);
                out_events.push(Event::ActorAdvanced { from, to: new_head });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSession { config } => {
            if let Err(violation) = config.validate() {
                warn!("ignoring session config: {violation}");
                out_events.push(Event::CommandIgnored { phase: world.phase });
                return;
            }
            world.config = config;
            world.operation = None;
            world.reset_session();
            out_events.push(Event::SessionReset);
            world.set_phase(SessionPhase::SelectingOperation, out_events);
        }
        Command::SelectOperation { operation } => {
            if world.phase != SessionPhase::SelectingOperation {
                out_events.push(Event::CommandIgnored { phase: world.phase });
                return;
            }
            info!("operation selected: {}", operation.label());
            world.operation = Some(operation);
            world.reset_session();
            world.set_phase(SessionPhase::Running, out_events);
            world.request_round(out_events);
        }
        Command::SteerActor { heading } => {
            if world.phase != SessionPhase::Running {
                out_events.push(Event::CommandIgnored { phase: world.phase });
                return;
            }
            world.steer(heading, out_events);
        }
        Command::TogglePause => match world.phase {
            SessionPhase::Running => world.set_phase(SessionPhase::Paused, out_events),
            SessionPhase::Paused => world.set_phase(SessionPhase::Running, out_events),
            SessionPhase::SelectingOperation | SessionPhase::GameOver => {
                out_events.push(Event::CommandIgnored { phase: world.phase });
            }
        },
        Command::Tick => {
            if world.phase != SessionPhase::Running {
                out_events.push(Event::CommandIgnored { phase: world.phase });
                return;
            }
            world.tick(out_events);
        }
        Command::PublishRound { problem, targets } => {
            world.publish_round(problem, targets, out_events);
        }
        Command::Restart => {
            if world.operation.is_none() {
                out_events.push(Event::CommandIgnored { phase: world.phase });
                return;
            }
            world.reset_session();
            out_events.push(Event::SessionReset);
            world.set_phase(SessionPhase::Running, out_events);
            world.request_round(out_events);
        }
        Command::ReturnToMenu => {
            if world.phase == SessionPhase::SelectingOperation {
                out_events.push(Event::CommandIgnored { phase: world.phase });
                return;
            }
            world.operation = None;
            world.reset_session();
            out_events.push(Event::SessionReset);
            world.set_phase(SessionPhase::SelectingOperation, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Actor, World};
    use math_snake_core::{
        GridSize, Heading, Operation, Problem, SessionConfig, SessionPhase, SessionView, Target,
    };

    /// Active session phase.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Operation chosen for the session, if any.
    #[must_use]
    pub fn operation(world: &World) -> Option<Operation> {
        world.operation
    }

    /// Tuning the session runs with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Side length of the play grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.config.grid_size
    }

    /// Provides read-only access to the actor.
    #[must_use]
    pub fn actor(world: &World) -> &Actor {
        &world.actor
    }

    /// Heading the next tick will use.
    #[must_use]
    pub fn heading(world: &World) -> Heading {
        world.heading
    }

    /// Active problem, absent until the quiz answers a round request.
    #[must_use]
    pub fn problem(world: &World) -> Option<&Problem> {
        world.problem.as_ref()
    }

    /// Active targets.
    #[must_use]
    pub fn targets(world: &World) -> &[Target] {
        &world.targets
    }

    /// Reports whether a round request is still unanswered.
    #[must_use]
    pub fn round_pending(world: &World) -> bool {
        world.round_pending
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Current period between ticks.
    #[must_use]
    pub fn tick_period(world: &World) -> Duration {
        world.tick_period
    }

    /// Captures a read-only snapshot of the settled session.
    #[must_use]
    pub fn session_view(world: &World) -> SessionView {
        SessionView {
            phase: world.phase,
            operation: world.operation,
            grid_size: world.config.grid_size,
            actor: world.actor.cells().collect(),
            heading: world.heading,
            problem: world.problem.clone(),
            targets: world.targets.clone(),
            score: world.score,
            tick_period: world.tick_period,
            initial_period: world.config.initial_period(),
            tick_index: world.tick_index,
            fatal: world.fatal,
        }
    }
}
