#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Math Snake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Side length of the default square play grid.
pub const GRID_SIZE: GridSize = GridSize::new(15);

/// Score awarded for eating the correct answer.
pub const DEFAULT_CORRECT_REWARD: u32 = 10;

/// Score removed for eating a distractor.
pub const DEFAULT_WRONG_PENALTY: u32 = 5;

/// Tick period used when a session starts, in milliseconds.
pub const DEFAULT_INITIAL_PERIOD_MS: u64 = 200;

/// Amount the tick period shrinks after each correct answer, in milliseconds.
pub const DEFAULT_SPEED_STEP_MS: u64 = 10;

/// Lower bound for the tick period, in milliseconds.
pub const DEFAULT_MIN_PERIOD_MS: u64 = 80;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the session tuning and returns to operation selection.
    ConfigureSession {
        /// Validated tuning applied to subsequent sessions.
        config: SessionConfig,
    },
    /// Chooses the arithmetic operation and starts the game.
    SelectOperation {
        /// Operation used for every generated problem.
        operation: Operation,
    },
    /// Overwrites the committed heading unless it reverses the current one.
    SteerActor {
        /// Requested direction of travel.
        heading: Heading,
    },
    /// Flips between running and paused.
    TogglePause,
    /// Advances the actor by exactly one cell.
    Tick,
    /// Installs a freshly generated problem together with its targets.
    PublishRound {
        /// Problem the targets answer.
        problem: Problem,
        /// Correct target plus distractors, each on its own cell.
        targets: Vec<Target>,
    },
    /// Starts over with the previously chosen operation.
    Restart,
    /// Abandons the session and returns to operation selection.
    ReturnToMenu,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the session entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: SessionPhase,
    },
    /// Confirms that the committed heading changed.
    HeadingChanged {
        /// Heading the next tick will use.
        heading: Heading,
    },
    /// Reports that a steering command was discarded.
    SteerRejected {
        /// Heading carried by the rejected command.
        requested: Heading,
        /// Heading that remains committed.
        committed: Heading,
    },
    /// Confirms that the actor moved one cell without eating anything.
    ActorAdvanced {
        /// Cell the head moved from.
        from: GridPosition,
        /// Cell the head occupies after the move.
        to: GridPosition,
    },
    /// Reports that the actor ate a target.
    TargetEaten {
        /// Target that was consumed.
        target: Target,
        /// Actor length after growth or shrinkage.
        length: usize,
    },
    /// Reports that the score changed.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Reports that the tick period changed.
    TickPeriodChanged {
        /// Period between successive ticks.
        period: Duration,
    },
    /// Requests a new problem and target set for the provided operation.
    RoundRequested {
        /// Operation the next problem must use.
        operation: Operation,
    },
    /// Confirms that a new round was installed.
    RoundPublished {
        /// Problem that is now active.
        problem: Problem,
        /// Number of targets placed on the grid.
        target_count: usize,
    },
    /// Reports that a published round failed validation.
    RoundRejected {
        /// Specific reason the round was refused.
        reason: RoundError,
    },
    /// Announces a terminal collision.
    GameOver {
        /// Collision that ended the run.
        cause: FatalCollision,
        /// Score at the moment the run ended.
        score: u32,
    },
    /// Confirms that actor, score and tick period returned to their initial values.
    SessionReset,
    /// Reports that a command was ignored because of the current phase.
    CommandIgnored {
        /// Phase that refused the command.
        phase: SessionPhase,
    },
}

/// Location of a single grid cell expressed as signed column and row coordinates.
///
/// Coordinates are signed so that a candidate head one step outside the grid
/// remains representable for the collision resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    x: i32,
    y: i32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring position one cell away in `heading`'s direction.
    #[must_use]
    pub const fn step(self, heading: Heading) -> Self {
        match heading {
            Heading::Up => Self::new(self.x, self.y - 1),
            Heading::Down => Self::new(self.x, self.y + 1),
            Heading::Left => Self::new(self.x - 1, self.y),
            Heading::Right => Self::new(self.x + 1, self.y),
        }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Side length of the square play grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridSize(u32);

impl GridSize {
    /// Smallest grid that still leaves room to turn around.
    pub const MIN: u32 = 3;

    /// Largest grid accepted by configuration.
    pub const MAX: u32 = 64;

    /// Creates a new grid size wrapper.
    #[must_use]
    pub const fn new(cells: u32) -> Self {
        Self(cells)
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.0 as u64 * self.0 as u64
    }

    /// Cell the actor spawns on.
    #[must_use]
    pub const fn center(&self) -> GridPosition {
        let middle = (self.0 / 2) as i32;
        GridPosition::new(middle, middle)
    }

    /// Reports whether the position lies inside `[0, size)` on both axes.
    #[must_use]
    pub fn contains(&self, position: GridPosition) -> bool {
        let size = i64::from(self.0);
        let x = i64::from(position.x());
        let y = i64::from(position.y());
        (0..size).contains(&x) && (0..size).contains(&y)
    }
}

/// Cardinal directions of travel available to the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Heading {
    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether switching from `self` to `requested` would reverse into the neck.
    #[must_use]
    pub fn is_reversal(self, requested: Heading) -> bool {
        self.opposite() == requested
    }
}

/// Arithmetic operations a session can be played with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Addition.
    Add,
    /// Subtraction with a positive difference.
    Subtract,
    /// Multiplication.
    Multiply,
    /// Division without remainder.
    Divide,
}

impl Operation {
    /// All operations in menu order.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Symbol used in question text.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => 'x',
            Self::Divide => '/',
        }
    }

    /// Human readable label for menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "Addition",
            Self::Subtract => "Subtraction",
            Self::Multiply => "Multiplication",
            Self::Divide => "Division",
        }
    }
}

/// Arithmetic question paired with its answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Problem {
    question: String,
    answer: i32,
}

impl Problem {
    /// Creates a new problem from its question text and correct answer.
    #[must_use]
    pub fn new<T>(question: T, answer: i32) -> Self
    where
        T: Into<String>,
    {
        Self {
            question: question.into(),
            answer,
        }
    }

    /// Question text shown to the player.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Correct integer answer.
    #[must_use]
    pub const fn answer(&self) -> i32 {
        self.answer
    }
}

/// Numeric cell the actor can eat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    /// Cell occupied by the target.
    pub position: GridPosition,
    /// Number printed on the target.
    pub value: i32,
    /// Whether the value answers the active problem.
    pub is_correct: bool,
}

impl Target {
    /// Creates a target carrying the correct answer.
    #[must_use]
    pub const fn correct(position: GridPosition, value: i32) -> Self {
        Self {
            position,
            value,
            is_correct: true,
        }
    }

    /// Creates a distractor target.
    #[must_use]
    pub const fn decoy(position: GridPosition, value: i32) -> Self {
        Self {
            position,
            value,
            is_correct: false,
        }
    }
}

/// Phases of a single play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for the player to pick an operation.
    SelectingOperation,
    /// Ticks advance the actor.
    Running,
    /// Ticks are suspended until the player resumes.
    Paused,
    /// The actor collided; only restart or menu commands are accepted.
    GameOver,
}

/// Collisions that end a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FatalCollision {
    /// The head left the grid.
    OutOfBounds,
    /// The head ran into the body.
    SelfCollision,
}

/// Classification of a candidate head position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The head would leave the grid.
    OutOfBounds,
    /// The head would land on an existing body cell.
    SelfCollision,
    /// The head would land on a target.
    TargetHit(Target),
    /// The head moves onto an empty cell.
    FreeMove,
}

impl Outcome {
    /// Converts fatal outcomes into the collision that ends the run.
    #[must_use]
    pub const fn fatal(&self) -> Option<FatalCollision> {
        match self {
            Self::OutOfBounds => Some(FatalCollision::OutOfBounds),
            Self::SelfCollision => Some(FatalCollision::SelfCollision),
            Self::TargetHit(_) | Self::FreeMove => None,
        }
    }
}

/// Reasons a published round may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundError {
    /// No round was requested, or the session is not running.
    Unexpected,
    /// The answer is not a positive integer.
    NonPositiveAnswer,
    /// The target set does not contain exactly one correct target.
    CorrectTargetCount {
        /// Number of targets flagged as correct.
        found: usize,
    },
    /// The correct target's value differs from the problem's answer.
    AnswerMismatch,
    /// A distractor carries the answer, a duplicate value or a non-positive value.
    InvalidDecoy,
    /// Two targets share a cell, or a target lies outside the grid.
    InvalidPosition,
}

/// Tuning knobs controlling grid size, scoring and the speed ramp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side length of the grid.
    pub grid_size: GridSize,
    /// Tick period at the start of a session, in milliseconds.
    pub initial_period_ms: u64,
    /// Period reduction applied after each correct answer, in milliseconds.
    pub speed_step_ms: u64,
    /// Lower bound for the tick period, in milliseconds.
    pub min_period_ms: u64,
    /// Points added for a correct answer.
    pub correct_reward: u32,
    /// Points removed for a wrong answer.
    pub wrong_penalty: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            initial_period_ms: DEFAULT_INITIAL_PERIOD_MS,
            speed_step_ms: DEFAULT_SPEED_STEP_MS,
            min_period_ms: DEFAULT_MIN_PERIOD_MS,
            correct_reward: DEFAULT_CORRECT_REWARD,
            wrong_penalty: DEFAULT_WRONG_PENALTY,
        }
    }
}

impl SessionConfig {
    /// Checks that the tuning describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigViolation> {
        let size = self.grid_size.get();
        if !(GridSize::MIN..=GridSize::MAX).contains(&size) {
            return Err(ConfigViolation::GridSize { size });
        }
        if self.min_period_ms == 0 {
            return Err(ConfigViolation::ZeroMinimumPeriod);
        }
        if self.min_period_ms > self.initial_period_ms {
            return Err(ConfigViolation::PeriodOrder {
                initial_ms: self.initial_period_ms,
                min_ms: self.min_period_ms,
            });
        }
        Ok(())
    }

    /// Tick period at the start of a session.
    #[must_use]
    pub const fn initial_period(&self) -> Duration {
        Duration::from_millis(self.initial_period_ms)
    }

    /// Period reduction applied after each correct answer.
    #[must_use]
    pub const fn speed_step(&self) -> Duration {
        Duration::from_millis(self.speed_step_ms)
    }

    /// Lower bound for the tick period.
    #[must_use]
    pub const fn min_period(&self) -> Duration {
        Duration::from_millis(self.min_period_ms)
    }
}

/// Reasons a [`SessionConfig`] fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigViolation {
    /// Grid size outside `GridSize::MIN..=GridSize::MAX`.
    GridSize {
        /// Rejected side length.
        size: u32,
    },
    /// A zero minimum period would let the speed ramp reach an instant tick.
    ZeroMinimumPeriod,
    /// The minimum period exceeds the initial period.
    PeriodOrder {
        /// Configured initial period.
        initial_ms: u64,
        /// Configured minimum period.
        min_ms: u64,
    },
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridSize { size } => write!(
                f,
                "grid size must be between {} and {} (received {size})",
                GridSize::MIN,
                GridSize::MAX
            ),
            Self::ZeroMinimumPeriod => write!(f, "minimum tick period must be positive"),
            Self::PeriodOrder { initial_ms, min_ms } => write!(
                f,
                "minimum tick period ({min_ms} ms) exceeds initial period ({initial_ms} ms)"
            ),
        }
    }
}

impl std::error::Error for ConfigViolation {}

/// Read-only snapshot of the settled session consumed by systems and adapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    /// Active phase.
    pub phase: SessionPhase,
    /// Operation chosen for this session, if any.
    pub operation: Option<Operation>,
    /// Side length of the grid.
    pub grid_size: GridSize,
    /// Actor cells, head first.
    pub actor: Vec<GridPosition>,
    /// Committed heading.
    pub heading: Heading,
    /// Active problem, absent while no round is installed.
    pub problem: Option<Problem>,
    /// Active targets.
    pub targets: Vec<Target>,
    /// Current score.
    pub score: u32,
    /// Current tick period.
    pub tick_period: Duration,
    /// Tick period the session started with.
    pub initial_period: Duration,
    /// Number of ticks applied since the session started.
    pub tick_index: u64,
    /// Collision that ended the run, once in game over.
    pub fatal: Option<FatalCollision>,
}

impl SessionView {
    /// Speed relative to the initial period, as a rounded percentage.
    #[must_use]
    pub fn speed_percent(&self) -> u32 {
        let current = self.tick_period.as_millis();
        if current == 0 {
            return 0;
        }
        let initial = self.initial_period.as_millis();
        let percent = (initial * 100 + current / 2) / current;
        u32::try_from(percent).unwrap_or(u32::MAX)
    }
}
