#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic quiz system that answers round requests with fresh problems and targets.

pub mod distractors;
pub mod placement;
pub mod problems;

use std::fmt;

use log::{debug, warn};
use math_snake_core::{Command, Event, GridPosition, GridSize, Operation, Problem, Target};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub use distractors::generate_distractors;
pub use placement::scatter;
pub use problems::{generate_problem, MAX_TIER, MIN_TIER};

/// Number of targets placed per round when not configured otherwise.
pub const DEFAULT_TARGET_COUNT: usize = 4;

/// Largest number of targets a round may place.
pub const MAX_TARGET_COUNT: usize = 8;

/// Configuration parameters required to construct the quiz system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Targets per round, the correct answer included.
    pub target_count: usize,
    /// Difficulty tier forwarded to the problem generator.
    pub difficulty_tier: u8,
    /// Draw budget for the distractor generator.
    pub decoy_attempts: usize,
    /// Draw budget per value for the placer.
    pub placement_attempts: usize,
    /// Keeps targets off cells currently covered by the actor.
    pub avoid_actor: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            difficulty_tier: MIN_TIER,
            decoy_attempts: 100,
            placement_attempts: 50,
            avoid_actor: false,
        }
    }
}

impl QuizConfig {
    /// Checks that the configuration can produce playable rounds.
    pub fn validate(&self) -> Result<(), QuizConfigViolation> {
        if !(1..=MAX_TARGET_COUNT).contains(&self.target_count) {
            return Err(QuizConfigViolation::TargetCount {
                count: self.target_count,
            });
        }
        if !(MIN_TIER..=MAX_TIER).contains(&self.difficulty_tier) {
            return Err(QuizConfigViolation::Tier {
                tier: self.difficulty_tier,
            });
        }
        if self.placement_attempts == 0 {
            return Err(QuizConfigViolation::NoPlacementAttempts);
        }
        Ok(())
    }
}

/// Reasons a [`QuizConfig`] fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizConfigViolation {
    /// Target count outside `1..=MAX_TARGET_COUNT`.
    TargetCount {
        /// Rejected count.
        count: usize,
    },
    /// Difficulty tier outside `MIN_TIER..=MAX_TIER`.
    Tier {
        /// Rejected tier.
        tier: u8,
    },
    /// The placer would never find a cell.
    NoPlacementAttempts,
}

impl fmt::Display for QuizConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetCount { count } => write!(
                f,
                "target count must be between 1 and {MAX_TARGET_COUNT} (received {count})"
            ),
            Self::Tier { tier } => write!(
                f,
                "difficulty tier must be between {MIN_TIER} and {MAX_TIER} (received {tier})"
            ),
            Self::NoPlacementAttempts => write!(f, "placement attempts must be positive"),
        }
    }
}

impl std::error::Error for QuizConfigViolation {}

/// Pure system that turns round requests into `PublishRound` commands.
#[derive(Debug)]
pub struct Quiz {
    config: QuizConfig,
    rng: ChaCha8Rng,
}

impl Quiz {
    /// Creates a quiz system whose rounds are fully determined by `seed`.
    #[must_use]
    pub fn new(config: QuizConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Configuration the system was built with.
    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Consumes events and immutable views to emit round commands.
    ///
    /// Only the request still outstanding at the end of the batch is answered;
    /// a session reset later in the same batch cancels earlier requests.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid_size: GridSize,
        actor: &[GridPosition],
        out: &mut Vec<Command>,
    ) {
        let mut pending = None;
        for event in events {
            match event {
                Event::RoundRequested { operation } => pending = Some(*operation),
                Event::SessionReset => pending = None,
                Event::RoundRejected { reason } => {
                    warn!("world rejected the published round: {reason:?}");
                }
                _ => {}
            }
        }

        let Some(operation) = pending else {
            return;
        };

        let (problem, targets) = self.build_round(operation, grid_size, actor);
        debug!(
            "publishing {} with {} targets",
            problem.question(),
            targets.len()
        );
        out.push(Command::PublishRound { problem, targets });
    }

    fn build_round(
        &mut self,
        operation: Operation,
        grid_size: GridSize,
        actor: &[GridPosition],
    ) -> (Problem, Vec<Target>) {
        let problem = generate_problem(operation, self.config.difficulty_tier, &mut self.rng);
        let decoy_count = self.config.target_count.saturating_sub(1);
        let decoys = generate_distractors(
            problem.answer(),
            decoy_count,
            self.config.decoy_attempts,
            &mut self.rng,
        );

        let blocked: &[GridPosition] = if self.config.avoid_actor { actor } else { &[] };
        let mut targets = scatter(
            problem.answer(),
            &decoys,
            grid_size,
            blocked,
            self.config.placement_attempts,
            &mut self.rng,
        );

        if !blocked.is_empty() && !targets.iter().any(|target| target.is_correct) {
            warn!("actor covers every candidate cell; scattering over the actor");
            targets = scatter(
                problem.answer(),
                &decoys,
                grid_size,
                &[],
                self.config.placement_attempts,
                &mut self.rng,
            );
        }

        (problem, targets)
    }
}
