//! Classification of a candidate head position.

use math_snake_core::{GridPosition, GridSize, Outcome, Target};

use crate::actor::Actor;

/// Classifies `new_head` against the grid bounds, the full current body and the targets.
///
/// Fatal outcomes take precedence; the body check includes the tail cell even
/// though a free move would vacate it.
#[must_use]
pub fn resolve(
    actor: &Actor,
    new_head: GridPosition,
    targets: &[Target],
    grid_size: GridSize,
) -> Outcome {
    if !grid_size.contains(new_head) {
        return Outcome::OutOfBounds;
    }

    if actor.occupies(new_head) {
        return Outcome::SelfCollision;
    }

    targets
        .iter()
        .find(|target| target.position == new_head)
        .map_or(Outcome::FreeMove, |target| Outcome::TargetHit(*target))
}
