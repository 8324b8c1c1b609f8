//! Consistency checks applied to published rounds.

use std::collections::HashSet;

use math_snake_core::{GridSize, Problem, RoundError, Target};

/// Checks that `targets` form a valid answer set for `problem` on a grid of `grid_size`.
pub fn validate_round(
    problem: &Problem,
    targets: &[Target],
    grid_size: GridSize,
) -> Result<(), RoundError> {
    let answer = problem.answer();
    if answer <= 0 {
        return Err(RoundError::NonPositiveAnswer);
    }

    let correct: Vec<&Target> = targets.iter().filter(|target| target.is_correct).collect();
    if correct.len() != 1 {
        return Err(RoundError::CorrectTargetCount {
            found: correct.len(),
        });
    }
    if correct[0].value != answer {
        return Err(RoundError::AnswerMismatch);
    }

    let mut values = HashSet::with_capacity(targets.len());
    for decoy in targets.iter().filter(|target| !target.is_correct) {
        if decoy.value <= 0 || decoy.value == answer || !values.insert(decoy.value) {
            return Err(RoundError::InvalidDecoy);
        }
    }

    let mut positions = HashSet::with_capacity(targets.len());
    for target in targets {
        if !grid_size.contains(target.position) || !positions.insert(target.position) {
            return Err(RoundError::InvalidPosition);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_snake_core::{GridPosition, GRID_SIZE};

    fn problem() -> Problem {
        Problem::new("3 + 4 = ?", 7)
    }

    #[test]
    fn accepts_a_consistent_round() {
        let targets = [
            Target::correct(GridPosition::new(1, 1), 7),
            Target::decoy(GridPosition::new(2, 1), 3),
            Target::decoy(GridPosition::new(3, 1), 11),
        ];
        assert_eq!(validate_round(&problem(), &targets, GRID_SIZE), Ok(()));
    }

    #[test]
    fn accepts_a_round_without_decoys() {
        let targets = [Target::correct(GridPosition::new(1, 1), 7)];
        assert_eq!(validate_round(&problem(), &targets, GRID_SIZE), Ok(()));
    }

    #[test]
    fn rejects_missing_or_duplicate_correct_targets() {
        let none = [Target::decoy(GridPosition::new(2, 1), 3)];
        assert_eq!(
            validate_round(&problem(), &none, GRID_SIZE),
            Err(RoundError::CorrectTargetCount { found: 0 })
        );

        let two = [
            Target::correct(GridPosition::new(1, 1), 7),
            Target::correct(GridPosition::new(2, 1), 7),
        ];
        assert_eq!(
            validate_round(&problem(), &two, GRID_SIZE),
            Err(RoundError::CorrectTargetCount { found: 2 })
        );
    }

    #[test]
    fn rejects_correct_target_with_wrong_value() {
        let targets = [Target::correct(GridPosition::new(1, 1), 8)];
        assert_eq!(
            validate_round(&problem(), &targets, GRID_SIZE),
            Err(RoundError::AnswerMismatch)
        );
    }

    #[test]
    fn rejects_decoys_repeating_values() {
        let targets = [
            Target::correct(GridPosition::new(1, 1), 7),
            Target::decoy(GridPosition::new(2, 1), 3),
            Target::decoy(GridPosition::new(3, 1), 3),
        ];
        assert_eq!(
            validate_round(&problem(), &targets, GRID_SIZE),
            Err(RoundError::InvalidDecoy)
        );

        let answer_as_decoy = [
            Target::correct(GridPosition::new(1, 1), 7),
            Target::decoy(GridPosition::new(2, 1), 7),
        ];
        assert_eq!(
            validate_round(&problem(), &answer_as_decoy, GRID_SIZE),
            Err(RoundError::InvalidDecoy)
        );
    }

    #[test]
    fn rejects_shared_or_outside_cells() {
        let shared = [
            Target::correct(GridPosition::new(1, 1), 7),
            Target::decoy(GridPosition::new(1, 1), 3),
        ];
        assert_eq!(
            validate_round(&problem(), &shared, GRID_SIZE),
            Err(RoundError::InvalidPosition)
        );

        let outside = [Target::correct(GridPosition::new(15, 1), 7)];
        assert_eq!(
            validate_round(&problem(), &outside, GRID_SIZE),
            Err(RoundError::InvalidPosition)
        );
    }
}
