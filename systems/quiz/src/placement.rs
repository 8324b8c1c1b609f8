//! Scattering of answer values onto free grid cells.

use log::warn;
use math_snake_core::{GridPosition, GridSize, Target};
use rand::Rng;

/// Places the correct answer followed by each decoy on distinct random cells.
///
/// Every value gets up to `max_attempts` uniform draws; a draw succeeds when
/// its cell is neither already used by this batch nor listed in `blocked`.
/// Values whose draws run out are skipped, so the result may be shorter than
/// the input and may lack the correct target.
pub fn scatter<R>(
    answer: i32,
    decoys: &[i32],
    grid_size: GridSize,
    blocked: &[GridPosition],
    max_attempts: usize,
    rng: &mut R,
) -> Vec<Target>
where
    R: Rng + ?Sized,
{
    let mut placed: Vec<Target> = Vec::with_capacity(decoys.len() + 1);
    let candidates =
        std::iter::once((answer, true)).chain(decoys.iter().map(|value| (*value, false)));

    for (value, is_correct) in candidates {
        let cell = (0..max_attempts)
            .map(|_| random_cell(grid_size, rng))
            .find(|cell| {
                !blocked.contains(cell) && placed.iter().all(|target| target.position != *cell)
            });

        match cell {
            Some(position) => placed.push(Target {
                position,
                value,
                is_correct,
            }),
            None => warn!("no free cell for value {value} after {max_attempts} draws"),
        }
    }

    placed
}

fn random_cell<R>(grid_size: GridSize, rng: &mut R) -> GridPosition
where
    R: Rng + ?Sized,
{
    let side = i32::try_from(grid_size.get()).unwrap_or(i32::MAX).max(1);
    GridPosition::new(rng.gen_range(0..side), rng.gen_range(0..side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_snake_core::GRID_SIZE;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn correct_target_comes_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let targets = scatter(12, &[3, 8, 15], GRID_SIZE, &[], 50, &mut rng);

        assert_eq!(targets.len(), 4);
        assert!(targets[0].is_correct);
        assert_eq!(targets[0].value, 12);
        assert!(targets[1..].iter().all(|target| !target.is_correct));
    }

    #[test]
    fn positions_are_distinct_and_inside_the_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        for _ in 0..100 {
            let targets = scatter(4, &[1, 2, 3, 5, 6, 7, 8], GRID_SIZE, &[], 50, &mut rng);
            let cells: HashSet<GridPosition> = targets.iter().map(|t| t.position).collect();
            assert_eq!(cells.len(), targets.len());
            assert!(cells.iter().all(|cell| GRID_SIZE.contains(*cell)));
        }
    }

    #[test]
    fn blocked_cells_are_avoided() {
        let mut rng = ChaCha8Rng::seed_from_u64(29);
        let small = GridSize::new(3);
        let blocked: Vec<GridPosition> = (0..3)
            .flat_map(|y| (0..3).map(move |x| GridPosition::new(x, y)))
            .filter(|cell| *cell != GridPosition::new(1, 1))
            .collect();

        let targets = scatter(9, &[2], small, &blocked, 500, &mut rng);

        assert_eq!(targets, vec![Target::correct(GridPosition::new(1, 1), 9)]);
    }

    #[test]
    fn values_without_a_free_cell_are_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let targets = scatter(9, &[2, 3], GRID_SIZE, &[], 0, &mut rng);
        assert!(targets.is_empty());
    }
}
