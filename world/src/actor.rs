//! Ordered chain of cells that forms the snake.

use std::collections::VecDeque;

use math_snake_core::{GridPosition, Heading};

/// Snake body with the head stored at the front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    cells: VecDeque<GridPosition>,
}

impl Actor {
    /// Creates a single-cell actor at the provided position.
    #[must_use]
    pub fn spawn(at: GridPosition) -> Self {
        let mut cells = VecDeque::with_capacity(8);
        cells.push_back(at);
        Self { cells }
    }

    /// Creates an actor from explicit cells, head first.
    ///
    /// Returns `None` when `cells` is empty.
    #[must_use]
    pub fn from_cells<I>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = GridPosition>,
    {
        let cells: VecDeque<GridPosition> = cells.into_iter().collect();
        if cells.is_empty() {
            None
        } else {
            Some(Self { cells })
        }
    }

    /// Cell occupied by the head.
    #[must_use]
    pub fn head(&self) -> GridPosition {
        // Construction guarantees at least one cell and no method removes the last one.
        self.cells[0]
    }

    /// Number of cells in the body, head included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the body cells, head first.
    pub fn cells(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.cells.iter().copied()
    }

    /// Reports whether any body cell equals `position`.
    #[must_use]
    pub fn occupies(&self, position: GridPosition) -> bool {
        self.cells.contains(&position)
    }

    /// Moves the head to `new_head`, keeping the tail when `grow` is set.
    pub fn advance(&mut self, new_head: GridPosition, grow: bool) {
        self.cells.push_front(new_head);
        if !grow {
            let _ = self.cells.pop_back();
        }
    }

    /// Moves the head to `new_head` and loses one cell, never dropping below one.
    pub fn advance_and_shrink(&mut self, new_head: GridPosition) {
        self.advance(new_head, false);
        if self.cells.len() > 1 {
            let _ = self.cells.pop_back();
        }
    }
}

/// Translates the actor's head by one cell toward `heading`. No wraparound.
#[must_use]
pub fn compute_next_head(actor: &Actor, heading: Heading) -> GridPosition {
    actor.head().step(heading)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(actor: &Actor) -> Vec<(i32, i32)> {
        actor.cells().map(|cell| (cell.x(), cell.y())).collect()
    }

    fn actor(raw: &[(i32, i32)]) -> Actor {
        Actor::from_cells(raw.iter().map(|&(x, y)| GridPosition::new(x, y))).expect("non-empty")
    }

    #[test]
    fn empty_cells_are_rejected() {
        assert!(Actor::from_cells(Vec::new()).is_none());
    }

    #[test]
    fn next_head_translates_by_heading() {
        let snake = Actor::spawn(GridPosition::new(7, 7));
        assert_eq!(
            compute_next_head(&snake, Heading::Right),
            GridPosition::new(8, 7)
        );
        assert_eq!(compute_next_head(&snake, Heading::Up), GridPosition::new(7, 6));
    }

    #[test]
    fn advance_without_growth_keeps_length() {
        let mut snake = actor(&[(3, 3), (2, 3), (1, 3)]);
        snake.advance(GridPosition::new(4, 3), false);
        assert_eq!(cells(&snake), vec![(4, 3), (3, 3), (2, 3)]);
    }

    #[test]
    fn advance_with_growth_keeps_tail() {
        let mut snake = actor(&[(3, 3), (2, 3)]);
        snake.advance(GridPosition::new(3, 4), true);
        assert_eq!(cells(&snake), vec![(3, 4), (3, 3), (2, 3)]);
    }

    #[test]
    fn shrink_drops_one_cell_net() {
        let mut snake = actor(&[(3, 3), (2, 3), (1, 3)]);
        snake.advance_and_shrink(GridPosition::new(4, 3));
        assert_eq!(cells(&snake), vec![(4, 3), (3, 3)]);
    }

    #[test]
    fn shrink_floors_at_single_cell() {
        let mut snake = Actor::spawn(GridPosition::new(7, 7));
        snake.advance_and_shrink(GridPosition::new(8, 7));
        assert_eq!(cells(&snake), vec![(8, 7)]);
    }
}
