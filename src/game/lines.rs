use crate::LEVEL_STEP;
use crate::game::{Board, Cell};

impl Board {
    /// A row is full when every playable column holds a non-wall block.
    pub fn is_row_full(&self, y: usize) -> bool {
        (0..self.width).all(|x| matches!(self.get(x, y), Cell::Filled(_)))
    }

    /// Removes every full row in one bottom-up sweep and returns how many
    /// were cleared. The wall row is never scanned.
    pub fn clear_full_lines(&mut self) -> u64 {
        if self.width == 0 {
            return 0;
        }
        let mut cleared = 0;
        let mut y = self.height;
        while y > 0 {
            y -= 1;
            if self.is_row_full(y) {
                cleared += 1;
                self.collapse_onto(y);
                // Re-check the same index: the row above just moved into it.
                y += 1;
            }
        }
        cleared
    }

    // Rows 0..y move down by one; row 0 is left empty.
    fn collapse_onto(&mut self, y: usize) {
        let cols = self.columns();
        self.cells.copy_within(0..y * cols, cols);
        for x in 0..cols {
            self.set(x, 0, Cell::Empty);
        }
    }
}

/// Level derived from the cleared-line count, in steps of `LEVEL_STEP`.
pub fn level_for(lines_cleared: u64) -> u64 {
    (lines_cleared as f64 / LEVEL_STEP as f64).round() as u64 * LEVEL_STEP
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::game::Shape;

    fn fill_row(board: &mut Board, y: usize) {
        for x in 0..board.width {
            board.set(x, y, Cell::Filled(Shape::Box.colors()));
        }
    }

    #[test]
    fn clearing_shifts_rows_above_down_by_one() {
        let mut board = Board::new(6, 8);
        fill_row(&mut board, 5);
        let mark = Cell::Filled(Shape::L.colors());
        let below_mark = Cell::Filled(Shape::S.colors());
        board.set(1, 3, mark);
        board.set(4, 3, mark);
        board.set(2, 4, below_mark);

        assert_eq!(board.clear_full_lines(), 1);
        assert_eq!(board.get(1, 4), mark);
        assert_eq!(board.get(4, 4), mark);
        assert_eq!(board.get(2, 5), below_mark);
        assert_eq!(board.get(1, 3), Cell::Empty);
        assert_eq!(board.filled_count(), 3);
    }

    #[test]
    fn stacked_full_rows_clear_in_one_call() {
        let mut board = Board::new(5, 6);
        fill_row(&mut board, 5);
        fill_row(&mut board, 4);
        fill_row(&mut board, 2);
        board.set(0, 3, Cell::Filled(Shape::T.colors()));

        assert_eq!(board.clear_full_lines(), 3);
        assert_eq!(board.filled_count(), 1);
        assert!(board.get(0, 5).is_occupied());
        assert!((0..6).all(|y| !board.is_row_full(y)));
    }

    #[test]
    fn top_row_is_emptied_after_a_clear() {
        let mut board = Board::new(4, 3);
        board.set(0, 0, Cell::Filled(Shape::Z.colors()));
        fill_row(&mut board, 2);
        board.clear_full_lines();
        assert_eq!(board.get(0, 0), Cell::Empty);
        assert!(board.get(0, 1).is_occupied());
        assert_eq!(board.get(0, 3), Cell::Wall);
    }

    #[test]
    fn wall_row_never_counts() {
        let mut board = Board::new(4, 3);
        assert_eq!(board.clear_full_lines(), 0);
        assert_eq!(board.get(2, 3), Cell::Wall);
    }

    #[test]
    fn level_rounds_to_nearest_step() {
        assert_eq!(level_for(0), 0);
        assert_eq!(level_for(9), 0);
        assert_eq!(level_for(10), 20);
        assert_eq!(level_for(29), 20);
        assert_eq!(level_for(31), 40);
    }

    proptest! {
        #[test]
        fn no_full_row_survives_a_sweep(rows in proptest::collection::vec(proptest::collection::vec(any::<bool>(), 6), 10)) {
            let mut board = Board::new(6, 10);
            for (y, row) in rows.iter().enumerate() {
                for (x, &filled) in row.iter().enumerate() {
                    if filled {
                        board.set(x, y, Cell::Filled(Shape::Box.colors()));
                    }
                }
            }
            let before = board.filled_count() as u64;
            let cleared = board.clear_full_lines();

            prop_assert!((0..board.height).all(|y| !board.is_row_full(y)));
            prop_assert_eq!(board.filled_count() as u64, before - cleared * 6);
            prop_assert!((0..board.columns()).all(|x| board.get(x, board.height).is_wall()));
        }
    }
}
