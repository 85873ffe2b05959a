use rand::Rng;

use crate::PREPOPULATE_CHANCE;
use crate::game::piece::{ColorTriple, random_colors};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled(ColorTriple),
    /// Permanent floor sentinel; blocks movement, never counts toward a line.
    Wall,
}

impl Cell {
    pub fn is_occupied(self) -> bool {
        !matches!(self, Cell::Empty)
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Cell::Wall)
    }
}

/// Settled cells of one board.
///
/// The grid is one cell larger than `width`/`height` on each axis: columns
/// `0..=width` and rows `0..=height` exist, and row `height` is always the
/// wall. Pieces only ever occupy columns `0..width`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Cell>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        let mut board = Self {
            width,
            height,
            cells: vec![Cell::Empty; (width + 1) * (height + 1)],
        };
        board.pin_wall();
        board
    }

    pub fn columns(&self) -> usize {
        self.width + 1
    }

    pub fn rows(&self) -> usize {
        self.height + 1
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.columns() + x
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[self.idx(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: Cell) {
        let idx = self.idx(x, y);
        self.cells[idx] = value;
    }

    fn pin_wall(&mut self) {
        let y = self.height;
        for x in 0..self.columns() {
            self.set(x, y, Cell::Wall);
        }
    }

    /// Rebuilds the grid at a new size, keeping every overlapping non-wall cell.
    pub fn resize(&mut self, width: usize, height: usize) {
        let mut next = Board::new(width, height);
        for y in 0..self.rows().min(height) {
            for x in 0..self.columns().min(width + 1) {
                match self.get(x, y) {
                    Cell::Wall => {}
                    cell => next.set(x, y, cell),
                }
            }
        }
        *self = next;
    }

    /// Clears every non-wall cell.
    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            if !cell.is_wall() {
                *cell = Cell::Empty;
            }
        }
    }

    /// With `enabled`, fills playable cells below the vertical midpoint at
    /// random; everything else (and everything when disabled) is cleared.
    pub fn set_prepopulate<R: Rng>(&mut self, enabled: bool, rng: &mut R) {
        let midpoint = self.height as f64 / 2.0;
        for y in 0..self.height {
            for x in 0..self.columns() {
                let fill = enabled
                    && x < self.width
                    && y as f64 > midpoint
                    && rng.gen_bool(PREPOPULATE_CHANCE);
                let cell = if fill {
                    Cell::Filled(random_colors(rng))
                } else {
                    Cell::Empty
                };
                self.set(x, y, cell);
            }
        }
    }

    /// Lets every column's filled cells fall to the floor, keeping their order.
    pub fn settle(&mut self) {
        for x in 0..self.columns() {
            let stack: Vec<Cell> = (0..self.height)
                .rev()
                .map(|y| self.get(x, y))
                .filter(|cell| matches!(cell, Cell::Filled(_)))
                .collect();
            for y in 0..self.height {
                self.set(x, y, Cell::Empty);
            }
            for (depth, cell) in stack.into_iter().enumerate() {
                self.set(x, self.height - 1 - depth, cell);
            }
        }
    }

    #[cfg(test)]
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, Cell::Filled(_)))
            .count()
    }
}
