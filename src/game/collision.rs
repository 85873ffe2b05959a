use crate::game::{Board, Cell, Piece};

impl Board {
    /// Whether `piece` shifted by (`dx`, `dy`) fits.
    ///
    /// Rows above the board (negative `y`) are always open so pieces can
    /// spawn partially off the top; the floor and both sides are hard bounds.
    pub fn can_move(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        piece.cells().all(|(x, y)| {
            let (x, y) = (x + dx, y + dy);
            if x < 0 || x >= self.width as i32 || y > self.height as i32 {
                return false;
            }
            y < 0 || !self.get(x as usize, y as usize).is_occupied()
        })
    }

    /// Writes the piece's in-bounds cells into the grid. Cells above the
    /// board are dropped.
    pub fn merge(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                self.set(x as usize, y as usize, Cell::Filled(piece.colors));
            }
        }
    }
}
