use crate::game::{Board, Cell, ColorTriple, Piece, Rgb};
use crate::ui::surface::{Surface, SurfaceSize};
use crate::{BLOCK_INSET, UNIT_SIZE};

const LOSS_COLORS: ColorTriple = [Rgb(80, 80, 80), Rgb(150, 150, 150), Rgb(100, 100, 100)];

/// Three concentric squares: full cell, inset highlight, inner shadow.
pub fn draw_block<S: Surface + ?Sized>(surface: &mut S, bx: i64, by: i64, colors: &ColorTriple) {
    for (layer, color) in colors.iter().enumerate() {
        let inset = BLOCK_INSET * layer as u32;
        let side = UNIT_SIZE.saturating_sub(inset * 2);
        surface.fill_rect(bx + inset as i64, by + inset as i64, side, side, *color);
    }
}

fn within(bounds: SurfaceSize, bx: i64, by: i64) -> bool {
    bx >= 0 && by >= 0 && bx < bounds.width as i64 && by < bounds.height as i64
}

/// Redraws every settled block whose origin lies inside `bounds`.
/// Returns the number of blocks drawn.
pub fn render_board<S: Surface + ?Sized>(surface: &mut S, board: &Board, bounds: SurfaceSize) -> usize {
    surface.clear();
    let unit = UNIT_SIZE as i64;
    let mut drawn = 0;
    for y in 0..board.rows() {
        for x in 0..board.columns() {
            let Cell::Filled(colors) = board.get(x, y) else {
                continue;
            };
            let (bx, by) = (x as i64 * unit, y as i64 * unit);
            if within(bounds, bx, by) {
                draw_block(surface, bx, by, &colors);
                drawn += 1;
            }
        }
    }
    drawn
}

/// Clears the surface and draws the falling piece. Returns blocks drawn.
pub fn render_piece<S: Surface + ?Sized>(surface: &mut S, piece: &Piece, bounds: SurfaceSize) -> usize {
    surface.clear();
    let unit = UNIT_SIZE as i64;
    let mut drawn = 0;
    for (x, y) in piece.cells() {
        let (bx, by) = (x as i64 * unit, y as i64 * unit);
        if within(bounds, bx, by) {
            draw_block(surface, bx, by, &piece.colors);
            drawn += 1;
        }
    }
    drawn
}

/// Paints one collapsed row of the loss sweep on top of the board.
pub fn render_loss_row<S: Surface + ?Sized>(surface: &mut S, row: i32, board_width: usize) {
    let unit = UNIT_SIZE as i64;
    for x in 0..board_width {
        draw_block(surface, x as i64 * unit, row as i64 * unit, &LOSS_COLORS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Shape;
    use crate::ui::surface::PixelSurface;

    #[test]
    fn block_has_three_nested_layers() {
        let mut surface = PixelSurface::new(SurfaceSize::new(40, 40));
        let colors = Shape::T.colors();
        draw_block(&mut surface, 20, 0, &colors);

        assert_eq!(surface.pixel(20, 0), Some(colors[0]));
        assert_eq!(surface.pixel(22, 2), Some(colors[1]));
        assert_eq!(surface.pixel(24, 4), Some(colors[2]));
        assert_eq!(surface.pixel(35, 15), Some(colors[2]));
        assert_eq!(surface.pixel(36, 16), Some(colors[1]));
        assert_eq!(surface.pixel(39, 19), Some(colors[0]));
        assert_eq!(surface.pixel(19, 0), None);
        assert_eq!(surface.painted(), 20 * 20);
    }

    #[test]
    fn board_render_skips_walls_and_empty_cells() {
        let mut board = Board::new(4, 3);
        let bounds = SurfaceSize::new(80, 60);
        let mut surface = PixelSurface::new(bounds);
        assert_eq!(render_board(&mut surface, &board, bounds), 0);
        assert_eq!(surface.painted(), 0);

        board.set(1, 2, Cell::Filled(Shape::Z.colors()));
        assert_eq!(render_board(&mut surface, &board, bounds), 1);
        assert_eq!(surface.pixel(20, 40), Some(Shape::Z.colors()[0]));
    }

    #[test]
    fn board_render_clips_to_bounds() {
        let mut board = Board::new(4, 3);
        board.set(3, 0, Cell::Filled(Shape::Z.colors()));
        board.set(4, 0, Cell::Filled(Shape::Z.colors()));
        let bounds = SurfaceSize::new(70, 60);
        let mut surface = PixelSurface::new(bounds);
        assert_eq!(render_board(&mut surface, &board, bounds), 1);
    }

    #[test]
    fn piece_above_the_board_is_not_drawn() {
        let bounds = SurfaceSize::new(200, 200);
        let mut surface = PixelSurface::new(bounds);
        let piece = Piece::new(Shape::Stick, 2, -2);
        assert_eq!(render_piece(&mut surface, &piece, bounds), 2);

        let hidden = Piece::new(Shape::Stick, 2, -4);
        assert_eq!(render_piece(&mut surface, &hidden, bounds), 0);
        assert_eq!(surface.painted(), 0);
    }

    #[test]
    fn loss_row_spans_the_board_width() {
        let mut surface = PixelSurface::new(SurfaceSize::new(100, 100));
        render_loss_row(&mut surface, 2, 3);
        assert_eq!(surface.painted(), 3 * 20 * 20);
        assert_eq!(surface.pixel(0, 40), Some(LOSS_COLORS[0]));
        assert_eq!(surface.pixel(60, 40), None);
    }
}
