pub mod render;
pub mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::backdrop::Backdrop;
use crate::app::stage::Stage;
use crate::game::{Phase, Rgb};
use crate::{SAMPLE_BOTTOM, SAMPLE_TOP, SAMPLE_X, TERM_COL_UNITS, TERM_ROW_UNITS};

pub fn draw_stage(frame: &mut Frame, stage: &Stage) {
    let area = frame.size();
    frame.render_widget(BackdropLayer::new(stage.boards()), area);
    draw_info(frame, stage, area);
}

/// Composites every board onto the terminal with half-block glyphs: each
/// terminal cell shows an upper and a lower sample of the page.
pub struct BackdropLayer<'a> {
    boards: &'a [Rc<RefCell<Backdrop>>],
}

impl<'a> BackdropLayer<'a> {
    pub fn new(boards: &'a [Rc<RefCell<Backdrop>>]) -> Self {
        Self { boards }
    }

    fn sample(&self, page_x: i64, page_y: i64) -> Option<Rgb> {
        // Later boards are painted over earlier ones.
        self.boards
            .iter()
            .rev()
            .find_map(|board| board.borrow().sample(page_x, page_y))
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

impl Widget for BackdropLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                let px = (col as u32 * TERM_COL_UNITS + SAMPLE_X) as i64;
                let py = row as u32 * TERM_ROW_UNITS;
                let top = self.sample(px, (py + SAMPLE_TOP) as i64);
                let bottom = self.sample(px, (py + SAMPLE_BOTTOM) as i64);
                let cell = buf.get_mut(col, row);
                match (top, bottom) {
                    (None, None) => {}
                    (Some(top), Some(bottom)) => {
                        cell.set_char('▀').set_fg(to_color(top)).set_bg(to_color(bottom));
                    }
                    (Some(top), None) => {
                        cell.set_char('▀').set_fg(to_color(top));
                    }
                    (None, Some(bottom)) => {
                        cell.set_char('▄').set_fg(to_color(bottom));
                    }
                }
            }
        }
    }
}

fn draw_info(frame: &mut Frame, stage: &Stage, area: Rect) {
    const WIDTH: u16 = 18;
    const HEIGHT: u16 = 6;
    if area.width < WIDTH || area.height < HEIGHT {
        return;
    }

    let mut lines = 0;
    let mut level = 0;
    let mut status = "ACTIVE";
    for board in stage.boards() {
        let board = board.borrow();
        let game = board.game();
        lines += game.lines_cleared;
        level = level.max(game.level);
        status = match (status, game.phase()) {
            (_, Phase::Lost { .. }) | ("LOST", _) => "LOST",
            (_, Phase::Halted) => "OVER",
            (current, Phase::Playing) => current,
        };
    }

    let rect = Rect {
        x: area.right() - WIDTH,
        y: area.top(),
        width: WIDTH,
        height: HEIGHT,
    };
    let panel = Paragraph::new(vec![
        Line::raw(format!("{:<7} {}", "SCORE:", stage.score())),
        Line::raw(format!("{:<7} {}", "LINES:", lines)),
        Line::raw(format!("{:<7} {}", "LEVEL:", level)),
        Line::raw(format!("{:<7} {}", "STATUS:", status)),
    ])
    .alignment(Alignment::Left)
    .block(Block::default().title("INFO").borders(Borders::ALL));
    frame.render_widget(Clear, rect);
    frame.render_widget(panel, rect);
}
