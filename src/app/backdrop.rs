use std::rc::Rc;
use std::time::Instant;

use crate::{MAX_SURFACE_PIXELS, UNIT_SIZE};
use crate::app::scheduler::FrameTask;
use crate::config::Settings;
use crate::game::{Game, Input, Rgb, ScoreSink, TickOutcome};
use crate::ui::render::{render_board, render_loss_row, render_piece};
use crate::ui::surface::{PixelSurface, Surface, SurfaceSize};

/// Terminal page size in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

/// Where a board sits on the page. Missing or zero dimensions fall back to
/// the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One self-playing board with its own background and foreground surfaces.
pub struct Backdrop {
    pub x: u32,
    pub y: u32,
    width: u32,
    height: u32,
    game: Game,
    background: PixelSurface,
    foreground: PixelSurface,
    epoch: u64,
}

fn board_dims(width: u32, height: u32) -> (usize, usize) {
    ((width / UNIT_SIZE) as usize, (height / UNIT_SIZE) as usize)
}

fn fits(width: u32, height: u32) -> bool {
    SurfaceSize::new(width, height).pixel_count() <= MAX_SURFACE_PIXELS
}

// Shrinks the height until the surface fits under the pixel cap.
fn capped(width: u32, height: u32) -> (u32, u32) {
    let width = width.min(MAX_SURFACE_PIXELS as u32);
    let max_height = MAX_SURFACE_PIXELS / width.max(1) as usize;
    (width, height.min(max_height as u32))
}

impl Backdrop {
    pub fn new(
        placement: Placement,
        page: PageSize,
        settings: &Settings,
        score: Option<Rc<dyn ScoreSink>>,
        now: Instant,
    ) -> Self {
        let width = placement.width.filter(|w| *w > 0).unwrap_or(page.width);
        let height = placement.height.filter(|h| *h > 0).unwrap_or(page.height);
        let (width, height) = if fits(width, height) {
            (width, height)
        } else {
            capped(page.width, page.height)
        };
        let (cols, rows) = board_dims(width, height);
        let size = SurfaceSize::new(width, height);
        let mut backdrop = Self {
            x: placement.x,
            y: placement.y,
            width,
            height,
            game: Game::new(cols, rows, settings, score, now),
            background: PixelSurface::new(size),
            foreground: PixelSurface::new(size),
            epoch: 0,
        };
        backdrop.render_all();
        backdrop
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    #[cfg(test)]
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    #[cfg(test)]
    pub fn background(&self) -> &PixelSurface {
        &self.background
    }

    #[cfg(test)]
    pub fn foreground(&self) -> &PixelSurface {
        &self.foreground
    }

    /// Generation of the current tick chain; bumped by every reset so stale
    /// scheduled continuations can recognise themselves.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Runs one scheduled continuation and returns the one to schedule next.
    pub fn run(&mut self, task: FrameTask, now: Instant) -> Option<FrameTask> {
        match task {
            FrameTask::Tick => match self.game.tick(now) {
                TickOutcome::Running => {
                    if self.game.take_board_dirty() {
                        self.render_board();
                    }
                    self.render_piece();
                    Some(FrameTask::Tick)
                }
                TickOutcome::Lost => self.loss_frame(),
                TickOutcome::Inert => None,
            },
            FrameTask::LossFrame => self.loss_frame(),
        }
    }

    fn loss_frame(&mut self) -> Option<FrameTask> {
        let row = self.game.next_loss_row()?;
        render_loss_row(&mut self.background, row, self.game.board.width);
        self.game.loss_sweep_pending().then_some(FrameTask::LossFrame)
    }

    /// Empties the board, re-rolls speed and starts a fresh tick chain.
    pub fn reset(&mut self, now: Instant) {
        self.epoch += 1;
        self.game.reset(now);
        self.foreground.clear();
        self.game.take_board_dirty();
        self.render_board();
    }

    pub fn set_prepopulate(&mut self, enabled: bool) {
        self.game.set_prepopulate(enabled);
        self.game.take_board_dirty();
        self.render_board();
    }

    pub fn set_speed_factor(&mut self, factor: f64) {
        self.game.set_speed_factor(factor);
    }

    pub fn handle_input(&mut self, input: Input) -> bool {
        self.game.handle_input(input)
    }

    /// Resizes both surfaces and the board, keeping overlapping cells.
    /// Returns false (and touches nothing) when the size is unchanged or
    /// too large for a surface.
    pub fn adjust_size(&mut self, width: u32, height: u32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        let width = if width > 0 { width } else { self.width };
        let height = if height > 0 { height } else { self.height };
        if width == self.width && height == self.height {
            return false;
        }
        let size = SurfaceSize::new(width, height);
        if self.background.resize(size).is_err() || self.foreground.resize(size).is_err() {
            return false;
        }
        self.width = width;
        self.height = height;
        let (cols, rows) = board_dims(width, height);
        self.game.resize_board(cols, rows);
        self.render_all();
        true
    }

    /// Follows the document height while keeping the configured width.
    pub fn update_size_from_document(&mut self, page: PageSize) -> bool {
        self.adjust_size(self.width, page.height)
    }

    pub fn render_board(&mut self) -> usize {
        let bounds = self.size();
        render_board(&mut self.background, &self.game.board, bounds)
    }

    pub fn render_piece(&mut self) -> usize {
        let bounds = self.size();
        render_piece(&mut self.foreground, &self.game.current, bounds)
    }

    fn render_all(&mut self) {
        self.game.take_board_dirty();
        self.render_board();
        if self.game.is_playing() {
            self.render_piece();
        }
    }

    /// Composited colour at a page position, foreground over background.
    pub fn sample(&self, page_x: i64, page_y: i64) -> Option<Rgb> {
        let x = page_x - self.x as i64;
        let y = page_y - self.y as i64;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.foreground
            .pixel(x, y)
            .or_else(|| self.background.pixel(x, y))
    }
}
