use std::cell::Cell as Counter;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Settings;
use crate::game::lines::level_for;
use crate::game::{random_shape, Board, Piece, Shape};
use crate::{
    BASE_SPEED_MAX_MS, BASE_SPEED_MIN_MS, LOSS_ROW, LOSS_SWEEP_EXTRA_FRAMES, POINTS_PER_PIECE,
};

/// Receives points awarded by a board.
pub trait ScoreSink {
    fn award(&self, points: u64);
}

/// Score shared by every board on a page.
#[derive(Clone, Default, Debug)]
pub struct Scoreboard(Rc<Counter<u64>>);

impl Scoreboard {
    pub fn total(&self) -> u64 {
        self.0.get()
    }
}

impl ScoreSink for Scoreboard {
    fn award(&self, points: u64) {
        self.0.set(self.0.get() + points);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Left,
    Right,
    Down,
    Rotate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Loss sweep in progress; `frame` rows have been drawn so far.
    Lost { frame: u32 },
    /// Sweep finished. Only a reset leaves this phase.
    Halted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    Lost,
    Inert,
}

pub struct Game {
    pub board: Board,
    pub current: Piece,
    pub lines_cleared: u64,
    pub level: u64,
    phase: Phase,
    base_speed: Duration,
    speed_factor: f64,
    cur_speed: Duration,
    next_move: Instant,
    board_dirty: bool,
    rng: StdRng,
    score: Option<Rc<dyn ScoreSink>>,
}

impl Game {
    pub fn new(
        width: usize,
        height: usize,
        settings: &Settings,
        score: Option<Rc<dyn ScoreSink>>,
        now: Instant,
    ) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut game = Self {
            board: Board::new(width, height),
            current: Piece::spawn(Shape::Stick, width),
            lines_cleared: 0,
            level: 0,
            phase: Phase::Playing,
            base_speed: Duration::ZERO,
            speed_factor: settings.speed_factor(),
            cur_speed: Duration::ZERO,
            next_move: now,
            board_dirty: true,
            rng,
            score,
        };
        if settings.prepopulate {
            game.board.set_prepopulate(true, &mut game.rng);
            game.board.settle();
        }
        game.restart(now);
        game
    }

    /// Empties the board and starts over. Safe to call in any phase.
    pub fn reset(&mut self, now: Instant) {
        self.board.clear();
        self.restart(now);
    }

    fn restart(&mut self, now: Instant) {
        self.lines_cleared = 0;
        self.level = 0;
        self.phase = Phase::Playing;
        self.roll_speed();
        self.next_move = now;
        self.clear_lines();
        self.board_dirty = true;
        self.spawn();
    }

    fn roll_speed(&mut self) {
        let ms = self.rng.gen_range(BASE_SPEED_MIN_MS..BASE_SPEED_MAX_MS);
        self.base_speed = Duration::from_secs_f64(ms / 1000.0);
        self.apply_speed_factor();
    }

    fn apply_speed_factor(&mut self) {
        self.cur_speed = self.base_speed.mul_f64(self.speed_factor);
    }

    pub fn set_speed_factor(&mut self, factor: f64) {
        self.speed_factor = Settings::sanitized_speed_factor(factor);
        self.apply_speed_factor();
    }

    #[cfg(test)]
    pub fn cur_speed(&self) -> Duration {
        self.cur_speed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Returns whether the settled board changed since the last call.
    pub fn take_board_dirty(&mut self) -> bool {
        std::mem::take(&mut self.board_dirty)
    }

    pub fn spawn(&mut self) {
        let shape = random_shape(&mut self.rng);
        self.current = Piece::spawn(shape, self.board.width);
    }

    /// One simulation step. Gravity only advances once `now` passes the
    /// scheduled move time, so the fall rate is independent of frame rate.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Inert;
        }
        if !self.board.can_move(&self.current, 0, 1) {
            if self.current.y < LOSS_ROW {
                self.phase = Phase::Lost { frame: 0 };
                return TickOutcome::Lost;
            }
            let piece = self.current.clone();
            self.place(&piece);
            self.spawn();
        } else if now > self.next_move {
            self.next_move = now + self.cur_speed;
            self.current.y += 1;
        }
        TickOutcome::Running
    }

    /// Locks `piece` into the board, awards the flat placement score and
    /// clears any completed rows.
    pub fn place(&mut self, piece: &Piece) {
        self.board.merge(piece);
        if let Some(score) = &self.score {
            score.award(POINTS_PER_PIECE);
        }
        self.clear_lines();
        self.board_dirty = true;
    }

    fn clear_lines(&mut self) {
        let cleared = self.board.clear_full_lines();
        if cleared > 0 {
            self.lines_cleared += cleared;
            self.level = level_for(self.lines_cleared);
            self.board_dirty = true;
        }
    }

    pub fn handle_input(&mut self, input: Input) -> bool {
        if !self.is_playing() {
            return false;
        }
        match input {
            Input::Left => self.try_shift(-1, 0),
            Input::Right => self.try_shift(1, 0),
            Input::Down => self.try_shift(0, 1),
            Input::Rotate => self.rotate_current(),
        }
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        if self.board.can_move(&self.current, dx, dy) {
            self.current.x += dx;
            self.current.y += dy;
            true
        } else {
            false
        }
    }

    pub fn rotate_current(&mut self) -> bool {
        let next = self.current.rotated();
        if self.board.can_move(&next, 0, 0) {
            self.current = next;
            true
        } else {
            false
        }
    }

    pub fn set_prepopulate(&mut self, enabled: bool) {
        self.board.set_prepopulate(enabled, &mut self.rng);
        self.board_dirty = true;
    }

    pub fn resize_board(&mut self, width: usize, height: usize) {
        self.board.resize(width, height);
        self.board_dirty = true;
    }

    pub fn loss_sweep_pending(&self) -> bool {
        matches!(self.phase, Phase::Lost { .. })
    }

    /// Next row of the loss sweep, bottom (the wall row) first, one per call.
    pub fn next_loss_row(&mut self) -> Option<i32> {
        let Phase::Lost { frame } = self.phase else {
            return None;
        };
        let total = self.board.height as u32 + LOSS_SWEEP_EXTRA_FRAMES;
        if frame >= total {
            self.phase = Phase::Halted;
            return None;
        }
        self.phase = if frame + 1 >= total {
            Phase::Halted
        } else {
            Phase::Lost { frame: frame + 1 }
        };
        Some(self.board.height as i32 - frame as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;

    fn settings() -> Settings {
        Settings {
            seed: Some(11),
            ..Settings::default()
        }
    }

    fn game_with_score(width: usize, height: usize) -> (Game, Scoreboard, Instant) {
        let now = Instant::now();
        let scoreboard = Scoreboard::default();
        let sink: Rc<dyn ScoreSink> = Rc::new(scoreboard.clone());
        (Game::new(width, height, &settings(), Some(sink), now), scoreboard, now)
    }

    // Leaves the last column open so no row is ever full.
    fn fill_below(board: &mut Board, from_row: usize) {
        for y in from_row..board.height {
            for x in 0..board.width - 1 {
                board.set(x, y, Cell::Filled(Shape::S.colors()));
            }
        }
    }

    fn tick_until_lost(game: &mut Game, now: Instant) -> bool {
        (1..=10).any(|s| game.tick(now + Duration::from_secs(s)) == TickOutcome::Lost)
    }

    #[test]
    fn new_game_spawns_above_the_board() {
        let (game, score, _) = game_with_score(10, 20);
        assert_eq!(game.current.y, crate::SPAWN_Y);
        assert_eq!(game.current.x, 3);
        assert_eq!(game.board.filled_count(), 0);
        assert!(game.is_playing());
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn speed_is_randomized_base_times_factor() {
        let (game, _, _) = game_with_score(10, 20);
        let ms = game.cur_speed().as_secs_f64() * 1000.0;
        assert!(ms >= BASE_SPEED_MIN_MS * 1.3 - 1e-6);
        assert!(ms < BASE_SPEED_MAX_MS * 1.3 + 1e-6);
    }

    #[test]
    fn gravity_is_time_gated() {
        let (mut game, _, now) = game_with_score(10, 20);
        let start = game.current.y;

        // First tick after the initial schedule moves.
        game.tick(now + Duration::from_millis(1));
        assert_eq!(game.current.y, start + 1);

        // Immediately again: not due yet.
        game.tick(now + Duration::from_millis(2));
        assert_eq!(game.current.y, start + 1);

        game.tick(now + Duration::from_secs(1));
        assert_eq!(game.current.y, start + 2);
    }

    #[test]
    fn resting_piece_is_placed_and_scored() {
        let (mut game, score, now) = game_with_score(10, 20);
        game.current = Piece::new(Shape::Box, 0, 17);
        assert_eq!(game.tick(now), TickOutcome::Running);
        assert_eq!(game.board.filled_count(), 4);
        assert_eq!(score.total(), POINTS_PER_PIECE);
        assert_eq!(game.current.y, crate::SPAWN_Y);
        assert!(game.take_board_dirty());
        assert!(!game.take_board_dirty());
    }

    #[test]
    fn placing_a_completing_piece_clears_the_line() {
        let (mut game, score, now) = game_with_score(4, 6);
        for x in 0..2 {
            game.board.set(x, 5, Cell::Filled(Shape::T.colors()));
        }
        // Box occupies mask columns 1..=2, so x = 1 covers board columns 2..=3.
        game.current = Piece::new(Shape::Box, 1, 3);
        game.tick(now);

        assert_eq!(game.lines_cleared, 1);
        assert_eq!(game.level, 0);
        assert_eq!(game.board.filled_count(), 2);
        assert!(game.board.get(2, 5).is_occupied());
        assert_eq!(score.total(), POINTS_PER_PIECE);
    }

    #[test]
    fn stuck_spawn_is_a_loss() {
        let (mut game, score, now) = game_with_score(10, 20);
        fill_below(&mut game.board, 0);
        assert!(tick_until_lost(&mut game, now));
        assert!(game.current.y < LOSS_ROW);
        assert_eq!(game.phase(), Phase::Lost { frame: 0 });
        assert_eq!(score.total(), 0);
        assert_eq!(game.tick(now + Duration::from_secs(60)), TickOutcome::Inert);
        assert!(!game.handle_input(Input::Left));
    }

    #[test]
    fn piece_resting_at_the_top_is_not_a_loss() {
        let (mut game, _, now) = game_with_score(10, 20);
        fill_below(&mut game.board, 2);
        // Box rows are mask 1..=2, so y = -1 rests on board rows 0..=1.
        game.current = Piece::new(Shape::Box, 3, -1);
        assert_eq!(game.tick(now), TickOutcome::Running);
        assert!(game.is_playing());

        game.current = Piece::new(Shape::Box, 3, -2);
        fill_below(&mut game.board, 1);
        assert_eq!(game.tick(now), TickOutcome::Lost);
    }

    #[test]
    fn loss_sweep_runs_height_plus_two_rows() {
        let (mut game, _, now) = game_with_score(6, 8);
        fill_below(&mut game.board, 0);
        assert!(tick_until_lost(&mut game, now));

        let rows: Vec<i32> = std::iter::from_fn(|| game.next_loss_row()).collect();
        assert_eq!(rows.len(), 8 + 2);
        assert_eq!(rows.first(), Some(&8));
        assert_eq!(rows.last(), Some(&-1));
        assert_eq!(game.phase(), Phase::Halted);
        assert_eq!(game.next_loss_row(), None);
    }

    #[test]
    fn reset_recovers_from_loss() {
        let (mut game, score, now) = game_with_score(10, 20);
        fill_below(&mut game.board, 0);
        assert!(tick_until_lost(&mut game, now));
        game.reset(now);

        assert!(game.is_playing());
        assert_eq!(game.board.filled_count(), 0);
        assert_eq!(game.lines_cleared, 0);
        assert_eq!(game.current.y, crate::SPAWN_Y);
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn input_moves_only_when_legal() {
        let (mut game, _, _) = game_with_score(10, 20);
        game.current = Piece::new(Shape::Box, -1, 5);
        assert!(!game.handle_input(Input::Left));
        assert!(game.handle_input(Input::Right));
        assert_eq!(game.current.x, 0);
        assert!(game.handle_input(Input::Down));
        assert_eq!(game.current.y, 6);

        game.current = Piece::new(Shape::Box, 3, 17);
        assert!(!game.handle_input(Input::Down));
        assert_eq!(game.board.filled_count(), 0, "down never locks");
    }

    #[test]
    fn rotation_against_the_left_wall_is_rejected() {
        let (mut game, _, _) = game_with_score(10, 20);
        // Vertical stick lives in mask column 2, so x = -2 puts it on column 0.
        game.current = Piece::new(Shape::Stick, -2, 5);
        let before = game.current.clone();
        assert!(!game.handle_input(Input::Rotate));
        assert_eq!(game.current, before);

        game.current = Piece::new(Shape::Stick, 0, 5);
        assert!(game.handle_input(Input::Rotate));
        let cols: Vec<i32> = game.current.cells().map(|(x, _)| x).collect();
        assert_eq!(cols, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rotation_into_blocks_is_rejected() {
        let (mut game, _, _) = game_with_score(10, 20);
        game.current = Piece::new(Shape::Stick, 0, 5);
        game.board.set(3, 6, Cell::Filled(Shape::Z.colors()));
        let before = game.current.clone();
        assert!(!game.rotate_current());
        assert_eq!(game.current, before);
    }

    #[test]
    fn prepopulated_start_is_settled() {
        let now = Instant::now();
        let settings = Settings {
            prepopulate: true,
            ..settings()
        };
        let game = Game::new(10, 20, &settings, None, now);
        assert!(game.board.filled_count() > 0);
        for x in 0..game.board.width {
            let mut seen_block = false;
            for y in 0..game.board.height {
                let filled = game.board.get(x, y).is_occupied();
                assert!(!seen_block || filled, "gap under a block in column {x}");
                seen_block |= filled;
            }
        }
    }

    #[test]
    fn speed_factor_setter_rescales() {
        let (mut game, _, _) = game_with_score(10, 20);
        let before = game.cur_speed();
        game.set_speed_factor(2.6);
        let ratio = game.cur_speed().as_secs_f64() / before.as_secs_f64();
        assert!((ratio - 2.0).abs() < 1e-6);
        game.set_speed_factor(-1.0);
        assert!((game.cur_speed().as_secs_f64() - before.as_secs_f64()).abs() < 1e-9);
    }
}
