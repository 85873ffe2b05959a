use std::time::Duration;

// Shared simulation/render constants.
pub const UNIT_SIZE: u32 = 20; // one board cell, in surface units
pub const BLOCK_INSET: u32 = 2; // each nested layer shrinks by this much per side
pub const TERM_COL_UNITS: u32 = 10; // one terminal column
pub const TERM_ROW_UNITS: u32 = 20; // one terminal row (two half-block samples)
pub const SAMPLE_X: u32 = 3;
pub const SAMPLE_TOP: u32 = 3;
pub const SAMPLE_BOTTOM: u32 = 13;
pub const MAX_SURFACE_PIXELS: usize = 64 * 1024 * 1024;

pub const SPAWN_Y: i32 = -4;
// A piece stuck while still above this row ends the game.
pub const LOSS_ROW: i32 = -1;
pub const LOSS_SWEEP_EXTRA_FRAMES: u32 = 2;

pub const PREPOPULATE_CHANCE: f64 = 0.85;
pub const POINTS_PER_PIECE: u64 = 10;
pub const LEVEL_STEP: u64 = 20;

pub const BASE_SPEED_MIN_MS: f64 = 50.0;
pub const BASE_SPEED_MAX_MS: f64 = 100.0;
pub const DEFAULT_SPEED_FACTOR: f64 = 1.3;

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);
pub const SOCKET_PATH: &str = "/tmp/tetris-backdrop.sock";

/// Knobs shared by every board on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub speed_factor: f64,
    pub prepopulate: bool,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_factor: DEFAULT_SPEED_FACTOR,
            prepopulate: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Falls back to the default multiplier for zero, negative or non-finite input.
    pub fn sanitized_speed_factor(factor: f64) -> f64 {
        if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            DEFAULT_SPEED_FACTOR
        }
    }

    pub fn speed_factor(&self) -> f64 {
        Self::sanitized_speed_factor(self.speed_factor)
    }
}
