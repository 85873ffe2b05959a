use std::error::Error;

use clap::Parser;

mod app;
mod config;
mod game;
mod io;
mod ui;
pub use config::{
    BASE_SPEED_MAX_MS, BASE_SPEED_MIN_MS, BLOCK_INSET, DEFAULT_SPEED_FACTOR, FRAME_INTERVAL,
    LEVEL_STEP, LOSS_ROW, LOSS_SWEEP_EXTRA_FRAMES, MAX_SURFACE_PIXELS, POINTS_PER_PIECE,
    PREPOPULATE_CHANCE, RESIZE_DEBOUNCE, SAMPLE_BOTTOM, SAMPLE_TOP, SAMPLE_X, SOCKET_PATH,
    SPAWN_Y, TERM_COL_UNITS, TERM_ROW_UNITS, UNIT_SIZE,
};

use app::backdrop::Placement;
use config::Settings;

#[derive(Parser, Debug)]
#[command(version, about = "Self-playing falling-block backdrop for the terminal", long_about = None)]
struct Args {
    /// Multiplier on the randomized fall interval; larger is slower.
    #[arg(long, default_value_t = DEFAULT_SPEED_FACTOR)]
    speed_factor: f64,
    /// Start with the lower half of every board randomly filled.
    #[arg(long)]
    prepopulate: bool,
    /// Seed for piece and speed randomness (board i uses seed + i).
    #[arg(short, long)]
    seed: Option<u64>,
    /// Horizontal offset of the first board, in units (one terminal column is 10).
    #[arg(long, default_value_t = 0)]
    x: u32,
    /// Vertical offset, in units (one terminal row is 20).
    #[arg(long, default_value_t = 0)]
    y: u32,
    /// Total width in units; defaults to the terminal width.
    #[arg(long)]
    width: Option<u32>,
    /// Height in units; defaults to the terminal height.
    #[arg(long)]
    height: Option<u32>,
    /// Number of boards laid side by side.
    #[arg(short, long, default_value_t = 1)]
    boards: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let settings = Settings {
        speed_factor: Settings::sanitized_speed_factor(args.speed_factor),
        prepopulate: args.prepopulate,
        seed: args.seed,
    };
    let placement = Placement {
        x: args.x,
        y: args.y,
        width: args.width,
        height: args.height,
    };

    // Restore the terminal before printing a panic so the message stays readable.
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::ExecutableCommand::execute(
            &mut std::io::stderr(),
            crossterm::terminal::LeaveAlternateScreen,
        );
        let _ = crossterm::ExecutableCommand::execute(&mut std::io::stderr(), crossterm::cursor::Show);
        eprint!("{panic_info}\n\n");
    }));

    app::run(settings, placement, args.boards)
}
