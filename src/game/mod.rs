pub mod board;
pub mod collision;
pub mod lines;
pub mod piece;
pub mod state;

pub use board::{Board, Cell};
pub use piece::{random_shape, ColorTriple, Piece, Rgb, Shape};
pub use state::{Game, Input, Phase, ScoreSink, Scoreboard, TickOutcome};
