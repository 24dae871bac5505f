//! Moves and outcome resolution.

mod moves;

pub use moves::{resolve, GameOutcome, InvalidMove, Move};
