//! Rock-Paper-Scissors-Lizard-Spock moves and outcome resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A move as encoded on-chain (`uint8`, 1..=5)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Move {
    Rock = 1,
    Paper = 2,
    Scissors = 3,
    Spock = 4,
    Lizard = 5,
}

/// A number outside 1..=5
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("Invalid move: {0} (expected 1-5)")]
pub struct InvalidMove(pub u8);

/// Outcome of a game from one player's perspective
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
}

impl GameOutcome {
    /// The same game seen from the other side
    pub fn reversed(self) -> Self {
        match self {
            GameOutcome::Win => GameOutcome::Loss,
            GameOutcome::Loss => GameOutcome::Win,
            GameOutcome::Draw => GameOutcome::Draw,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameOutcome::Win => "win",
            GameOutcome::Loss => "loss",
            GameOutcome::Draw => "draw",
        };
        f.write_str(s)
    }
}

impl Move {
    pub const ALL: [Move; 5] = [
        Move::Rock,
        Move::Paper,
        Move::Scissors,
        Move::Spock,
        Move::Lizard,
    ];

    /// On-chain encoding
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
            Move::Spock => "Spock",
            Move::Lizard => "Lizard",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Move::Rock => "🪨",
            Move::Paper => "📄",
            Move::Scissors => "✂️",
            Move::Spock => "🖖",
            Move::Lizard => "🦎",
        }
    }

    /// The two moves this move defeats
    pub fn defeats(self) -> [Move; 2] {
        match self {
            // Rock crushes Scissors and Lizard
            Move::Rock => [Move::Scissors, Move::Lizard],
            // Paper covers Rock and disproves Spock
            Move::Paper => [Move::Rock, Move::Spock],
            // Scissors cut Paper and decapitate Lizard
            Move::Scissors => [Move::Paper, Move::Lizard],
            // Spock smashes Scissors and vaporizes Rock
            Move::Spock => [Move::Scissors, Move::Rock],
            // Lizard poisons Spock and eats Paper
            Move::Lizard => [Move::Spock, Move::Paper],
        }
    }

    /// Check if this move beats the other
    pub fn beats(self, other: Move) -> bool {
        self.defeats().contains(&other)
    }

    /// Resolve this move against the opponent's
    pub fn resolve(self, opponent: Move) -> GameOutcome {
        if self == opponent {
            GameOutcome::Draw
        } else if self.beats(opponent) {
            GameOutcome::Win
        } else {
            GameOutcome::Loss
        }
    }
}

/// Resolve two on-chain move numbers from the first player's perspective.
///
/// Fails if either number is outside 1..=5.
pub fn resolve(your_move: u8, opponent_move: u8) -> Result<GameOutcome, InvalidMove> {
    let yours = Move::try_from(your_move)?;
    let theirs = Move::try_from(opponent_move)?;
    Ok(yours.resolve(theirs))
}

impl TryFrom<u8> for Move {
    type Error = InvalidMove;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Move::Rock),
            2 => Ok(Move::Paper),
            3 => Ok(Move::Scissors),
            4 => Ok(Move::Spock),
            5 => Ok(Move::Lizard),
            other => Err(InvalidMove(other)),
        }
    }
}

impl From<Move> for u8 {
    fn from(mv: Move) -> u8 {
        mv.as_u8()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.name())
    }
}
