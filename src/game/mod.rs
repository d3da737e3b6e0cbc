//! Match state and the turn/sequence state machine.
//!
//! `GameState` owns the board for the whole match. It only changes through
//! the transition commands in `turn`; everything else is a read-only query.

pub mod command;
pub mod state;
pub mod turn;

pub use command::{Command, Outcome, Rejection};
pub use state::{DiceRoll, GameState, TurnPhase};

use crate::board::BoardError;

/// Smallest supported player count.
pub const MIN_PLAYERS: i32 = 2;

/// Largest supported player count.
pub const MAX_PLAYERS: i32 = 4;

/// Hard failures: caller contract violations and malformed match setup.
///
/// Rule violations during play are never errors; they come back as
/// `Outcome::Rejected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("player count {0} is outside {MIN_PLAYERS}..={MAX_PLAYERS}")]
    InvalidPlayerCount(i32),

    #[error("cell at ({x}, {y}) refers to player {player}, but only {nb_players} play")]
    UnknownPlayer {
        x: usize,
        y: usize,
        player: i32,
        nb_players: i32,
    },

    #[error("player {0} starts without a base")]
    MissingBase(i32),

    #[error("die value {0} is outside 1..=6")]
    InvalidDie(u32),

    #[error("inconsistent state: {0}")]
    InconsistentState(&'static str),
}
