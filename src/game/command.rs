//! The closed set of commands and their outcomes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Pos;

use super::state::GameState;
use super::GameError;

/// A command a player (or the presentation layer on their behalf) issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    RollDice,
    /// Rolls with fixed dice values, for replays and scripted setups.
    RollDiceWith { die1: u32, die2: u32 },
    CommitDiceUsage { use_sum: bool },
    SelectSequence { index: usize },
    PlaceBlock { x: usize, y: usize },
    PassTurn,
}

/// Why a command was turned down. The state is untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    GameOver,
    DiceAlreadyRolled,
    NoDiceRolled,
    DiceAlreadyUsed,
    NoSequences,
    SequenceOutOfRange,
    SequenceCompleted,
    SequenceInProgress,
    NoActiveSequence,
    SequenceFull,
    NotPlayable,
}

impl Rejection {
    /// Short machine-friendly reason used by the text protocol.
    pub const fn reason(self) -> &'static str {
        match self {
            Rejection::GameOver => "game-over",
            Rejection::DiceAlreadyRolled => "dice-already-rolled",
            Rejection::NoDiceRolled => "no-dice-rolled",
            Rejection::DiceAlreadyUsed => "dice-already-used",
            Rejection::NoSequences => "no-sequences",
            Rejection::SequenceOutOfRange => "sequence-out-of-range",
            Rejection::SequenceCompleted => "sequence-completed",
            Rejection::SequenceInProgress => "sequence-in-progress",
            Rejection::NoActiveSequence => "no-active-sequence",
            Rejection::SequenceFull => "sequence-full",
            Rejection::NotPlayable => "not-playable",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Result of a well-formed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub const fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

impl GameState {
    /// Runs one command to completion.
    pub fn apply(&mut self, command: Command, rng: &mut impl Rng) -> Result<Outcome, GameError> {
        match command {
            Command::RollDice => Ok(self.roll_dice(rng)),
            Command::RollDiceWith { die1, die2 } => self.roll_dice_with(die1, die2),
            Command::CommitDiceUsage { use_sum } => Ok(self.commit_dice_usage(use_sum)),
            Command::SelectSequence { index } => Ok(self.select_sequence(index)),
            Command::PlaceBlock { x, y } => self.place_block(Pos::new(x, y)),
            Command::PassTurn => Ok(self.pass_turn()),
        }
    }
}
