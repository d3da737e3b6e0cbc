//! Match state and read-only queries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Direction, Pos};
use crate::movegen::{playable_positions, Progress};
use crate::resolve::{alive_players, compute_base_hp_cache, Standing};
use crate::rules::{derive_sequences, BlockType, Sequence};

use super::{GameError, MAX_PLAYERS, MIN_PLAYERS};

/// The two dice of the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub die1: u32,
    pub die2: u32,
}

impl DiceRoll {
    pub const fn sum(self) -> u32 {
        self.die1 + self.die2
    }
}

/// Where the current turn stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    Idle,
    DiceRolled,
    SequencesPending,
    SequenceActive,
    TurnComplete,
    GameOver,
}

impl TurnPhase {
    pub const fn name(self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::DiceRolled => "dice-rolled",
            TurnPhase::SequencesPending => "sequences-pending",
            TurnPhase::SequenceActive => "sequence-active",
            TurnPhase::TurnComplete => "turn-complete",
            TurnPhase::GameOver => "game-over",
        }
    }
}

/// Complete state of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) current_player: i32,
    pub(crate) nb_players: i32,
    pub(crate) dice_result: Option<DiceRoll>,
    pub(crate) dice_used: Vec<u32>,
    pub(crate) sequences_to_place: Vec<Sequence>,
    pub(crate) current_sequence_index: Option<usize>,
    pub(crate) blocks_placed_in_sequence: u32,
    pub(crate) sequence_start_position: Option<Pos>,
    pub(crate) sequence_direction: Option<Direction>,
    pub(crate) completed_sequences: BTreeSet<usize>,
    pub(crate) current_block_type: Option<BlockType>,
    pub(crate) playable_positions: Vec<Pos>,
    pub(crate) base_hp_cache: BTreeMap<i32, i32>,
    pub(crate) eliminated_players: BTreeSet<i32>,
    pub(crate) winner: Option<i32>,
    pub(crate) is_game_over: bool,
}

impl GameState {
    /// Starts a match on `board` with players `1..=nb_players`; player 1
    /// moves first.
    pub fn new(board: Board, nb_players: i32) -> Result<GameState, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&nb_players) {
            return Err(GameError::InvalidPlayerCount(nb_players));
        }
        validate_player_numbers(&board, nb_players)?;
        for player in 1..=nb_players {
            let has_base = board
                .iter()
                .any(|(_, cell)| cell.is_base() && cell.is_owned_by(player));
            if !has_base {
                return Err(GameError::MissingBase(player));
            }
        }

        let mut state = GameState {
            board,
            current_player: 1,
            nb_players,
            dice_result: None,
            dice_used: Vec::new(),
            sequences_to_place: Vec::new(),
            current_sequence_index: None,
            blocks_placed_in_sequence: 0,
            sequence_start_position: None,
            sequence_direction: None,
            completed_sequences: BTreeSet::new(),
            current_block_type: None,
            playable_positions: Vec::new(),
            base_hp_cache: BTreeMap::new(),
            eliminated_players: BTreeSet::new(),
            winner: None,
            is_game_over: false,
        };
        state.refresh_base_hp_cache();
        state.refresh_standing();
        Ok(state)
    }

    /// Checks a state that did not come from `new`, such as a restored
    /// snapshot. Destroyed bases are expected mid-match, but every cached
    /// field must agree with what the board and the turn progress imply.
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.nb_players) {
            return Err(GameError::InvalidPlayerCount(self.nb_players));
        }
        self.board.validate()?;
        validate_player_numbers(&self.board, self.nb_players)?;
        if !(1..=self.nb_players).contains(&self.current_player) {
            return Err(GameError::InconsistentState("current player out of range"));
        }
        let nb_sequences = self.sequences_to_place.len();
        if self.current_sequence_index.is_some_and(|i| i >= nb_sequences)
            || self.completed_sequences.iter().any(|&i| i >= nb_sequences)
        {
            return Err(GameError::InconsistentState("sequence index out of range"));
        }
        self.validate_dice()?;
        self.validate_progress()?;
        self.validate_standing()?;

        let expected = match self.progress() {
            Some(progress) => playable_positions(&self.board, self.current_player, &progress),
            None => Vec::new(),
        };
        if self.playable_positions != expected {
            return Err(GameError::InconsistentState(
                "playable positions do not match the board",
            ));
        }
        Ok(())
    }

    fn validate_dice(&self) -> Result<(), GameError> {
        if let Some(roll) = self.dice_result {
            if !(1..=6).contains(&roll.die1) || !(1..=6).contains(&roll.die2) {
                return Err(GameError::InconsistentState("die out of range"));
            }
        } else if !self.dice_used.is_empty() {
            return Err(GameError::InconsistentState("dice used without a roll"));
        }
        if self.sequences_to_place != derive_sequences(&self.dice_used) {
            return Err(GameError::InconsistentState("sequences do not match the dice"));
        }
        Ok(())
    }

    fn validate_progress(&self) -> Result<(), GameError> {
        let placed = self.blocks_placed_in_sequence;
        let Some(index) = self.current_sequence_index else {
            if placed > 0
                || self.current_block_type.is_some()
                || self.sequence_start_position.is_some()
                || self.sequence_direction.is_some()
            {
                return Err(GameError::InconsistentState(
                    "sequence progress without an active sequence",
                ));
            }
            return Ok(());
        };

        let seq = self.sequences_to_place[index];
        if self.completed_sequences.contains(&index) {
            return Err(GameError::InconsistentState("active sequence already completed"));
        }
        if self.current_block_type != Some(seq.block_type) {
            return Err(GameError::InconsistentState(
                "block type does not match the active sequence",
            ));
        }
        if placed >= seq.nb_blocks {
            return Err(GameError::InconsistentState("active sequence over its block count"));
        }
        match self.sequence_start_position {
            Some(start) if placed > 0 => {
                self.board.get(start)?;
            }
            None if placed == 0 => {}
            _ => {
                return Err(GameError::InconsistentState(
                    "start position does not match blocks placed",
                ));
            }
        }
        match self.sequence_direction {
            Some(dir) if placed >= 2 => {
                if !Direction::CARDINAL.contains(&dir) {
                    return Err(GameError::InconsistentState("direction is not along an axis"));
                }
            }
            None if placed < 2 => {}
            _ => {
                return Err(GameError::InconsistentState(
                    "direction does not match blocks placed",
                ));
            }
        }
        Ok(())
    }

    fn validate_standing(&self) -> Result<(), GameError> {
        let cache = compute_base_hp_cache(&self.board, self.nb_players);
        if self.base_hp_cache != cache {
            return Err(GameError::InconsistentState("base hp cache does not match the board"));
        }
        let standing = Standing::from_cache(&cache);
        let eliminated: BTreeSet<i32> = standing.eliminated.into_iter().collect();
        if self.eliminated_players != eliminated
            || self.winner != standing.winner
            || self.is_game_over != standing.is_game_over
        {
            return Err(GameError::InconsistentState("standing does not match base hp"));
        }
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> i32 {
        self.current_player
    }

    pub fn nb_players(&self) -> i32 {
        self.nb_players
    }

    pub fn dice_result(&self) -> Option<DiceRoll> {
        self.dice_result
    }

    pub fn dice_used(&self) -> &[u32] {
        &self.dice_used
    }

    pub fn sequences_to_place(&self) -> &[Sequence] {
        &self.sequences_to_place
    }

    pub fn current_sequence_index(&self) -> Option<usize> {
        self.current_sequence_index
    }

    pub fn blocks_placed_in_sequence(&self) -> u32 {
        self.blocks_placed_in_sequence
    }

    pub fn sequence_start_position(&self) -> Option<Pos> {
        self.sequence_start_position
    }

    pub fn sequence_direction(&self) -> Option<Direction> {
        self.sequence_direction
    }

    pub fn completed_sequences(&self) -> &BTreeSet<usize> {
        &self.completed_sequences
    }

    pub fn current_block_type(&self) -> Option<BlockType> {
        self.current_block_type
    }

    pub fn playable_positions(&self) -> &[Pos] {
        &self.playable_positions
    }

    pub fn base_hp_cache(&self) -> &BTreeMap<i32, i32> {
        &self.base_hp_cache
    }

    pub fn eliminated_players(&self) -> &BTreeSet<i32> {
        &self.eliminated_players
    }

    pub fn winner(&self) -> Option<i32> {
        self.winner
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// The active sequence, if one is selected.
    pub fn current_sequence(&self) -> Option<Sequence> {
        self.current_sequence_index
            .and_then(|i| self.sequences_to_place.get(i))
            .copied()
    }

    /// Blocks still to place in the active sequence (0 without one).
    pub fn remaining_blocks(&self) -> u32 {
        self.current_sequence()
            .map_or(0, |seq| seq.nb_blocks.saturating_sub(self.blocks_placed_in_sequence))
    }

    /// True once dice were committed and every derived sequence is done.
    pub fn all_sequences_completed(&self) -> bool {
        !self.sequences_to_place.is_empty()
            && self.completed_sequences.len() == self.sequences_to_place.len()
    }

    /// True while some derived sequence is still open.
    pub fn has_unplaced_sequences(&self) -> bool {
        self.completed_sequences.len() < self.sequences_to_place.len()
    }

    pub fn is_playable(&self, pos: Pos) -> bool {
        self.playable_positions.contains(&pos)
    }

    /// Positions of every cell `player` currently controls.
    pub fn player_cells(&self, player: i32) -> Vec<Pos> {
        self.board.owned_by(player)
    }

    /// Cached base hp of `player` (0 for unknown players).
    pub fn player_base_hp(&self, player: i32) -> i32 {
        self.base_hp_cache.get(&player).copied().unwrap_or(0)
    }

    /// Players whose bases still stand.
    pub fn alive_players(&self) -> Vec<i32> {
        alive_players(&self.base_hp_cache)
    }

    pub fn turn_phase(&self) -> TurnPhase {
        if self.is_game_over {
            TurnPhase::GameOver
        } else if self.dice_result.is_none() {
            TurnPhase::Idle
        } else if self.dice_used.is_empty() {
            TurnPhase::DiceRolled
        } else if self.current_sequence().is_some() {
            TurnPhase::SequenceActive
        } else if self.has_unplaced_sequences() {
            TurnPhase::SequencesPending
        } else {
            TurnPhase::TurnComplete
        }
    }

    pub(crate) fn progress(&self) -> Option<Progress> {
        let block_type = self.current_block_type?;
        let seq = self.current_sequence()?;
        Some(Progress {
            block_type,
            nb_blocks: seq.nb_blocks,
            placed: self.blocks_placed_in_sequence,
            start: self.sequence_start_position,
            direction: self.sequence_direction,
        })
    }

    pub(crate) fn refresh_playable_positions(&mut self) {
        self.playable_positions = match self.progress() {
            Some(progress) => playable_positions(&self.board, self.current_player, &progress),
            None => Vec::new(),
        };
    }

    pub(crate) fn refresh_base_hp_cache(&mut self) {
        self.base_hp_cache = compute_base_hp_cache(&self.board, self.nb_players);
    }

    pub(crate) fn refresh_standing(&mut self) {
        let standing = Standing::from_cache(&self.base_hp_cache);
        self.eliminated_players = standing.eliminated.into_iter().collect();
        self.winner = standing.winner;
        self.is_game_over = standing.is_game_over;
    }
}

/// Every player number on the board must be in range.
fn validate_player_numbers(board: &Board, nb_players: i32) -> Result<(), GameError> {
    for (pos, cell) in board.iter() {
        for player in [cell.owner, cell.territory, cell.zone] {
            if player > nb_players {
                return Err(GameError::UnknownPlayer {
                    x: pos.x,
                    y: pos.y,
                    player,
                    nb_players,
                });
            }
        }
    }
    Ok(())
}
