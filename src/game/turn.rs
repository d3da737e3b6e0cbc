//! Turn and sequence transitions.
//!
//! Every command checks its guards first and leaves the state untouched
//! when one fails.

use rand::Rng;
use tracing::{debug, info};

use crate::board::{Direction, Pos, DESTROYED};
use crate::resolve::apply_territory_capture;
use crate::rules::{derive_sequences, BlockType};

use super::command::{Outcome, Rejection};
use super::state::{DiceRoll, GameState};
use super::GameError;

fn reject(reason: Rejection) -> Outcome {
    debug!(%reason, "command rejected");
    Outcome::Rejected(reason)
}

impl GameState {
    /// Rolls two dice for the current player.
    pub fn roll_dice(&mut self, rng: &mut impl Rng) -> Outcome {
        if let Some(reason) = self.roll_guard() {
            return reject(reason);
        }
        let roll = DiceRoll {
            die1: rng.gen_range(1..=6),
            die2: rng.gen_range(1..=6),
        };
        self.accept_roll(roll);
        Outcome::Applied
    }

    /// Rolls with fixed values. Both must lie in 1..=6.
    pub fn roll_dice_with(&mut self, die1: u32, die2: u32) -> Result<Outcome, GameError> {
        for die in [die1, die2] {
            if !(1..=6).contains(&die) {
                return Err(GameError::InvalidDie(die));
            }
        }
        if let Some(reason) = self.roll_guard() {
            return Ok(reject(reason));
        }
        self.accept_roll(DiceRoll { die1, die2 });
        Ok(Outcome::Applied)
    }

    fn roll_guard(&self) -> Option<Rejection> {
        if self.is_game_over {
            Some(Rejection::GameOver)
        } else if self.dice_result.is_some() {
            Some(Rejection::DiceAlreadyRolled)
        } else if !self.dice_used.is_empty() {
            Some(Rejection::DiceAlreadyUsed)
        } else {
            None
        }
    }

    fn accept_roll(&mut self, roll: DiceRoll) {
        debug!(
            player = self.current_player,
            die1 = roll.die1,
            die2 = roll.die2,
            "dice rolled"
        );
        self.dice_result = Some(roll);
        self.reset_sequences();
    }

    /// Turns the rolled dice into sequences, either from their sum or from
    /// each die separately.
    pub fn commit_dice_usage(&mut self, use_sum: bool) -> Outcome {
        if self.is_game_over {
            return reject(Rejection::GameOver);
        }
        let Some(roll) = self.dice_result else {
            return reject(Rejection::NoDiceRolled);
        };
        if !self.dice_used.is_empty() {
            return reject(Rejection::DiceAlreadyUsed);
        }

        self.dice_used = if use_sum {
            vec![roll.sum()]
        } else {
            vec![roll.die1, roll.die2]
        };
        self.reset_sequences();
        self.sequences_to_place = derive_sequences(&self.dice_used);
        debug!(
            player = self.current_player,
            use_sum,
            sequences = self.sequences_to_place.len(),
            "dice committed"
        );
        Outcome::Applied
    }

    /// Makes `index` the active sequence.
    ///
    /// Switching is refused once the active sequence has a block down.
    pub fn select_sequence(&mut self, index: usize) -> Outcome {
        if self.is_game_over {
            return reject(Rejection::GameOver);
        }
        if self.sequences_to_place.is_empty() {
            return reject(Rejection::NoSequences);
        }
        let Some(seq) = self.sequences_to_place.get(index).copied() else {
            return reject(Rejection::SequenceOutOfRange);
        };
        if self.completed_sequences.contains(&index) {
            return reject(Rejection::SequenceCompleted);
        }
        if self.blocks_placed_in_sequence > 0 {
            return reject(Rejection::SequenceInProgress);
        }

        self.activate_sequence(index, seq.block_type);
        debug!(
            player = self.current_player,
            index,
            sequence = %seq,
            playable = self.playable_positions.len(),
            "sequence selected"
        );
        Outcome::Applied
    }

    /// Places the next block of the active sequence at `pos`.
    ///
    /// Coordinates outside the board are a caller error.
    pub fn place_block(&mut self, pos: Pos) -> Result<Outcome, GameError> {
        self.board.get(pos)?;

        if self.is_game_over {
            return Ok(reject(Rejection::GameOver));
        }
        let (Some(seq), Some(block_type)) = (self.current_sequence(), self.current_block_type)
        else {
            return Ok(reject(Rejection::NoActiveSequence));
        };
        if self.blocks_placed_in_sequence >= seq.nb_blocks {
            return Ok(reject(Rejection::SequenceFull));
        }
        if !self.is_playable(pos) {
            return Ok(reject(Rejection::NotPlayable));
        }

        let player = self.current_player;
        let remaining = self.remaining_blocks();
        let cell = self.board.get_mut(pos)?;
        let hit_base = block_type == BlockType::Attack && cell.is_enemy_base(player);
        let touched_base = cell.is_base();

        match block_type {
            BlockType::Destroy => {
                cell.hp = cell.hp.max(1) - 1;
                if cell.hp <= 0 {
                    cell.owner = DESTROYED;
                    cell.hp = 0;
                }
            }
            BlockType::Attack if hit_base => {
                cell.hp -= remaining as i32;
                if cell.hp <= 0 {
                    cell.owner = DESTROYED;
                    cell.hp = 0;
                }
            }
            BlockType::Attack | BlockType::Defense => {
                cell.owner = player;
                cell.hp = 1;
            }
        }
        debug!(player, %pos, block_type = %block_type, "block placed");
        self.after_cell_mutation(touched_base);

        if hit_base {
            self.blocks_placed_in_sequence = seq.nb_blocks;
            self.complete_sequence();
            return Ok(Outcome::Applied);
        }

        self.blocks_placed_in_sequence += 1;
        if self.blocks_placed_in_sequence == 1 && seq.nb_blocks > 1 {
            self.sequence_start_position = Some(pos);
        } else if self.blocks_placed_in_sequence == 2 {
            self.sequence_direction = self
                .sequence_start_position
                .and_then(|start| Direction::between(start, pos));
        }

        if self.blocks_placed_in_sequence >= seq.nb_blocks {
            self.complete_sequence();
        } else {
            self.refresh_playable_positions();
        }
        Ok(Outcome::Applied)
    }

    /// Ends the current player's turn.
    pub fn pass_turn(&mut self) -> Outcome {
        if self.is_game_over {
            return reject(Rejection::GameOver);
        }
        self.dice_result = None;
        self.dice_used.clear();
        self.reset_sequences();

        self.refresh_base_hp_cache();
        self.refresh_standing();
        if self.is_game_over {
            self.announce_winner();
            return Outcome::Applied;
        }

        let previous = self.current_player;
        let mut next = previous;
        for _ in 0..self.nb_players {
            next = next % self.nb_players + 1;
            if !self.eliminated_players.contains(&next) {
                break;
            }
        }
        self.current_player = next;
        debug!(previous, next, "turn passed");
        Outcome::Applied
    }

    fn activate_sequence(&mut self, index: usize, block_type: BlockType) {
        self.current_sequence_index = Some(index);
        self.current_block_type = Some(block_type);
        self.blocks_placed_in_sequence = 0;
        self.sequence_start_position = None;
        self.sequence_direction = None;
        self.refresh_playable_positions();
    }

    /// Marks the active sequence done, captures territory, and moves on to
    /// the next open sequence if there is one.
    fn complete_sequence(&mut self) {
        let Some(index) = self.current_sequence_index else {
            return;
        };
        self.completed_sequences.insert(index);
        apply_territory_capture(&mut self.board, self.current_player);
        debug!(player = self.current_player, index, "sequence completed");

        let next = (index + 1..self.sequences_to_place.len())
            .chain(0..index)
            .find(|i| !self.completed_sequences.contains(i));
        match next {
            Some(next) => {
                let block_type = self.sequences_to_place[next].block_type;
                self.activate_sequence(next, block_type);
            }
            None => {
                self.current_sequence_index = None;
                self.current_block_type = None;
                self.blocks_placed_in_sequence = 0;
                self.sequence_start_position = None;
                self.sequence_direction = None;
                self.playable_positions.clear();
            }
        }
    }

    fn after_cell_mutation(&mut self, touched_base: bool) {
        if touched_base {
            self.refresh_base_hp_cache();
        }
        let before = self.eliminated_players.clone();
        self.refresh_standing();
        for player in self.eliminated_players.difference(&before) {
            info!(player, "player eliminated");
        }
        if self.is_game_over {
            self.announce_winner();
        }
    }

    fn announce_winner(&self) {
        match self.winner {
            Some(winner) => info!(winner, "game over"),
            None => info!("game over without a winner"),
        }
    }

    fn reset_sequences(&mut self) {
        self.sequences_to_place.clear();
        self.current_sequence_index = None;
        self.blocks_placed_in_sequence = 0;
        self.sequence_start_position = None;
        self.sequence_direction = None;
        self.completed_sequences.clear();
        self.current_block_type = None;
        self.playable_positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Cell};
    use crate::game::TurnPhase;
    use crate::rules::Sequence;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn board_with(width: usize, height: usize, edits: &[(usize, usize, Cell)]) -> Board {
        let mut columns = vec![vec![Cell::land(); height]; width];
        for &(x, y, cell) in edits {
            columns[x][y] = cell;
        }
        Board::from_columns(columns).unwrap()
    }

    fn block(player: i32) -> Cell {
        Cell::land().with_owner(player).with_hp(1)
    }

    /// 5x5, player 1 holds the top-left 3x3 zone with a block on (2, 2)
    /// and a lone block on (4, 0). Player 2 sits in the far corner.
    fn scenario_board() -> Board {
        let mut edits = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                edits.push((x, y, Cell::land().with_zone(1)));
            }
        }
        edits.push((0, 0, Cell::base(1, 5)));
        edits.push((2, 2, block(1).with_zone(1)));
        edits.push((4, 0, block(1)));
        edits.push((4, 4, Cell::base(2, 5)));
        board_with(5, 5, &edits)
    }

    fn started(board: Board, nb_players: i32, dice: (u32, u32), use_sum: bool) -> GameState {
        let mut state = GameState::new(board, nb_players).unwrap();
        assert!(state.roll_dice_with(dice.0, dice.1).unwrap().is_applied());
        assert!(state.commit_dice_usage(use_sum).is_applied());
        state
    }

    #[test]
    fn roll_guards() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut state = GameState::new(scenario_board(), 2).unwrap();
        assert!(state.roll_dice(&mut rng).is_applied());
        let roll = state.dice_result().unwrap();
        assert!((1..=6).contains(&roll.die1) && (1..=6).contains(&roll.die2));
        assert_eq!(state.turn_phase(), TurnPhase::DiceRolled);

        let before = state.clone();
        assert_eq!(
            state.roll_dice(&mut rng),
            Outcome::Rejected(Rejection::DiceAlreadyRolled)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn fixed_roll_rejects_bad_dice() {
        let mut state = GameState::new(scenario_board(), 2).unwrap();
        assert_eq!(state.roll_dice_with(0, 3), Err(GameError::InvalidDie(0)));
        assert_eq!(state.roll_dice_with(2, 7), Err(GameError::InvalidDie(7)));
        assert_eq!(state.dice_result(), None);
    }

    #[test]
    fn commit_needs_dice_and_only_once() {
        let mut state = GameState::new(scenario_board(), 2).unwrap();
        assert_eq!(
            state.commit_dice_usage(false),
            Outcome::Rejected(Rejection::NoDiceRolled)
        );
        state.roll_dice_with(2, 3).unwrap();
        assert!(state.commit_dice_usage(true).is_applied());
        assert_eq!(state.dice_used(), &[5]);
        assert_eq!(state.sequences_to_place(), &[Sequence::new(BlockType::Attack, 1)]);
        assert_eq!(
            state.commit_dice_usage(false),
            Outcome::Rejected(Rejection::DiceAlreadyUsed)
        );
        assert_eq!(state.turn_phase(), TurnPhase::SequencesPending);
    }

    #[test]
    fn sum_above_six_leaves_nothing_to_place() {
        let mut state = started(scenario_board(), 2, (4, 5), true);
        assert!(state.sequences_to_place().is_empty());
        assert_eq!(state.turn_phase(), TurnPhase::TurnComplete);
        assert_eq!(state.select_sequence(0), Outcome::Rejected(Rejection::NoSequences));
        assert!(state.pass_turn().is_applied());
        assert_eq!(state.current_player(), 2);
    }

    #[test]
    fn select_guards() {
        let mut state = started(scenario_board(), 2, (2, 3), false);
        assert_eq!(
            state.select_sequence(2),
            Outcome::Rejected(Rejection::SequenceOutOfRange)
        );
        assert!(state.select_sequence(1).is_applied());
        assert_eq!(state.current_block_type(), Some(BlockType::Defense));
        state.place_block(Pos::new(1, 2)).unwrap();
        assert_eq!(state.blocks_placed_in_sequence(), 1);
        assert_eq!(
            state.select_sequence(0),
            Outcome::Rejected(Rejection::SequenceInProgress)
        );
    }

    #[test]
    fn place_guards() {
        let mut state = started(scenario_board(), 2, (2, 3), false);
        assert_eq!(
            state.place_block(Pos::new(1, 0)),
            Ok(Outcome::Rejected(Rejection::NoActiveSequence))
        );
        state.select_sequence(0);
        let before = state.clone();
        assert_eq!(
            state.place_block(Pos::new(3, 3)),
            Ok(Outcome::Rejected(Rejection::NotPlayable))
        );
        assert!(matches!(
            state.place_block(Pos::new(5, 0)),
            Err(GameError::Board(_))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn end_to_end_turn() {
        let mut state = started(scenario_board(), 2, (2, 3), false);
        assert_eq!(
            state.sequences_to_place(),
            &[
                Sequence::new(BlockType::Defense, 1),
                Sequence::new(BlockType::Defense, 2)
            ]
        );

        assert!(state.select_sequence(0).is_applied());
        for pos in [Pos::new(1, 2), Pos::new(2, 1)] {
            assert!(state.is_playable(pos), "{pos} should be playable");
        }
        assert!(!state.is_playable(Pos::new(3, 2)));
        assert!(!state.is_playable(Pos::new(2, 3)));

        assert!(state.place_block(Pos::new(2, 1)).unwrap().is_applied());
        assert!(state.completed_sequences().contains(&0));
        // (4, 0) and the column-2 rows now cross over neutral ground.
        assert_eq!(state.board().cell(Pos::new(4, 1)).unwrap().territory, 1);
        assert_eq!(state.board().cell(Pos::new(4, 2)).unwrap().territory, 1);
        assert_eq!(state.board().cell(Pos::new(4, 3)).unwrap().territory, 0);
        assert_eq!(state.current_sequence_index(), Some(1));

        assert!(state.select_sequence(1).is_applied());
        assert!(state.place_block(Pos::new(1, 2)).unwrap().is_applied());
        assert_eq!(state.sequence_start_position(), Some(Pos::new(1, 2)));
        assert_eq!(state.playable_positions(), &[Pos::new(0, 2), Pos::new(1, 1)]);

        assert!(state.place_block(Pos::new(0, 2)).unwrap().is_applied());
        assert!(state.all_sequences_completed());
        assert_eq!(state.current_sequence_index(), None);
        assert!(state.playable_positions().is_empty());
        assert_eq!(state.turn_phase(), TurnPhase::TurnComplete);
        assert_eq!(state.player_cells(1).len(), 6);
    }

    #[test]
    fn direction_locks_after_second_block() {
        let edits = [
            (0, 0, Cell::base(1, 5)),
            (4, 4, Cell::base(2, 5)),
        ];
        let mut columns = board_with(5, 5, &edits).columns();
        for column in columns.iter_mut() {
            column[1] = column[1].with_zone(1);
        }
        let board = Board::from_columns(columns).unwrap();

        // 4 gives three defense blocks; the row y = 1 is player 1's zone.
        let mut state = started(board, 2, (4, 4), false);
        assert!(state.select_sequence(0).is_applied());
        assert!(state.is_playable(Pos::new(0, 1)));
        state.place_block(Pos::new(0, 1)).unwrap();
        assert_eq!(state.playable_positions(), &[Pos::new(1, 1)]);
        state.place_block(Pos::new(1, 1)).unwrap();
        assert_eq!(state.sequence_direction(), Some(Direction::RIGHT));
        assert_eq!(state.playable_positions(), &[Pos::new(2, 1)]);
        state.place_block(Pos::new(2, 1)).unwrap();
        assert_eq!(state.completed_sequences().len(), 1);
        assert_eq!(state.current_sequence_index(), Some(1));
    }

    #[test]
    fn destroy_on_zero_hp_cell_still_destroys() {
        let board = board_with(
            3,
            3,
            &[
                (0, 0, Cell::base(1, 3)),
                (2, 2, Cell::base(2, 3)),
                (1, 1, Cell::land().with_owner(2).with_hp(0)),
            ],
        );
        // 1 + 1 gives two single destroy blocks.
        let mut state = started(board, 2, (1, 1), false);
        state.select_sequence(0);
        assert_eq!(state.playable_positions(), &[Pos::new(1, 1)]);
        state.place_block(Pos::new(1, 1)).unwrap();
        let cell = state.board().cell(Pos::new(1, 1)).unwrap();
        assert!(cell.is_destroyed());
        assert_eq!(cell.hp, 0);
    }

    #[test]
    fn attack_on_base_uses_every_remaining_block() {
        let board = board_with(
            3,
            3,
            &[
                (0, 0, Cell::base(1, 3)),
                (0, 1, block(1)),
                (0, 2, Cell::base(2, 1)),
                (2, 2, Cell::base(3, 4)),
            ],
        );
        let mut state = started(board, 3, (6, 5), false);
        assert_eq!(state.sequences_to_place()[0], Sequence::new(BlockType::Attack, 2));
        state.select_sequence(0);
        assert!(state.is_playable(Pos::new(0, 2)));

        assert!(state.place_block(Pos::new(0, 2)).unwrap().is_applied());
        assert!(state.completed_sequences().contains(&0));
        assert_eq!(state.sequence_start_position(), None);
        let base = state.board().cell(Pos::new(0, 2)).unwrap();
        assert_eq!((base.owner, base.hp), (DESTROYED, 0));
        assert_eq!(state.player_base_hp(2), 0);
        assert!(state.eliminated_players().contains(&2));
        assert!(!state.is_game_over());
        assert_eq!(state.current_sequence_index(), Some(1));
    }

    #[test]
    fn rotation_skips_eliminated_players() {
        let board = board_with(
            3,
            3,
            &[
                (0, 0, Cell::base(1, 3)),
                (1, 1, Cell::base(2, 1)),
                (2, 2, Cell::base(3, 3)),
            ],
        );
        let mut state = GameState::new(board, 3).unwrap();
        state.board.get_mut(Pos::new(1, 1)).unwrap().hp = 0;

        assert!(state.pass_turn().is_applied());
        assert_eq!(state.eliminated_players().iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(state.current_player(), 3);
        assert!(state.pass_turn().is_applied());
        assert_eq!(state.current_player(), 1);
    }

    #[test]
    fn last_standing_player_wins() {
        let board = board_with(
            3,
            3,
            &[
                (0, 0, Cell::base(1, 3)),
                (0, 1, block(1)),
                (0, 2, Cell::base(2, 2)),
            ],
        );
        let mut state = started(board, 2, (6, 2), false);
        state.select_sequence(0);
        state.place_block(Pos::new(0, 2)).unwrap();

        assert!(state.is_game_over());
        assert_eq!(state.winner(), Some(1));
        assert_eq!(state.turn_phase(), TurnPhase::GameOver);
        assert_eq!(state.pass_turn(), Outcome::Rejected(Rejection::GameOver));
        assert_eq!(state.select_sequence(1), Outcome::Rejected(Rejection::GameOver));
        assert_eq!(state.current_player(), 1);
    }

    #[test]
    fn pass_turn_clears_the_turn() {
        let mut state = started(scenario_board(), 2, (2, 3), false);
        state.select_sequence(0);
        assert!(state.pass_turn().is_applied());
        assert_eq!(state.current_player(), 2);
        assert_eq!(state.dice_result(), None);
        assert!(state.dice_used().is_empty());
        assert!(state.sequences_to_place().is_empty());
        assert!(state.playable_positions().is_empty());
        assert_eq!(state.turn_phase(), TurnPhase::Idle);
    }
}
