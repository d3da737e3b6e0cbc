//! Direction-locked search.
//!
//! From the third block on, the sequence continues straight along the
//! direction set by its first two blocks. There is at most one target.

use crate::board::{Board, Direction, Pos};
use crate::rules::{can_place_on_cell, jump_target, BlockType};

use super::line_fits;

/// Returns the single next cell along `dir` from `last`, if it can take the
/// next block and the rest of the sequence still fits behind it.
pub fn next_position(
    board: &Board,
    last: Pos,
    dir: Direction,
    block_type: BlockType,
    player: i32,
    remaining: u32,
) -> Option<Pos> {
    let next = board.step(last, dir)?;
    let cell = board.cell(next)?;

    if block_type == BlockType::Attack && remaining == 1 {
        if let Some(base) = jump_target(board, next, dir, player) {
            return Some(base);
        }
    }

    if !can_place_on_cell(cell, block_type, player) {
        return None;
    }
    if remaining <= 1 || line_fits(board, next, dir, block_type, player, remaining) {
        return Some(next);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, DESTROYED};

    fn row(cells: Vec<Cell>) -> Board {
        Board::from_columns(cells.into_iter().map(|c| vec![c]).collect()).unwrap()
    }

    #[test]
    fn continues_straight() {
        let zone = Cell::land().with_zone(1);
        let board = row(vec![zone.with_owner(1), zone.with_owner(1), zone, zone]);
        assert_eq!(
            next_position(&board, Pos::new(1, 0), Direction::RIGHT, BlockType::Defense, 1, 2),
            Some(Pos::new(2, 0))
        );
        assert_eq!(
            next_position(&board, Pos::new(1, 0), Direction::RIGHT, BlockType::Defense, 1, 3),
            None
        );
    }

    #[test]
    fn blocked_line_is_empty() {
        let zone = Cell::land().with_zone(1);
        let board = row(vec![zone.with_owner(1), zone.with_owner(1), zone.with_owner(2)]);
        assert_eq!(
            next_position(&board, Pos::new(1, 0), Direction::RIGHT, BlockType::Defense, 1, 1),
            None
        );
        assert_eq!(
            next_position(&board, Pos::new(0, 0), Direction::LEFT, BlockType::Defense, 1, 1),
            None
        );
    }

    #[test]
    fn last_attack_block_jumps_to_base() {
        let board = row(vec![
            Cell::land().with_owner(1),
            Cell::land().with_owner(1),
            Cell::land().with_owner(DESTROYED),
            Cell::base(2, 3),
        ]);
        assert_eq!(
            next_position(&board, Pos::new(1, 0), Direction::RIGHT, BlockType::Attack, 1, 1),
            Some(Pos::new(3, 0))
        );
        // Defense never jumps.
        assert_eq!(
            next_position(&board, Pos::new(1, 0), Direction::RIGHT, BlockType::Defense, 2, 1),
            None
        );
    }
}
