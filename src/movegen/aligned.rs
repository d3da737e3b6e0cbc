//! Second-block search.
//!
//! Once the first block of a multi-block sequence is down, the second must
//! sit directly beside it. That choice fixes the line the rest of the
//! sequence follows, so each neighbour is only offered if the line can be
//! finished from it.

use crate::board::{Board, Direction, Pos};
use crate::rules::{can_place_on_cell, jump_target, BlockType};

use super::line_fits;

/// Returns the aligned neighbours of `start` that can take the next block.
pub fn aligned_positions(
    board: &Board,
    start: Pos,
    block_type: BlockType,
    player: i32,
    remaining: u32,
) -> Vec<Pos> {
    let mut positions: Vec<Pos> = Vec::new();

    for dir in Direction::CARDINAL {
        let Some(pos) = board.step(start, dir) else {
            continue;
        };
        let Some(cell) = board.cell(pos) else {
            continue;
        };

        if block_type == BlockType::Attack && remaining >= 1 {
            if let Some(base) = jump_target(board, pos, dir, player) {
                if !positions.contains(&base) {
                    positions.push(base);
                }
                continue;
            }
        }

        if !can_place_on_cell(cell, block_type, player) {
            continue;
        }

        let base_hit = block_type == BlockType::Attack && cell.is_base();
        if base_hit || remaining <= 1 || line_fits(board, pos, dir, block_type, player, remaining) {
            positions.push(pos);
        }
    }

    positions
}
