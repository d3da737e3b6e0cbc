//! Playable-position generation.
//!
//! Computes the legal targets for the next block of the active sequence.
//! Which search runs depends on how far the sequence has progressed:
//! the opening search before the first block, the aligned search for the
//! second, and the directional search once the line direction is fixed.

pub mod aligned;
pub mod direction;
pub mod opening;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Direction, Pos};
use crate::rules::{can_place_on_cell, jump_target, BlockType};

/// How far the active sequence has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub block_type: BlockType,
    pub nb_blocks: u32,
    pub placed: u32,
    pub start: Option<Pos>,
    pub direction: Option<Direction>,
}

impl Progress {
    /// A sequence with nothing placed yet.
    pub const fn fresh(block_type: BlockType, nb_blocks: u32) -> Self {
        Progress {
            block_type,
            nb_blocks,
            placed: 0,
            start: None,
            direction: None,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.nb_blocks.saturating_sub(self.placed)
    }
}

/// Returns the legal targets for the next block, in a stable order.
pub fn playable_positions(board: &Board, player: i32, progress: &Progress) -> Vec<Pos> {
    let remaining = progress.remaining();
    match (progress.start, progress.direction) {
        (Some(start), Some(dir)) if progress.placed > 0 => {
            let last = board.offset(start, dir, (progress.placed - 1) as usize);
            last.and_then(|last| {
                direction::next_position(board, last, dir, progress.block_type, player, remaining)
            })
            .into_iter()
            .collect()
        }
        (Some(start), _) => {
            aligned::aligned_positions(board, start, progress.block_type, player, remaining)
        }
        _ => opening::opening_positions(board, player, progress.block_type, remaining),
    }
}

/// Returns whether the `remaining - 1` cells beyond `from` along `dir` can
/// all take a block. For attacks, the last of those cells may instead be
/// rubble with an enemy base right behind it.
pub(crate) fn line_fits(
    board: &Board,
    from: Pos,
    dir: Direction,
    block_type: BlockType,
    player: i32,
    remaining: u32,
) -> bool {
    for i in 1..remaining {
        let pos = match board.offset(from, dir, i as usize) {
            Some(p) => p,
            None => return false,
        };
        let cell = match board.cell(pos) {
            Some(c) => c,
            None => return false,
        };

        if cell.is_destroyed() && block_type == BlockType::Attack && i == remaining - 1 {
            return jump_target(board, pos, dir, player).is_some();
        }

        if !can_place_on_cell(cell, block_type, player) {
            return false;
        }
    }
    true
}

/// Picks one playable position uniformly at random.
pub fn random_placement(positions: &[Pos], rng: &mut impl Rng) -> Option<Pos> {
    if positions.is_empty() {
        return None;
    }
    Some(positions[rng.gen_range(0..positions.len())])
}
