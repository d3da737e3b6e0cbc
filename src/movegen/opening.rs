//! First-block search.
//!
//! Before a sequence has a start position, a block may go next to any cell
//! the player controls. Destroy blocks may target any legal cell on the
//! board. Attack blocks additionally open up past rubble: straight across a
//! single destroyed cell, and around whole destroyed regions the player
//! borders.

use std::collections::{BTreeSet, HashSet};

use crate::board::{Board, Direction, Pos};
use crate::rules::{can_place_on_cell, BlockType};

use super::line_fits;

/// Returns the candidate positions for the first block of a sequence.
pub fn opening_positions(
    board: &Board,
    player: i32,
    block_type: BlockType,
    remaining: u32,
) -> Vec<Pos> {
    if block_type == BlockType::Destroy {
        return board
            .iter()
            .filter(|(_, cell)| can_place_on_cell(cell, block_type, player))
            .map(|(pos, _)| pos)
            .collect();
    }

    let mut positions = Vec::new();
    let mut checked: HashSet<Pos> = HashSet::new();

    for owned in board.owned_by(player) {
        for (_, pos) in board.neighbours(owned) {
            if !checked.insert(pos) {
                continue;
            }
            if admits(board, pos, block_type, player, remaining) {
                positions.push(pos);
            }
        }
    }

    if block_type == BlockType::Attack {
        rubble_crossings(board, player, remaining, &mut checked, &mut positions);
        region_flanks(board, player, remaining, &mut checked, &mut positions);
    }

    positions
}

/// Single-cell check plus lookahead. Enemy bases are always admitted for
/// attacks since a base hit consumes the whole sequence.
fn admits(board: &Board, pos: Pos, block_type: BlockType, player: i32, remaining: u32) -> bool {
    let cell = match board.cell(pos) {
        Some(c) => c,
        None => return false,
    };
    if !can_place_on_cell(cell, block_type, player) {
        return false;
    }
    if block_type == BlockType::Attack && cell.is_base() {
        return true;
    }
    remaining <= 1
        || Direction::CARDINAL
            .into_iter()
            .any(|dir| line_fits(board, pos, dir, block_type, player, remaining))
}

/// For each destroyed cell outside the player's territory with a player
/// block on one side, the cell on the far side becomes a target.
fn rubble_crossings(
    board: &Board,
    player: i32,
    remaining: u32,
    checked: &mut HashSet<Pos>,
    positions: &mut Vec<Pos>,
) {
    for (rubble, cell) in board.iter() {
        if !cell.is_destroyed() || cell.territory == player {
            continue;
        }

        let facing = Direction::CARDINAL.into_iter().find(|&dir| {
            board
                .step(rubble, dir)
                .and_then(|p| board.cell(p))
                .is_some_and(|c| c.is_owned_by(player))
        });
        let Some(facing) = facing else {
            continue;
        };

        let Some(target) = board.step(rubble, facing.opposite()) else {
            continue;
        };
        if !checked.insert(target) {
            continue;
        }
        let Some(target_cell) = board.cell(target) else {
            continue;
        };
        if target_cell.is_enemy_base(player)
            || (target_cell.is_free()
                && admits(board, target, BlockType::Attack, player, remaining))
        {
            positions.push(target);
        }
    }
}

/// Collects 4-connected regions of destroyed cells in scan order.
fn destroyed_regions(board: &Board) -> Vec<BTreeSet<Pos>> {
    let mut regions = Vec::new();
    let mut visited: HashSet<Pos> = HashSet::new();

    for (seed, cell) in board.iter() {
        if !cell.is_destroyed() || visited.contains(&seed) {
            continue;
        }
        let mut region = BTreeSet::new();
        let mut stack = vec![seed];
        while let Some(pos) = stack.pop() {
            if !visited.insert(pos) {
                continue;
            }
            region.insert(pos);
            for (_, next) in board.neighbours(pos) {
                let destroyed = board.cell(next).is_some_and(|c| c.is_destroyed());
                if destroyed && !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }
        regions.push(region);
    }

    regions
}

/// For each destroyed region bordering the player, free cells touching the
/// region on the sides opposite the player become targets.
fn region_flanks(
    board: &Board,
    player: i32,
    remaining: u32,
    checked: &mut HashSet<Pos>,
    positions: &mut Vec<Pos>,
) {
    for region in destroyed_regions(board) {
        let mut facing: Vec<Direction> = Vec::new();
        for &pos in &region {
            for (dir, next) in board.neighbours(pos) {
                let owned = board.cell(next).is_some_and(|c| c.is_owned_by(player));
                if owned && !facing.contains(&dir) {
                    facing.push(dir);
                }
            }
        }
        if facing.is_empty() {
            continue;
        }
        let away: Vec<Direction> = facing.iter().map(|d| d.opposite()).collect();

        let mut flanks: Vec<Pos> = Vec::new();
        for &pos in &region {
            for (dir, next) in board.neighbours(pos) {
                if !away.contains(&dir) || region.contains(&next) || flanks.contains(&next) {
                    continue;
                }
                if board.cell(next).is_some_and(|c| c.is_free()) {
                    flanks.push(next);
                }
            }
        }

        for pos in flanks {
            if !checked.insert(pos) {
                continue;
            }
            if admits(board, pos, BlockType::Attack, player, remaining) {
                positions.push(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, DESTROYED};

    fn board_with(size: usize, base: Cell, edits: &[(usize, usize, Cell)]) -> Board {
        let mut columns = vec![vec![base; size]; size];
        for &(x, y, cell) in edits {
            columns[x][y] = cell;
        }
        Board::from_columns(columns).unwrap()
    }

    #[test]
    fn defense_targets_free_neighbours_in_zone() {
        let zone = Cell::land().with_zone(1);
        let board = board_with(5, zone, &[(2, 2, zone.with_owner(1))]);
        let positions = opening_positions(&board, 1, BlockType::Defense, 1);
        assert_eq!(
            positions,
            vec![Pos::new(1, 2), Pos::new(3, 2), Pos::new(2, 1), Pos::new(2, 3)]
        );
    }

    #[test]
    fn neighbours_are_deduplicated() {
        let zone = Cell::land().with_zone(1);
        let board = board_with(
            3,
            zone,
            &[(0, 0, zone.with_owner(1)), (1, 1, zone.with_owner(1))],
        );
        let positions = opening_positions(&board, 1, BlockType::Defense, 1);
        let unique: HashSet<Pos> = positions.iter().copied().collect();
        assert_eq!(unique.len(), positions.len());
        // (1,0) and (0,1) touch both owned cells.
        assert!(positions.contains(&Pos::new(1, 0)));
        assert!(positions.contains(&Pos::new(0, 1)));
    }

    #[test]
    fn lookahead_filters_cramped_starts() {
        // Player 1 may only defend in column 0.
        let plain = Cell::land();
        let zone = Cell::land().with_zone(1);
        let board = board_with(
            3,
            plain,
            &[(0, 0, zone.with_owner(1)), (0, 1, zone), (0, 2, zone)],
        );
        // (0,1) fits 2 blocks ((0,1),(0,2)) but not 3.
        assert_eq!(
            opening_positions(&board, 1, BlockType::Defense, 2),
            vec![Pos::new(0, 1)]
        );
        assert!(opening_positions(&board, 1, BlockType::Defense, 3).is_empty());
    }

    #[test]
    fn destroy_scans_whole_board() {
        let board = board_with(
            4,
            Cell::land(),
            &[
                (0, 0, Cell::land().with_owner(1)),
                (3, 3, Cell::land().with_owner(2)),
                (3, 0, Cell::base(2, 5)),
                (1, 3, Cell::land().with_owner(2).with_territory(1)),
            ],
        );
        assert_eq!(
            opening_positions(&board, 1, BlockType::Destroy, 1),
            vec![Pos::new(3, 3)]
        );
    }

    #[test]
    fn attack_crosses_single_rubble_to_base() {
        let rubble = Cell::land().with_owner(DESTROYED);
        let board = board_with(
            5,
            Cell::land().with_zone(1),
            &[
                (0, 2, Cell::land().with_owner(1)),
                (1, 2, rubble),
                (2, 2, Cell::base(2, 10)),
            ],
        );
        let positions = opening_positions(&board, 1, BlockType::Attack, 2);
        assert!(positions.contains(&Pos::new(2, 2)));
    }

    #[test]
    fn attack_flanks_destroyed_region() {
        // Player block at (0,2) borders a horizontal rubble strip (1..=2, 2).
        // The free cell past the strip, (3,2), is opened; cells beside the
        // strip (above/below) are not.
        let rubble = Cell::land().with_owner(DESTROYED);
        let board = board_with(
            5,
            Cell::land().with_zone(2),
            &[
                (0, 2, Cell::land().with_owner(1)),
                (1, 2, rubble),
                (2, 2, rubble),
            ],
        );
        let positions = opening_positions(&board, 1, BlockType::Attack, 1);
        assert!(positions.contains(&Pos::new(3, 2)));
        assert!(!positions.contains(&Pos::new(1, 1)));
        assert!(!positions.contains(&Pos::new(2, 3)));
        // Plain neighbours of the owned cell remain available.
        assert!(positions.contains(&Pos::new(0, 1)));
    }

    #[test]
    fn attack_never_targets_rubble_or_own_zone() {
        let rubble = Cell::land().with_owner(DESTROYED);
        let board = board_with(
            3,
            Cell::land().with_zone(1),
            &[(1, 1, Cell::land().with_owner(1)), (1, 0, rubble)],
        );
        assert!(opening_positions(&board, 1, BlockType::Attack, 1).is_empty());
    }

    #[test]
    fn output_is_stable() {
        let rubble = Cell::land().with_owner(DESTROYED);
        let board = board_with(
            6,
            Cell::land(),
            &[
                (2, 2, Cell::land().with_owner(1)),
                (3, 2, rubble),
                (2, 3, rubble),
                (4, 4, Cell::land().with_owner(1)),
            ],
        );
        let first = opening_positions(&board, 1, BlockType::Attack, 1);
        for _ in 0..5 {
            assert_eq!(opening_positions(&board, 1, BlockType::Attack, 1), first);
        }
    }
}
