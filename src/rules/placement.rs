//! Single-cell placement legality.
//!
//! Everything here is a pure function of its inputs. Path feasibility over
//! several cells lives in `movegen`.

use crate::board::{Board, Cell, Direction, Pos, FREE};

use super::blocks::BlockType;

/// Returns whether `player` may place a block of `block_type` on `cell`.
pub fn can_place_on_cell(cell: &Cell, block_type: BlockType, player: i32) -> bool {
    match block_type {
        BlockType::Defense => valid_for_defense(cell, player),
        BlockType::Attack => valid_for_attack(cell, player),
        BlockType::Destroy => valid_for_destroy(cell, player),
    }
}

/// Free cell inside the player's territory or zone.
fn valid_for_defense(cell: &Cell, player: i32) -> bool {
    cell.owner == FREE && (cell.territory == player || cell.zone == player)
}

/// Enemy base, or a free cell outside the player's own zone. Rubble never
/// takes an attack block.
fn valid_for_attack(cell: &Cell, player: i32) -> bool {
    if cell.is_base() {
        return cell.owner > 0 && cell.owner != player;
    }
    if cell.is_destroyed() {
        return false;
    }
    cell.owner == FREE && cell.zone != player
}

/// Enemy land block outside the player's territory. Bases are immune.
fn valid_for_destroy(cell: &Cell, player: i32) -> bool {
    cell.owner > 0 && cell.owner != player && cell.territory != player && !cell.is_base()
}

/// Returns true if the cell at `pos` is a base held by an opponent of `player`.
pub fn is_enemy_base(board: &Board, pos: Pos, player: i32) -> bool {
    board.cell(pos).is_some_and(|c| c.is_enemy_base(player))
}

/// Applies the jump-over rule at `rubble`: if it is destroyed and the next
/// cell along `dir` is an enemy base, returns that base position.
pub fn jump_target(board: &Board, rubble: Pos, dir: Direction, player: i32) -> Option<Pos> {
    if !board.cell(rubble)?.is_destroyed() {
        return None;
    }
    let beyond = board.step(rubble, dir)?;
    is_enemy_base(board, beyond, player).then_some(beyond)
}
