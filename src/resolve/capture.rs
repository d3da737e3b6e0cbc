//! Territory capture.
//!
//! A neutral cell becomes a player's territory once that player has a block
//! somewhere in its column and somewhere in its row. Captured territory is
//! permanent and zones are never captured.

use tracing::info;

use crate::board::{Board, Pos};

/// Returns the neutral cells `player` captures on the current board, in
/// scan order.
pub fn territory_capture(board: &Board, player: i32) -> Vec<Pos> {
    let mut in_column = vec![false; board.width()];
    let mut in_row = vec![false; board.height()];

    for (pos, cell) in board.iter() {
        if cell.is_owned_by(player) {
            in_column[pos.x] = true;
            in_row[pos.y] = true;
        }
    }

    board
        .iter()
        .filter(|(pos, cell)| cell.is_neutral_ground() && in_column[pos.x] && in_row[pos.y])
        .map(|(pos, _)| pos)
        .collect()
}

/// Captures territory for `player` in place. Returns the number of cells
/// converted.
pub fn apply_territory_capture(board: &mut Board, player: i32) -> usize {
    let captured = territory_capture(board, player);
    for &pos in &captured {
        if let Ok(cell) = board.get_mut(pos) {
            cell.territory = player;
        }
    }
    if !captured.is_empty() {
        info!(player, cells = captured.len(), "territory captured");
    }
    captured.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn board_with(edits: &[(usize, usize, Cell)]) -> Board {
        let mut columns = vec![vec![Cell::land(); 3]; 3];
        for &(x, y, cell) in edits {
            columns[x][y] = cell;
        }
        Board::from_columns(columns).unwrap()
    }

    #[test]
    fn crossfire_converts_intersections() {
        let mut board = board_with(&[
            (0, 2, Cell::land().with_owner(1)),
            (2, 0, Cell::land().with_owner(1)),
        ]);
        let captured = apply_territory_capture(&mut board, 1);

        // Columns 0 and 2 and rows 0 and 2 are touched.
        assert_eq!(captured, 4);
        assert_eq!(board.get(Pos::new(2, 2)).unwrap().territory, 1);
        assert_eq!(board.get(Pos::new(0, 0)).unwrap().territory, 1);
        assert_eq!(board.get(Pos::new(1, 1)).unwrap().territory, 0);
    }

    #[test]
    fn zones_and_claimed_territory_are_kept() {
        let mut board = board_with(&[
            (0, 2, Cell::land().with_owner(1)),
            (2, 0, Cell::land().with_owner(1)),
            (2, 2, Cell::land().with_zone(2)),
            (0, 0, Cell::land().with_territory(3)),
        ]);
        apply_territory_capture(&mut board, 1);

        let zoned = board.get(Pos::new(2, 2)).unwrap();
        assert_eq!((zoned.territory, zoned.zone), (0, 2));
        assert_eq!(board.get(Pos::new(0, 0)).unwrap().territory, 3);
    }

    #[test]
    fn other_players_blocks_do_not_count() {
        let board = board_with(&[(1, 1, Cell::land().with_owner(2))]);
        assert!(territory_capture(&board, 1).is_empty());
        assert_eq!(territory_capture(&board, 2), vec![Pos::new(1, 1)]);
    }

    #[test]
    fn capture_is_idempotent() {
        let mut board = board_with(&[(1, 1, Cell::land().with_owner(1))]);
        assert_eq!(apply_territory_capture(&mut board, 1), 1);
        assert_eq!(apply_territory_capture(&mut board, 1), 0);
    }
}
