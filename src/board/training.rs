//! Built-in two-player training layout.
//!
//! A 10x10 map with player 1's base in the top-left corner and player 2's
//! base in the bottom-right corner. Each base sits in a 5x5 quadrant that is
//! both its zone and its starting territory; the other two quadrants are
//! neutral ground. A handful of blocks and rubble are pre-placed.

use super::cell::{Cell, DESTROYED};
use super::grid::{Board, BoardError, Pos};

/// Side length of the training map.
pub const TRAINING_SIZE: usize = 10;

/// Hit points of each training base.
pub const TRAINING_BASE_HP: i32 = 10;

/// Pre-placed cells as `(x, y, owner, hp)`.
const PRESET_CELLS: [(usize, usize, i32, i32); 15] = [
    (0, 7, 1, 0),
    (1, 7, DESTROYED, 0),
    (2, 4, 1, 0),
    (2, 5, DESTROYED, 0),
    (2, 6, DESTROYED, 0),
    (2, 7, DESTROYED, 0),
    (3, 5, DESTROYED, 0),
    (4, 1, 1, 0),
    (5, 1, DESTROYED, 0),
    (5, 6, DESTROYED, 0),
    (7, 6, DESTROYED, 0),
    (7, 7, DESTROYED, 0),
    (8, 8, DESTROYED, 1),
    (9, 6, 1, 0),
    (9, 8, DESTROYED, 1),
];

/// Returns the quadrant affinity of a training-map cell.
fn quadrant_player(pos: Pos) -> i32 {
    let half = TRAINING_SIZE / 2;
    match (pos.x < half, pos.y < half) {
        (true, true) => 1,
        (false, false) => 2,
        _ => 0,
    }
}

/// Builds the training board.
pub fn training_board() -> Result<Board, BoardError> {
    let mut columns = vec![vec![Cell::land(); TRAINING_SIZE]; TRAINING_SIZE];
    for (x, column) in columns.iter_mut().enumerate() {
        for (y, cell) in column.iter_mut().enumerate() {
            let player = quadrant_player(Pos::new(x, y));
            *cell = cell.with_territory(player).with_zone(player);
        }
    }

    for (x, y, owner, hp) in PRESET_CELLS {
        let cell = &mut columns[x][y];
        *cell = cell.with_owner(owner).with_hp(hp);
    }

    columns[0][0] = Cell::base(1, TRAINING_BASE_HP);
    let last = TRAINING_SIZE - 1;
    columns[last][last] = Cell::base(2, TRAINING_BASE_HP);

    Board::from_columns(columns)
}
