//! Board layout notation.
//!
//! A layout is a single line describing every cell of a board. Rows are
//! separated by `/`, top row (y = 0) first, and cells within a row by `,`.
//!
//! Each cell is `<kind><owner>.<territory>.<zone>.<hp>`, where kind is `L`
//! (land) or `B` (base) and owner may be `-1` for rubble. A lone `.` is
//! shorthand for free neutral land, `L0.0.0.0`.
//!
//! Example, a 3x2 board with one base per player:
//! `B1.1.1.5,.,./.,.,B2.2.2.5`

use crate::board::{Board, BoardError, Cell, CellKind, Pos};

/// Errors that can occur during layout parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("empty layout")]
    Empty,

    #[error("invalid cell kind '{kind}' at row {row}, column {column}")]
    InvalidKind { row: usize, column: usize, kind: char },

    #[error("invalid cell entry '{entry}' at row {row}, column {column}")]
    InvalidCell {
        row: usize,
        column: usize,
        entry: String,
    },

    #[error(transparent)]
    Board(#[from] BoardError),
}

const FREE_LAND: &str = ".";

/// Parses a single cell entry.
fn parse_cell(entry: &str, row: usize, column: usize) -> Result<Cell, LayoutError> {
    if entry == FREE_LAND {
        return Ok(Cell::land());
    }
    let invalid = || LayoutError::InvalidCell {
        row,
        column,
        entry: entry.to_string(),
    };

    let mut chars = entry.chars();
    let kind_char = chars.next().ok_or_else(invalid)?;
    let kind = CellKind::from_layout_char(kind_char).ok_or(LayoutError::InvalidKind {
        row,
        column,
        kind: kind_char,
    })?;

    let fields: Vec<i32> = chars
        .as_str()
        .split('.')
        .map(str::parse::<i32>)
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;
    let [owner, territory, zone, hp] = fields[..] else {
        return Err(invalid());
    };

    Ok(Cell {
        kind,
        owner,
        territory,
        zone,
        hp,
    })
}

/// Parses a layout string into a validated board.
pub fn parse_layout(s: &str) -> Result<Board, LayoutError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(LayoutError::Empty);
    }

    let rows = s
        .split('/')
        .enumerate()
        .map(|(y, row)| {
            row.split(',')
                .enumerate()
                .map(|(x, entry)| parse_cell(entry.trim(), y, x))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Board::from_rows(rows)?)
}

fn encode_cell(cell: &Cell) -> String {
    if *cell == Cell::land() {
        return FREE_LAND.to_string();
    }
    format!(
        "{}{}.{}.{}.{}",
        cell.kind.layout_char(),
        cell.owner,
        cell.territory,
        cell.zone,
        cell.hp
    )
}

/// Encodes a board into layout notation. `parse_layout` reads it back to
/// the same board.
pub fn encode_layout(board: &Board) -> String {
    (0..board.height())
        .map(|y| {
            (0..board.width())
                .filter_map(|x| board.cell(Pos::new(x, y)))
                .map(encode_cell)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("/")
}
