//! Rectangular board storage.
//!
//! Cells are stored column-major (`x` outer, `y` inner), which is also the
//! canonical scan order every search uses. The board never changes size once
//! built.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, DESTROYED};

/// Errors raised when building or addressing a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board has no cells")]
    Empty,

    #[error("column {column} has {actual} cells, expected {expected}")]
    RaggedColumn {
        column: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("board of {width}x{height} holds {actual} cells")]
    CellCount {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("base at ({x}, {y}) must have a founding player and positive hp")]
    InvalidBase { x: usize, y: usize },

    #[error("cell at ({x}, {y}) has an invalid value: {reason}")]
    InvalidCell {
        x: usize,
        y: usize,
        reason: &'static str,
    },

    #[error("position ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit step along the grid. Each axis is in {-1, 0, 1}; never both zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const LEFT: Direction = Direction { dx: -1, dy: 0 };
    pub const RIGHT: Direction = Direction { dx: 1, dy: 0 };
    pub const UP: Direction = Direction { dx: 0, dy: -1 };
    pub const DOWN: Direction = Direction { dx: 0, dy: 1 };

    /// The four aligned neighbours, in search order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::LEFT,
        Direction::RIGHT,
        Direction::UP,
        Direction::DOWN,
    ];

    /// Normalizes the delta between two positions to a unit step by taking
    /// the sign of each axis independently. Returns None for `from == to`.
    pub fn between(from: Pos, to: Pos) -> Option<Direction> {
        let dx = (to.x as i64 - from.x as i64).signum() as i32;
        let dy = (to.y as i64 - from.y as i64).signum() as i32;
        if dx == 0 && dy == 0 {
            return None;
        }
        Some(Direction { dx, dy })
    }

    pub const fn opposite(self) -> Direction {
        Direction {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

/// A fixed-size grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from columns indexed `[x][y]`, validating every cell.
    pub fn from_columns(columns: Vec<Vec<Cell>>) -> Result<Board, BoardError> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(BoardError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (x, column) in columns.into_iter().enumerate() {
            if column.len() != height {
                return Err(BoardError::RaggedColumn {
                    column: x,
                    expected: height,
                    actual: column.len(),
                });
            }
            for (y, cell) in column.into_iter().enumerate() {
                validate_cell(&cell, x, y)?;
                cells.push(cell);
            }
        }

        Ok(Board {
            width,
            height,
            cells,
        })
    }

    /// Builds a board from rows indexed `[y][x]`.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Board, BoardError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(BoardError::Empty);
        }
        let mut columns = vec![Vec::with_capacity(height); width];
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(BoardError::RaggedRow {
                    row: y,
                    expected: width,
                    actual: row.len(),
                });
            }
            for (x, cell) in row.into_iter().enumerate() {
                columns[x].push(cell);
            }
        }
        Board::from_columns(columns)
    }

    /// A board with every cell set to `cell`.
    pub fn filled(width: usize, height: usize, cell: Cell) -> Result<Board, BoardError> {
        Board::from_columns(vec![vec![cell; height]; width])
    }

    /// Re-checks the shape and every cell. Boards built through the
    /// constructors always pass; deserialized ones may not.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.width == 0 || self.height == 0 {
            return Err(BoardError::Empty);
        }
        if self.cells.len() != self.width * self.height {
            return Err(BoardError::CellCount {
                width: self.width,
                height: self.height,
                actual: self.cells.len(),
            });
        }
        for (pos, cell) in self.iter() {
            validate_cell(cell, pos.x, pos.y)?;
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Pos) -> usize {
        pos.x * self.height + pos.y
    }

    fn out_of_bounds(&self, pos: Pos) -> BoardError {
        BoardError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns the cell at `pos`, or None off the board.
    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        if self.contains(pos) {
            Some(&self.cells[self.index(pos)])
        } else {
            None
        }
    }

    /// Returns the cell at `pos`, failing off the board.
    pub fn get(&self, pos: Pos) -> Result<&Cell, BoardError> {
        self.cell(pos).ok_or_else(|| self.out_of_bounds(pos))
    }

    pub fn get_mut(&mut self, pos: Pos) -> Result<&mut Cell, BoardError> {
        if !self.contains(pos) {
            return Err(self.out_of_bounds(pos));
        }
        let idx = self.index(pos);
        Ok(&mut self.cells[idx])
    }

    /// Moves one step from `pos`. Returns None when the step leaves the board.
    pub fn step(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        self.offset(pos, dir, 1)
    }

    /// Moves `n` steps from `pos`. Returns None when the target leaves the board.
    pub fn offset(&self, pos: Pos, dir: Direction, n: usize) -> Option<Pos> {
        let n = n as i64;
        let x = pos.x as i64 + dir.dx as i64 * n;
        let y = pos.y as i64 + dir.dy as i64 * n;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(Pos::new(x as usize, y as usize))
    }

    /// In-bounds four-neighbourhood of `pos`, in `Direction::CARDINAL` order.
    pub fn neighbours(&self, pos: Pos) -> impl Iterator<Item = (Direction, Pos)> + '_ {
        Direction::CARDINAL
            .into_iter()
            .filter_map(move |dir| self.step(pos, dir).map(|p| (dir, p)))
    }

    /// All positions in canonical scan order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| Pos::new(x, y)))
    }

    /// All cells with their positions, in canonical scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Cell)> {
        self.positions().zip(self.cells.iter())
    }

    /// Positions of every cell controlled by `player`.
    pub fn owned_by(&self, player: i32) -> Vec<Pos> {
        self.iter()
            .filter(|(_, cell)| cell.is_owned_by(player))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Returns the board as columns indexed `[x][y]`.
    pub fn columns(&self) -> Vec<Vec<Cell>> {
        self.cells
            .chunks(self.height)
            .map(<[Cell]>::to_vec)
            .collect()
    }
}

fn validate_cell(cell: &Cell, x: usize, y: usize) -> Result<(), BoardError> {
    if cell.owner < DESTROYED {
        return Err(BoardError::InvalidCell {
            x,
            y,
            reason: "owner below -1",
        });
    }
    if cell.territory < 0 || cell.zone < 0 {
        return Err(BoardError::InvalidCell {
            x,
            y,
            reason: "negative territory or zone",
        });
    }
    if cell.hp < 0 {
        return Err(BoardError::InvalidCell {
            x,
            y,
            reason: "negative hp",
        });
    }
    // A base is either held with hp left or already destroyed.
    if cell.is_base() && !cell.is_destroyed() && (cell.owner <= 0 || cell.hp <= 0) {
        return Err(BoardError::InvalidBase { x, y });
    }
    Ok(())
}
