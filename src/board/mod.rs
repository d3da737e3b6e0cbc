//! Board representation.
//!
//! Contains the cell record, the fixed-size grid with its coordinate
//! helpers, and the built-in training layout.

pub mod cell;
pub mod grid;
pub mod training;

pub use cell::{Cell, CellKind, DESTROYED, FREE, NEUTRAL};
pub use grid::{Board, BoardError, Direction, Pos};
pub use training::training_board;
