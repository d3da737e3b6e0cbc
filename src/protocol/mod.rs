//! Text protocol: board layout notation and line command parsing.

pub mod layout;
pub mod parser;

pub use layout::{encode_layout, parse_layout, LayoutError};
pub use parser::{parse_command, Command};
