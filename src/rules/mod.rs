//! Game rules that need no turn state.
//!
//! Dice-to-sequence derivation and the per-cell placement checks.

pub mod blocks;
pub mod placement;

pub use blocks::{derive_sequences, dice_value_to_blocks, explode_sequences, BlockType, Sequence};
pub use placement::{can_place_on_cell, is_enemy_base, jump_target};
