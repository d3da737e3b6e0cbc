//! End-of-sequence and end-of-turn resolution.
//!
//! Territory capture after a completed sequence, and base-hp bookkeeping
//! for elimination and the winner.

pub mod capture;
pub mod elimination;

pub use capture::{apply_territory_capture, territory_capture};
pub use elimination::{alive_players, base_hp_for_player, compute_base_hp_cache, Standing};
