//! Base hit points, elimination, and the winner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::Board;

/// Sum of hp over every base cell `player` still holds, saturating at
/// `i32::MAX`.
pub fn base_hp_for_player(board: &Board, player: i32) -> i32 {
    board
        .iter()
        .filter(|(_, cell)| cell.is_base() && cell.is_owned_by(player))
        .fold(0i32, |total, (_, cell)| total.saturating_add(cell.hp))
}

/// Base hp for every player `1..=nb_players`, recomputed from scratch.
pub fn compute_base_hp_cache(board: &Board, nb_players: i32) -> BTreeMap<i32, i32> {
    (1..=nb_players)
        .map(|player| (player, base_hp_for_player(board, player)))
        .collect()
}

/// Players whose bases still have hp, in player order.
pub fn alive_players(cache: &BTreeMap<i32, i32>) -> Vec<i32> {
    cache
        .iter()
        .filter(|(_, &hp)| hp > 0)
        .map(|(&player, _)| player)
        .collect()
}

/// Who is still in the match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Standing {
    pub alive: Vec<i32>,
    pub eliminated: Vec<i32>,
    pub winner: Option<i32>,
    pub is_game_over: bool,
}

impl Standing {
    /// Partitions players by base hp. The match is over once at most one
    /// player is alive; the winner is that player, if any.
    pub fn from_cache(cache: &BTreeMap<i32, i32>) -> Standing {
        let mut alive = Vec::new();
        let mut eliminated = Vec::new();
        for (&player, &hp) in cache {
            if hp > 0 {
                alive.push(player);
            } else {
                eliminated.push(player);
            }
        }
        let winner = match alive.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        Standing {
            is_game_over: alive.len() <= 1,
            alive,
            eliminated,
            winner,
        }
    }
}
