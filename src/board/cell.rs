//! Cell records and their ownership encoding.
//!
//! Ownership, territory, and zone are plain player numbers where `0` means
//! nobody. `owner` additionally uses `-1` for a destroyed cell.

use serde::{Deserialize, Serialize};

/// Player number marking a free cell.
pub const FREE: i32 = 0;

/// Owner value marking a destroyed cell (rubble).
pub const DESTROYED: i32 = -1;

/// Player number marking neutral territory or zone.
pub const NEUTRAL: i32 = 0;

/// The terrain kind of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Land,
    Base,
}

impl CellKind {
    /// Returns the single-character layout abbreviation.
    pub const fn layout_char(self) -> char {
        match self {
            CellKind::Land => 'L',
            CellKind::Base => 'B',
        }
    }

    /// Parses a cell kind from its single-character layout abbreviation.
    pub fn from_layout_char(c: char) -> Option<CellKind> {
        match c {
            'L' => Some(CellKind::Land),
            'B' => Some(CellKind::Base),
            _ => None,
        }
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    /// 0 = free, -1 = destroyed, >0 = controlling player.
    pub owner: i32,
    /// 0 = neutral, >0 = player whose territory includes this cell.
    pub territory: i32,
    /// 0 = neutral, >0 = player the zone is dedicated to. Never captured.
    pub zone: i32,
    pub hp: i32,
}

impl Cell {
    /// A free, neutral land cell.
    pub const fn land() -> Self {
        Cell {
            kind: CellKind::Land,
            owner: FREE,
            territory: NEUTRAL,
            zone: NEUTRAL,
            hp: 0,
        }
    }

    /// A base founded by `player` with the given hit points, inside its own
    /// territory and zone.
    pub const fn base(player: i32, hp: i32) -> Self {
        Cell {
            kind: CellKind::Base,
            owner: player,
            territory: player,
            zone: player,
            hp,
        }
    }

    pub const fn with_owner(mut self, owner: i32) -> Self {
        self.owner = owner;
        self
    }

    pub const fn with_territory(mut self, territory: i32) -> Self {
        self.territory = territory;
        self
    }

    pub const fn with_zone(mut self, zone: i32) -> Self {
        self.zone = zone;
        self
    }

    pub const fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self
    }

    pub const fn is_base(&self) -> bool {
        matches!(self.kind, CellKind::Base)
    }

    pub const fn is_free(&self) -> bool {
        self.owner == FREE
    }

    pub const fn is_destroyed(&self) -> bool {
        self.owner == DESTROYED
    }

    /// Returns true if the cell is controlled by `player` (a real player).
    pub const fn is_owned_by(&self, player: i32) -> bool {
        player > 0 && self.owner == player
    }

    /// Returns true for a base held by some player other than `player`.
    pub const fn is_enemy_base(&self, player: i32) -> bool {
        self.is_base() && self.owner > 0 && self.owner != player
    }

    /// Returns true when neither territory nor zone has been assigned.
    pub const fn is_neutral_ground(&self) -> bool {
        self.territory == NEUTRAL && self.zone == NEUTRAL
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::land()
    }
}
