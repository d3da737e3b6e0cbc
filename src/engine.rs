//! Engine state management.
//!
//! Holds the match in progress, the engine options, and the dice RNG, and
//! answers the queries the text protocol needs.

use std::io::Write;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::debug;

use crate::board::{training_board, Board, Pos};
use crate::game::{Command, GameError, GameState, Outcome, MAX_PLAYERS, MIN_PLAYERS};
use crate::protocol::{encode_layout, parse_layout, LayoutError};

/// Engine options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Player count for the next match.
    pub nb_players: i32,
    /// Fixed RNG seed; entropy when unset.
    pub seed: Option<u64>,
    /// Pass the turn automatically once every sequence is placed.
    pub auto_pass_turn: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            nb_players: 2,
            seed: None,
            auto_pass_turn: true,
        }
    }
}

/// Errors surfaced to the protocol loop.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no game in progress")]
    NoGame,

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option {name}")]
    InvalidOption { name: String, value: String },
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    state: Option<GameState>,
    config: EngineConfig,
    rng: SmallRng,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine with no match loaded.
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            state: None,
            rng: seeded_rng(config.seed),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The match in progress.
    pub fn state(&self) -> Result<&GameState, EngineError> {
        self.state.as_ref().ok_or(EngineError::NoGame)
    }

    /// Drops the current match. A player count, if given, applies to the
    /// next board loaded.
    pub fn new_game(&mut self, players: Option<i32>) -> Result<(), EngineError> {
        if let Some(players) = players {
            check_player_count(players)?;
            self.config.nb_players = players;
        }
        self.state = None;
        self.rng = seeded_rng(self.config.seed);
        Ok(())
    }

    /// Starts a match on `board` with the configured player count.
    pub fn load_board(&mut self, board: Board) -> Result<(), EngineError> {
        let state = GameState::new(board, self.config.nb_players)?;
        debug!(
            nb_players = self.config.nb_players,
            width = state.board().width(),
            height = state.board().height(),
            "match started"
        );
        self.state = Some(state);
        Ok(())
    }

    /// Starts a match on a board in layout notation.
    pub fn load_layout(&mut self, notation: &str) -> Result<(), EngineError> {
        let board = parse_layout(notation)?;
        self.load_board(board)
    }

    /// Starts a match on the built-in training board.
    pub fn load_training(&mut self) -> Result<(), EngineError> {
        let board = training_board().map_err(GameError::from)?;
        self.load_board(board)
    }

    /// Sets an engine option by its protocol id: `Players`, `Seed` or
    /// `AutoPass`.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), EngineError> {
        let invalid = || EngineError::InvalidOption {
            name: name.to_string(),
            value: value.unwrap_or_default().to_string(),
        };
        match name {
            "Players" => {
                let players = value.and_then(|v| v.parse().ok()).ok_or_else(invalid)?;
                check_player_count(players)?;
                self.config.nb_players = players;
            }
            "Seed" => {
                self.config.seed = match value {
                    None | Some("") | Some("none") => None,
                    Some(v) => Some(v.parse().map_err(|_| invalid())?),
                };
                self.rng = seeded_rng(self.config.seed);
            }
            "AutoPass" => {
                self.config.auto_pass_turn = match value {
                    None | Some("true") => true,
                    Some("false") => false,
                    Some(_) => return Err(invalid()),
                };
            }
            other => return Err(EngineError::UnknownOption(other.to_string())),
        }
        debug!(name, ?value, "option set");
        Ok(())
    }

    /// Runs one command against the match in progress.
    ///
    /// With `auto_pass_turn` on, a placement that completes the last open
    /// sequence also passes the turn.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, EngineError> {
        let auto_pass = self.config.auto_pass_turn;
        let state = self.state.as_mut().ok_or(EngineError::NoGame)?;
        let outcome = state.apply(command, &mut self.rng)?;

        if auto_pass
            && outcome.is_applied()
            && matches!(command, Command::PlaceBlock { .. })
            && state.all_sequences_completed()
            && !state.is_game_over()
        {
            debug!(player = state.current_player(), "turn passed automatically");
            state.pass_turn();
        }
        Ok(outcome)
    }

    pub fn roll_dice(&mut self) -> Result<Outcome, EngineError> {
        self.execute(Command::RollDice)
    }

    pub fn roll_dice_with(&mut self, die1: u32, die2: u32) -> Result<Outcome, EngineError> {
        self.execute(Command::RollDiceWith { die1, die2 })
    }

    pub fn commit_dice_usage(&mut self, use_sum: bool) -> Result<Outcome, EngineError> {
        self.execute(Command::CommitDiceUsage { use_sum })
    }

    pub fn select_sequence(&mut self, index: usize) -> Result<Outcome, EngineError> {
        self.execute(Command::SelectSequence { index })
    }

    pub fn place_block(&mut self, x: usize, y: usize) -> Result<Outcome, EngineError> {
        self.execute(Command::PlaceBlock { x, y })
    }

    pub fn pass_turn(&mut self) -> Result<Outcome, EngineError> {
        self.execute(Command::PassTurn)
    }

    /// A copy of the full match state.
    pub fn snapshot(&self) -> Result<GameState, EngineError> {
        self.state().cloned()
    }

    /// The full match state as a single-line JSON document.
    pub fn snapshot_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self.state()?)?)
    }

    /// Replaces the match with one read from `snapshot_json` output.
    pub fn restore_json(&mut self, json: &str) -> Result<(), EngineError> {
        let state: GameState = serde_json::from_str(json)?;
        state.validate()?;
        self.config.nb_players = state.nb_players();
        self.state = Some(state);
        Ok(())
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Writes `layout <notation>` for the current board.
    pub fn handle_show<W: Write>(&self, out: &mut W) -> Result<(), EngineError> {
        let state = self.state()?;
        writeln!(out, "layout {}", encode_layout(state.board()))?;
        Ok(())
    }

    /// Writes `positions x,y ...`, or `positions -` when nothing is playable.
    pub fn handle_positions<W: Write>(&self, out: &mut W) -> Result<(), EngineError> {
        let state = self.state()?;
        writeln!(out, "positions {}", format_positions(state.playable_positions()))?;
        Ok(())
    }

    /// Writes a one-line summary of the turn.
    pub fn handle_status<W: Write>(&self, out: &mut W) -> Result<(), EngineError> {
        let state = self.state()?;
        writeln!(out, "{}", format_status(state))?;
        Ok(())
    }

    /// Writes `snapshot <json>`.
    pub fn handle_snapshot<W: Write>(&self, out: &mut W) -> Result<(), EngineError> {
        let json = self.snapshot_json()?;
        writeln!(out, "snapshot {json}")?;
        Ok(())
    }
}

fn check_player_count(players: i32) -> Result<(), GameError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
        Ok(())
    } else {
        Err(GameError::InvalidPlayerCount(players))
    }
}

fn join_or_dash<I: IntoIterator<Item = String>>(items: I) -> String {
    let joined = items.into_iter().collect::<Vec<_>>().join(",");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

fn format_positions(positions: &[Pos]) -> String {
    if positions.is_empty() {
        return "-".to_string();
    }
    positions
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `status player <p> phase <phase> dice <d1,d2> used <v,..> sequences
/// <type:n,..> active <i> placed <n> completed <i,..> hp <p:hp,..>
/// eliminated <p,..> winner <p>`, with `-` for empty fields.
fn format_status(state: &GameState) -> String {
    let dice = state
        .dice_result()
        .map_or_else(|| "-".to_string(), |d| format!("{},{}", d.die1, d.die2));
    let used = join_or_dash(state.dice_used().iter().map(u32::to_string));
    let sequences = join_or_dash(
        state
            .sequences_to_place()
            .iter()
            .map(|s| format!("{}:{}", s.block_type, s.nb_blocks)),
    );
    let active = state
        .current_sequence_index()
        .map_or_else(|| "-".to_string(), |i| i.to_string());
    let completed = join_or_dash(state.completed_sequences().iter().map(usize::to_string));
    let hp = join_or_dash(
        state
            .base_hp_cache()
            .iter()
            .map(|(player, hp)| format!("{player}:{hp}")),
    );
    let eliminated = join_or_dash(state.eliminated_players().iter().map(i32::to_string));
    let winner = state
        .winner()
        .map_or_else(|| "-".to_string(), |w| w.to_string());

    format!(
        "status player {} phase {} dice {} used {} sequences {} active {} placed {} completed {} hp {} eliminated {} winner {}",
        state.current_player(),
        state.turn_phase().name(),
        dice,
        used,
        sequences,
        active,
        state.blocks_placed_in_sequence(),
        completed,
        hp,
        eliminated,
        winner,
    )
}
