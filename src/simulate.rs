//! Random-legal-play match simulation.
//!
//! Drives full matches through the engine with uniformly random legal
//! choices. Useful for exercising the rules on many positions and for
//! benchmarking; it is not an opponent strategy.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::board::{training_board, Board};
use crate::engine::{Engine, EngineConfig, EngineError};
use crate::game::GameError;
use crate::movegen::random_placement;
use crate::protocol::parse_layout;

/// Configuration for a batch of simulated matches.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of matches to play.
    pub games: usize,
    /// Players per match.
    pub nb_players: i32,
    /// Turn limit per match before it is abandoned.
    pub max_turns: usize,
    /// Worker threads.
    pub threads: usize,
    /// Base seed; match `i` uses `seed + i`. 0 picks one from entropy.
    pub seed: u64,
    /// Board in layout notation; the training board when unset.
    pub layout: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            games: 10,
            nb_players: 2,
            max_turns: 500,
            threads: 4,
            seed: 0,
            layout: None,
        }
    }
}

/// Errors from a simulation batch.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to build thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Result of one simulated match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub seed: Option<u64>,
    /// Turns passed before the match ended or hit the limit.
    pub turns: usize,
    pub winner: Option<i32>,
    pub game_over: bool,
    /// Final base hp per player.
    pub base_hp: BTreeMap<i32, i32>,
    /// Blocks placed over the whole match.
    pub placements: usize,
}

/// Plays one match on `board` to the end or to `max_turns`.
///
/// Dice come from the engine RNG seeded by `config.seed`; every other
/// choice comes from `rng`.
pub fn play_random_match(
    board: Board,
    config: EngineConfig,
    max_turns: usize,
    rng: &mut impl Rng,
) -> Result<MatchSummary, EngineError> {
    let seed = config.seed;
    let mut engine = Engine::new(EngineConfig {
        auto_pass_turn: false,
        ..config
    });
    engine.load_board(board)?;

    let mut turns = 0;
    let mut placements = 0;
    while turns < max_turns && !engine.state()?.is_game_over() {
        placements += play_turn(&mut engine, rng)?;
        if engine.state()?.is_game_over() {
            break;
        }
        engine.pass_turn()?;
        turns += 1;
    }

    let state = engine.state()?;
    debug!(turns, placements, winner = ?state.winner(), "match finished");
    Ok(MatchSummary {
        seed,
        turns,
        winner: state.winner(),
        game_over: state.is_game_over(),
        base_hp: state.base_hp_cache().clone(),
        placements,
    })
}

/// Rolls, commits, and places as many blocks as the position allows.
/// Returns the number of blocks placed.
fn play_turn(engine: &mut Engine, rng: &mut impl Rng) -> Result<usize, EngineError> {
    engine.roll_dice()?;
    engine.commit_dice_usage(rng.gen_bool(0.5))?;

    let mut placements = 0;
    let mut tried = BTreeSet::new();
    loop {
        let state = engine.state()?;
        if state.is_game_over() {
            break;
        }
        let open: Vec<usize> = (0..state.sequences_to_place().len())
            .filter(|i| !state.completed_sequences().contains(i) && !tried.contains(i))
            .collect();
        let Some(&index) = open.choose(rng) else {
            break;
        };
        tried.insert(index);
        if !engine.select_sequence(index)?.is_applied() {
            break;
        }

        // Place until the sequence completes or stalls.
        loop {
            let state = engine.state()?;
            if state.completed_sequences().contains(&index) || state.is_game_over() {
                break;
            }
            let Some(pos) = random_placement(state.playable_positions(), rng) else {
                break;
            };
            if !engine.place_block(pos.x, pos.y)?.is_applied() {
                break;
            }
            placements += 1;
        }

        let state = engine.state()?;
        if !state.completed_sequences().contains(&index) && state.blocks_placed_in_sequence() > 0 {
            // Stalled mid-sequence; only passing the turn moves on.
            break;
        }
    }
    Ok(placements)
}

fn load_board(config: &SimulationConfig) -> Result<Board, EngineError> {
    match &config.layout {
        Some(notation) => Ok(parse_layout(notation)?),
        None => Ok(training_board().map_err(GameError::from)?),
    }
}

/// Plays `config.games` matches across a rayon pool. Summaries come back
/// in match order.
pub fn run_simulations(config: &SimulationConfig) -> Result<Vec<MatchSummary>, SimulationError> {
    use rayon::prelude::*;

    let board = load_board(config)?;
    let base_seed = if config.seed != 0 {
        config.seed
    } else {
        rand::random()
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.max(1))
        .build()?;

    let summaries = pool.install(|| {
        (0..config.games)
            .into_par_iter()
            .map(|i| {
                let seed = base_seed.wrapping_add(i as u64);
                let mut rng = SmallRng::seed_from_u64(seed.rotate_left(32));
                let engine_config = EngineConfig {
                    nb_players: config.nb_players,
                    seed: Some(seed),
                    auto_pass_turn: false,
                };
                play_random_match(board.clone(), engine_config, config.max_turns, &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let finished = summaries.iter().filter(|s| s.game_over).count();
    info!(games = summaries.len(), finished, "simulation complete");
    Ok(summaries)
}

/// Writes one JSON object per line.
pub fn write_jsonl<W: Write>(summaries: &[MatchSummary], out: &mut W) -> std::io::Result<()> {
    for summary in summaries {
        serde_json::to_writer(&mut *out, summary)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints aggregate results to stderr.
pub fn print_summary(summaries: &[MatchSummary]) {
    let total = summaries.len();
    let mut wins: BTreeMap<i32, usize> = BTreeMap::new();
    for winner in summaries.iter().filter_map(|s| s.winner) {
        *wins.entry(winner).or_default() += 1;
    }
    let unfinished = summaries.iter().filter(|s| !s.game_over).count();
    let turns: usize = summaries.iter().map(|s| s.turns).sum();
    let placements: usize = summaries.iter().map(|s| s.placements).sum();

    eprintln!("--- Simulation summary ---");
    eprintln!("Matches: {total}");
    for (player, count) in &wins {
        eprintln!("  player {player}: {count} wins");
    }
    eprintln!("  unfinished: {unfinished}");
    if total > 0 {
        eprintln!("Avg turns: {:.1}", turns as f64 / total as f64);
        eprintln!("Avg placements: {:.1}", placements as f64 / total as f64);
    }
}
