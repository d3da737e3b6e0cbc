//! Random-play match simulation CLI.
//!
//! Plays matches with uniformly random legal choices and outputs one JSON
//! summary per match.
//!
//! Usage:
//!   cargo run --release --bin simulate -- [OPTIONS]
//!
//! Options:
//!   --games N        Number of matches to play (default: 10)
//!   --players N      Players per match (default: 2)
//!   --max-turns N    Turn limit per match (default: 500)
//!   --threads N      Number of parallel threads (default: 4)
//!   --seed N         Base seed, 0 for entropy (default: 0)
//!   --layout BOARD   Board in layout notation (default: training board)
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use dicefront::simulate::{self, SimulationConfig};

fn parse_flag<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("invalid {flag} value"))
}

fn parse_args(args: &[String]) -> Result<Option<(SimulationConfig, Option<String>, bool)>, String> {
    let mut config = SimulationConfig::default();
    let mut output_path = None;
    let mut quiet = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--games" => config.games = parse_flag(arg, iter.next())?,
            "--players" => config.nb_players = parse_flag(arg, iter.next())?,
            "--max-turns" => config.max_turns = parse_flag(arg, iter.next())?,
            "--threads" => config.threads = parse_flag(arg, iter.next())?,
            "--seed" => config.seed = parse_flag(arg, iter.next())?,
            "--layout" => config.layout = Some(parse_flag(arg, iter.next())?),
            "--output" => output_path = Some(parse_flag(arg, iter.next())?),
            "--quiet" => quiet = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(Some((config, output_path, quiet)))
}

fn main() -> ExitCode {
    dicefront::init_tracing();

    let args: Vec<String> = env::args().collect();
    let (config, output_path, quiet) = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if !quiet {
        eprintln!(
            "Simulate: {} matches, {} players, max {} turns, {} threads",
            config.games, config.nb_players, config.max_turns, config.threads
        );
    }

    let start = Instant::now();
    let summaries = match simulate::run_simulations(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let elapsed = start.elapsed();

    if !quiet {
        eprintln!(
            "Completed {} matches in {:.1}s",
            summaries.len(),
            elapsed.as_secs_f64()
        );
        simulate::print_summary(&summaries);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| simulate::write_jsonl(&summaries, &mut BufWriter::new(file))),
        None => simulate::write_jsonl(&summaries, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {e}");
        return ExitCode::FAILURE;
    }
    if let (Some(path), false) = (&output_path, quiet) {
        eprintln!("Wrote {} matches to {}", summaries.len(), path);
    }
    ExitCode::SUCCESS
}

fn print_usage() {
    eprintln!("Usage: simulate [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of matches to play (default: 10)");
    eprintln!("  --players N      Players per match (default: 2)");
    eprintln!("  --max-turns N    Turn limit per match (default: 500)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Base seed, 0 for entropy (default: 0)");
    eprintln!("  --layout BOARD   Board in layout notation (default: training board)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
