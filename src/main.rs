//! Dicefront -- a dice-driven territory-control rules engine.
//!
//! This binary reads commands from stdin and writes responses to stdout,
//! one line per command. Diagnostics go to stderr.

use std::io::{self, BufRead, Write};

use dicefront::engine::{Engine, EngineError};
use dicefront::game::Outcome;
use dicefront::protocol::{parse_command, Command};

/// Writes `ok`, `rejected <reason>` or `error <message>`.
fn respond<W: Write>(out: &mut W, result: Result<Outcome, EngineError>) -> io::Result<()> {
    match result {
        Ok(Outcome::Applied) => writeln!(out, "ok"),
        Ok(Outcome::Rejected(reason)) => writeln!(out, "rejected {reason}"),
        Err(e) => writeln!(out, "error {e}"),
    }
}

/// Writes `ok` for a setup step, or the error.
fn respond_unit<W: Write>(out: &mut W, result: Result<(), EngineError>) -> io::Result<()> {
    respond(out, result.map(|()| Outcome::Applied))
}

/// Writes the error of a query that produced no output.
fn report<W: Write>(out: &mut W, result: Result<(), EngineError>) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) => writeln!(out, "error {e}"),
    }
}

/// Runs the main protocol loop, reading commands from stdin and writing
/// responses to stdout.
fn main() -> io::Result<()> {
    dicefront::init_tracing();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::default();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::NewGame { players } => respond_unit(&mut out, engine.new_game(players))?,
            Command::Layout { notation } => {
                respond_unit(&mut out, engine.load_layout(&notation))?;
            }
            Command::Training => respond_unit(&mut out, engine.load_training())?,
            Command::SetOption { name, value } => {
                respond_unit(&mut out, engine.set_option(&name, value.as_deref()))?;
            }
            Command::Roll { dice: None } => respond(&mut out, engine.roll_dice())?,
            Command::Roll {
                dice: Some((d1, d2)),
            } => respond(&mut out, engine.roll_dice_with(d1, d2))?,
            Command::Use { sum } => respond(&mut out, engine.commit_dice_usage(sum))?,
            Command::Select { index } => respond(&mut out, engine.select_sequence(index))?,
            Command::Place { x, y } => respond(&mut out, engine.place_block(x, y))?,
            Command::Pass => respond(&mut out, engine.pass_turn())?,
            Command::Show => {
                let result = engine.handle_show(&mut out);
                report(&mut out, result)?;
            }
            Command::Positions => {
                let result = engine.handle_positions(&mut out);
                report(&mut out, result)?;
            }
            Command::Status => {
                let result = engine.handle_status(&mut out);
                report(&mut out, result)?;
            }
            Command::Snapshot => {
                let result = engine.handle_snapshot(&mut out);
                report(&mut out, result)?;
            }
            Command::Restore { json } => respond_unit(&mut out, engine.restore_json(&json))?,
            Command::Quit => break,
        }
        out.flush()?;
    }
    out.flush()
}
