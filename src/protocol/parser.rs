//! Line command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the binary main loop can dispatch on.

use tracing::warn;

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reset for a new match, optionally changing the player count.
    NewGame { players: Option<i32> },

    /// Start a match on a board given in layout notation.
    Layout { notation: String },

    /// Start a match on the built-in training board.
    Training,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Roll the dice, or inject fixed values with `roll <d1> <d2>`.
    Roll { dice: Option<(u32, u32)> },

    /// Commit the dice as their sum or separately.
    Use { sum: bool },

    /// Activate a sequence by index.
    Select { index: usize },

    /// Place the next block of the active sequence.
    Place { x: usize, y: usize },

    /// End the current player's turn.
    Pass,

    /// Print the board in layout notation.
    Show,

    /// Print the playable positions.
    Positions,

    /// Print a one-line summary of the turn.
    Status,

    /// Print the full state as JSON.
    Snapshot,

    /// Replace the state with a JSON snapshot.
    Restore { json: String },

    /// Synchronization ping; engine replies `readyok`.
    IsReady,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let (&keyword, args) = tokens.split_first()?;

    match keyword {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "training" => Some(Command::Training),
        "pass" => Some(Command::Pass),
        "show" => Some(Command::Show),
        "positions" => Some(Command::Positions),
        "status" => Some(Command::Status),
        "snapshot" => Some(Command::Snapshot),

        "newgame" => parse_newgame(args),
        "layout" => parse_layout_command(args),
        "setoption" => parse_setoption(args),
        "roll" => parse_roll(args),
        "use" => parse_use(args),
        "select" => parse_select(args),
        "place" => parse_place(args),
        "restore" => parse_restore(trimmed),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

fn parse_number<T: std::str::FromStr>(token: &str, what: &str) -> Option<T> {
    match token.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(value = token, "invalid {what}");
            None
        }
    }
}

/// Parses `newgame [players]`.
fn parse_newgame(args: &[&str]) -> Option<Command> {
    match args {
        [] => Some(Command::NewGame { players: None }),
        [players] => parse_number(players, "player count")
            .map(|players| Command::NewGame { players: Some(players) }),
        _ => {
            warn!("malformed newgame: expected 'newgame [players]'");
            None
        }
    }
}

/// Parses `layout <notation>`. The notation holds no spaces.
fn parse_layout_command(args: &[&str]) -> Option<Command> {
    match args {
        [notation] => Some(Command::Layout {
            notation: notation.to_string(),
        }),
        _ => {
            warn!("malformed layout: expected 'layout <notation>'");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    if args.len() < 2 || args[0] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let rest = &args[1..];
    let (name_parts, value_parts) = match rest.iter().position(|&t| t == "value") {
        Some(vi) => (&rest[..vi], &rest[vi + 1..]),
        None => (rest, &[][..]),
    };
    if name_parts.is_empty() {
        warn!("malformed setoption: empty name");
        return None;
    }
    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));

    Some(Command::SetOption {
        name: name_parts.join(" "),
        value,
    })
}

/// Parses `roll [d1 d2]`.
fn parse_roll(args: &[&str]) -> Option<Command> {
    match args {
        [] => Some(Command::Roll { dice: None }),
        [d1, d2] => {
            let d1 = parse_number(d1, "die value")?;
            let d2 = parse_number(d2, "die value")?;
            Some(Command::Roll {
                dice: Some((d1, d2)),
            })
        }
        _ => {
            warn!("malformed roll: expected 'roll [d1 d2]'");
            None
        }
    }
}

/// Parses `use sum|separate`.
fn parse_use(args: &[&str]) -> Option<Command> {
    match args {
        ["sum"] => Some(Command::Use { sum: true }),
        ["separate"] => Some(Command::Use { sum: false }),
        _ => {
            warn!("malformed use: expected 'use sum|separate'");
            None
        }
    }
}

/// Parses `select <index>`.
fn parse_select(args: &[&str]) -> Option<Command> {
    match args {
        [index] => parse_number(index, "sequence index").map(|index| Command::Select { index }),
        _ => {
            warn!("malformed select: expected 'select <index>'");
            None
        }
    }
}

/// Parses `place <x> <y>`.
fn parse_place(args: &[&str]) -> Option<Command> {
    match args {
        [x, y] => {
            let x = parse_number(x, "coordinate")?;
            let y = parse_number(y, "coordinate")?;
            Some(Command::Place { x, y })
        }
        _ => {
            warn!("malformed place: expected 'place <x> <y>'");
            None
        }
    }
}

/// Parses `restore <json>`, keeping everything after the keyword verbatim.
fn parse_restore(line: &str) -> Option<Command> {
    let json = line.strip_prefix("restore").unwrap_or("").trim();
    if json.is_empty() {
        warn!("malformed restore: expected 'restore <json>'");
        return None;
    }
    Some(Command::Restore {
        json: json.to_string(),
    })
}
