//! End-to-end sessions against the dicefront binary.
//!
//! Each test writes a whole script to the process, closes stdin, and
//! compares the reply lines.

use std::io::Write;
use std::process::{Command, Stdio};

/// 3x3 duel: player 1 base top-left with a zone strip, player 2 base
/// bottom-right.
const DUEL: &str = "B1.1.1.5,L0.0.1.0,./L0.0.1.0,.,./.,.,B2.2.2.2";

/// Runs `script` through a fresh process and returns one string per reply
/// line. End of input closes the session like `quit` does.
fn play(script: &[&str]) -> Vec<String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_dicefront"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("dicefront should start");

    let mut input = script.join("\n");
    input.push('\n');
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("script should be written");

    let output = child.wait_with_output().expect("dicefront should exit");
    assert!(output.status.success(), "exit status {}", output.status);
    String::from_utf8(output.stdout)
        .expect("replies are utf-8")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Loads the duel board, then runs `script`. The `ok` for the layout is
/// checked and dropped.
fn play_duel(script: &[&str]) -> Vec<String> {
    let layout = format!("layout {DUEL}");
    let mut full = vec![layout.as_str()];
    full.extend_from_slice(script);
    let mut lines = play(&full);
    assert_eq!(lines.first().map(String::as_str), Some("ok"));
    lines.remove(0);
    lines
}

#[test]
fn quit_ends_the_session_early() {
    let lines = play(&["isready", "quit", "isready"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn unparsable_lines_get_no_reply() {
    let lines = play(&["foobar", "", "roll x y", "place 1", "isready"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn turn_commands_need_a_board() {
    let lines = play(&["roll", "pass", "status"]);
    assert_eq!(lines, vec!["error no game in progress"; 3]);
}

#[test]
fn double_one_defends_and_passes() {
    let lines = play_duel(&[
        "roll 1 1",
        "use sum",
        "select 0",
        "positions",
        "place 1 0",
        "status",
        "show",
    ]);
    assert_eq!(
        lines,
        vec![
            "ok",
            "ok",
            "ok",
            "positions 1,0 0,1",
            "ok",
            "status player 2 phase idle dice - used - sequences - active - placed 0 \
             completed - hp 1:5,2:2 eliminated - winner -",
            "layout B1.1.1.5,L1.0.1.1,./L0.0.1.0,.,./.,.,B2.2.2.2",
        ]
    );
}

#[test]
fn out_of_phase_commands_are_rejected() {
    let lines = play_duel(&[
        "use sum",
        "roll 2 3",
        "roll",
        "select 0",
        "use separate",
        "select 5",
        "place 2 2",
    ]);
    assert_eq!(
        lines,
        vec![
            "rejected no-dice-rolled",
            "ok",
            "rejected dice-already-rolled",
            "rejected no-sequences",
            "ok",
            "rejected sequence-out-of-range",
            "rejected no-active-sequence",
        ]
    );
}

#[test]
fn malformed_setup_and_out_of_range_input_are_errors() {
    let lines = play(&[
        "layout B0.0.0.1",
        &format!("layout {DUEL}"),
        "roll 7 1",
        "place 9 9",
        "setoption name Bogus value 1",
        "newgame 9",
    ]);
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("error "));
    assert_eq!(lines[1], "ok");
    assert_eq!(lines[2], "error die value 7 is outside 1..=6");
    assert!(lines[3].starts_with("error "));
    assert_eq!(lines[4], "error unknown option 'Bogus'");
    assert!(lines[5].starts_with("error "));
}

#[test]
fn base_attack_wins_the_match() {
    let lines = play(&[
        "layout B1.1.1.5,L1.0.0.1,B2.2.2.2",
        "roll 6 6",
        "use separate",
        "select 0",
        "positions",
        "place 2 0",
        "status",
        "pass",
    ]);
    assert_eq!(&lines[..6], &["ok", "ok", "ok", "ok", "positions 2,0", "ok"]);
    assert!(lines[6].contains("phase game-over"), "{}", lines[6]);
    assert!(lines[6].contains("hp 1:5,2:0"), "{}", lines[6]);
    assert!(lines[6].ends_with("eliminated 2 winner 1"), "{}", lines[6]);
    assert_eq!(lines[7], "rejected game-over");
}

#[test]
fn training_board_with_options() {
    let lines = play(&[
        "setoption name Seed value 42",
        "setoption name AutoPass value false",
        "training",
        "status",
    ]);
    assert_eq!(&lines[..3], &["ok", "ok", "ok"]);
    assert!(lines[3].starts_with("status player 1 phase idle"));
    assert!(lines[3].contains("hp 1:10,2:10"));
}

#[test]
fn snapshot_carries_over_to_a_new_process() {
    let first = play_duel(&["roll 2 3", "use separate", "snapshot", "status"]);
    let snapshot = first[2].strip_prefix("snapshot ").unwrap();

    let restore = format!("restore {snapshot}");
    let second = play(&[&restore, "status"]);
    assert_eq!(second, vec!["ok", first[3].as_str()]);
}

#[test]
fn forged_snapshot_is_refused() {
    let first = play(&["layout B1.1.1.5,B2.2.2.5", "snapshot"]);
    let forged = first[1]
        .strip_prefix("snapshot ")
        .unwrap()
        .replace("\"is_game_over\":false", "\"is_game_over\":true");

    let lines = play(&[&format!("restore {forged}"), "status"]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("error inconsistent state"), "{}", lines[0]);
    assert_eq!(lines[1], "error no game in progress");
}
