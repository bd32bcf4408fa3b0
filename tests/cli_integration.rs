//! CLI integration tests.
//!
//! These tests run the `ob` binary against a temporary store and config
//! file. Nothing here needs a chess engine.

mod common;

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{write_book, SAMPLE_BOOK, SAMPLE_PGN};

/// A scratch store plus an empty config file.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn ob(&self) -> Command {
        let mut cmd = Command::cargo_bin("ob").unwrap();
        cmd.arg("--data-dir")
            .arg(self.path("data"))
            .arg("--config")
            .arg(self.path("config.toml"))
            .env_remove("OPENBOOK_LOG");
        cmd
    }

    fn populate(&self) {
        let book = self.path("book.bin");
        write_book(&book, SAMPLE_BOOK);
        self.ob()
            .args(["populate", "--book"])
            .arg(&book)
            .assert()
            .success();
    }
}

// =============================================================================
// Basics
// =============================================================================

#[test]
fn help_lists_commands() {
    Command::cargo_bin("ob")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("populate"))
        .stdout(predicate::str::contains("troubleshoot"));
}

#[test]
fn version_is_printed() {
    Command::cargo_bin("ob")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_config_file_is_an_error() {
    let ws = Workspace::new();
    Command::cargo_bin("ob")
        .unwrap()
        .arg("--config")
        .arg(ws.path("nope.toml"))
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn completion_generates_bash_script() {
    Command::cargo_bin("ob")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_ob"));
}

// =============================================================================
// Store
// =============================================================================

#[test]
fn stats_on_empty_store() {
    let ws = Workspace::new();
    ws.ob()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("nodes\t0\n"))
        .stdout(predicate::str::contains("edges\t0"));
}

#[test]
fn wipe_requires_confirmation() {
    let ws = Workspace::new();
    ws.populate();

    ws.ob()
        .arg("wipe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    ws.ob()
        .arg("stats")
        .assert()
        .stdout(predicate::str::starts_with("nodes\t8\n"));

    ws.ob()
        .args(["wipe", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 8 position(s)"));
    ws.ob()
        .arg("stats")
        .assert()
        .stdout(predicate::str::starts_with("nodes\t0\n"));
}

// =============================================================================
// Positions
// =============================================================================

#[test]
fn populate_then_show_and_suggest() {
    let ws = Workspace::new();
    ws.populate();

    ws.ob()
        .args(["show", "e2e4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("e7e5"))
        .stdout(predicate::str::contains("c7c6"))
        .stdout(predicate::str::contains("theory"));

    ws.ob()
        .arg("suggest")
        .arg("--book")
        .arg(ws.path("book.bin"))
        .assert()
        .success()
        .stdout(predicate::str::contains("e2e4\te4\ttheory"))
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("good"));
}

#[test]
fn show_unknown_position() {
    let ws = Workspace::new();
    ws.ob()
        .args(["show", "a2a3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FEN:"))
        .stdout(predicate::str::contains("Not in the graph"));
}

#[test]
fn illegal_move_line_is_rejected() {
    let ws = Workspace::new();
    ws.ob().args(["show", "e2e5"]).assert().failure();
}

#[test]
fn unlink_removes_last_move() {
    let ws = Workspace::new();
    ws.populate();

    ws.ob().args(["unlink", "e2e4", "c7c6"]).assert().success();
    ws.ob()
        .args(["show", "e2e4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("e7e5"))
        .stdout(predicate::str::contains("c7c6").not());

    // Already gone.
    ws.ob().args(["unlink", "e2e4", "c7c6"]).assert().failure();
}

#[test]
fn import_pgn_records_games() {
    let ws = Workspace::new();
    let pgn = ws.path("games.pgn");
    std::fs::write(&pgn, SAMPLE_PGN).unwrap();

    ws.ob()
        .arg("import-pgn")
        .arg(&pgn)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 of 2 game(s)"));

    // 1. e4 by a 2650 player is theory; 1... c5 by a 2100 player is not.
    ws.ob()
        .args(["show", "e2e4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c7c5\tc5\tcasual"));

    ws.ob()
        .arg("import-pgn")
        .arg(&pgn)
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 already known)"));
}

#[test]
fn troubleshoot_reports_healthy_graph() {
    let ws = Workspace::new();
    ws.populate();
    ws.ob()
        .arg("troubleshoot")
        .assert()
        .success()
        .stdout(predicate::str::contains("no issues found"));
}

// =============================================================================
// Favorites
// =============================================================================

#[test]
fn favorite_lifecycle() {
    let ws = Workspace::new();

    ws.ob()
        .args(["favorite", "add", "caro", "e2e4", "c7c6"])
        .assert()
        .success();
    ws.ob()
        .args(["favorite", "add", "caro", "d2d4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already taken"));

    ws.ob()
        .args(["favorite", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("caro"));
    ws.ob()
        .args(["favorite", "show", "caro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("e2e4 c7c6"));

    ws.ob().args(["favorite", "remove", "caro"]).assert().success();
    ws.ob()
        .args(["favorite", "show", "caro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No favorite named 'caro'"));
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn config_get_set_and_list() {
    let ws = Workspace::new();

    ws.ob()
        .args(["config", "get", "import.theory_elo"])
        .assert()
        .success()
        .stdout("2500\n");

    ws.ob()
        .args(["config", "set", "import.theory_elo", "2400"])
        .assert()
        .success();
    ws.ob()
        .args(["config", "get", "import.theory_elo"])
        .assert()
        .success()
        .stdout("2400\n");

    ws.ob()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("populate.max_depth = 25"));

    ws.ob()
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure();
}

#[test]
fn config_path_is_the_loaded_file() {
    let ws = Workspace::new();
    ws.ob()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
