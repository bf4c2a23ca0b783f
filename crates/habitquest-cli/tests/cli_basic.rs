//! CLI tests against the built binary.
//!
//! Each test gets its own home directory and state file.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn state(&self) -> PathBuf {
        self.home.path().join("state.json")
    }

    /// Run with the test home and state file; returns (code, stdout, stderr).
    fn run(&self, args: &[&str]) -> (i32, String, String) {
        run_in(self.home.path(), &self.state(), args)
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let (code, stdout, stderr) = self.run(args);
        assert_eq!(code, 0, "{args:?} failed: {stderr}");
        stdout
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.run_ok(args)).unwrap()
    }
}

fn run_in(home: &Path, state: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitquest"))
        .env("HOME", home)
        .env_remove("HABITQUEST_ENV")
        .env_remove("HABITQUEST_LOG")
        .arg("--state")
        .arg(state)
        .args(args)
        .output()
        .unwrap();

    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

const WEEK_DAYS: [&str; 7] = [
    "2024-03-04", "2024-03-05", "2024-03-06", "2024-03-07", "2024-03-08", "2024-03-09",
    "2024-03-10",
];

fn log_busy_week(env: &Env) {
    for day in WEEK_DAYS {
        env.run_ok(&["log", "--day", day, "--check-ins", "5", "--minutes", "60", "--journal"]);
    }
}

#[test]
fn test_week_on_empty_state() {
    let env = Env::new();
    let week = env.run_json(&["week", "--date", "2024-03-06"]);
    assert_eq!(week["weekKey"], "2024-W10");
    assert_eq!(week["days"][0], "2024-03-04");
    assert_eq!(week["days"][6], "2024-03-10");
    assert_eq!(week["percent"], 0);
    assert_eq!(week["completed"], false);
    assert!(week["recorded"].is_null());
}

#[test]
fn test_sync_records_once() {
    let env = Env::new();
    log_busy_week(&env);

    let week = env.run_json(&["week", "--date", "2024-03-06"]);
    assert_eq!(week["percent"], 100);
    assert_eq!(week["completed"], true);

    let entry = env.run_json(&["sync", "--date", "2024-03-06"]);
    assert_eq!(entry["eventId"], week["eventId"]);
    assert_eq!(entry["xpAwarded"], week["xp"]);

    let again = env.run_ok(&["sync", "--date", "2024-03-06"]);
    assert_eq!(again.trim(), "nothing to record");

    let archive = env.run_json(&["archive"]);
    assert_eq!(archive.as_array().unwrap().len(), 1);
    assert_eq!(archive[0]["week_key"], "2024-W10");

    let level = env.run_json(&["level"]);
    assert_eq!(level["xp"], week["xp"]);
}

#[test]
fn test_log_accumulates_day_activity() {
    let env = Env::new();
    env.run_ok(&["log", "--day", "2024-03-04", "--check-ins", "2"]);
    let logged = env.run_json(&["log", "--day", "2024-03-04", "--check-ins", "3", "--mood", "4"]);
    assert_eq!(logged["activity"]["checkIns"], 5);
    assert_eq!(logged["activity"]["mood"], 4);

    let (code, _, stderr) = env.run(&["log", "--day", "2024-03-04", "--mood", "9"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_manual_complete_is_idempotent() {
    let env = Env::new();
    let first = env.run_json(&["complete", "2024-W10", "--event", "e1", "--xp", "50"]);
    assert_eq!(first["recorded"], true);
    assert_eq!(first["xp"], 50);

    let (code, stdout, stderr) = env.run(&["complete", "2024-W10", "--event", "e2", "--xp", "90"]);
    assert_eq!(code, 0);
    let second: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(second["recorded"], false);
    assert_eq!(second["entry"]["eventId"], "e1");
    assert_eq!(second["xp"], 50);
    assert!(stderr.contains("warning:"));
}

#[test]
fn test_complete_stamps_the_given_date() {
    let env = Env::new();
    env.run_ok(&["config", "set", "utc_offset_minutes", "0"]);
    let done = env.run_json(&["complete", "2024-W10", "--event", "e1", "--xp", "50", "--date", "2024-03-06"]);
    assert!(done["entry"]["completedAt"].as_str().unwrap().starts_with("2024-03-06"));
}

#[test]
fn test_clearing_catalog_path_restores_builtin_events() {
    let env = Env::new();
    env.run_ok(&["config", "set", "catalog_path", "/definitely/not/here.toml"]);
    let (code, _, _) = env.run(&["week", "--date", "2024-03-06"]);
    assert_eq!(code, 1);

    env.run_ok(&["config", "set", "catalog_path", "none"]);
    assert_eq!(env.run_ok(&["config", "get", "catalog_path"]).trim(), "null");
    env.run_ok(&["week", "--date", "2024-03-06"]);
}

#[test]
fn test_malformed_week_key_fails() {
    let env = Env::new();
    let (code, _, stderr) = env.run(&["complete", "2024-10", "--event", "e1", "--xp", "50"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
    assert!(!env.state().exists());
}

#[test]
fn test_chains_and_top_chain() {
    let env = Env::new();
    env.run_ok(&["log", "--day", "2024-03-04", "--check-ins", "9"]);

    let chains = env.run_json(&["chains"]);
    assert_eq!(chains.as_array().unwrap().len(), 6);
    assert_eq!(chains[0]["id"], "consistency");
    assert_eq!(chains[0]["completed"], 1);

    let top = env.run_json(&["chains", "--top"]);
    assert_eq!(top["id"], "habits");
}

#[test]
fn test_config_get_set_reset() {
    let env = Env::new();
    assert_eq!(env.run_ok(&["config", "get", "locale"]).trim(), "de");

    env.run_ok(&["config", "set", "locale", "en"]);
    assert_eq!(env.run_ok(&["config", "get", "locale"]).trim(), "en");

    let (code, _, _) = env.run(&["config", "set", "level.nope", "1"]);
    assert_eq!(code, 1);

    env.run_ok(&["config", "set", "events_enabled", "false"]);
    log_busy_week(&env);
    assert_eq!(env.run_ok(&["sync", "--date", "2024-03-06"]).trim(), "nothing to record");

    env.run_ok(&["config", "reset"]);
    let list = env.run_json(&["config", "list"]);
    assert_eq!(list["locale"], "de");
    assert_eq!(list["events_enabled"], true);
}

#[test]
fn test_completions() {
    let env = Env::new();
    let script = env.run_ok(&["completions", "bash"]);
    assert!(script.contains("habitquest"));
}
