//! End-to-end tests driving the `ltt` binary against a temporary database.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::{NamedTempFile, TempDir};

struct Env {
    _temp: TempDir,
    config: NamedTempFile,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("ltt.db");

        let mut config = NamedTempFile::new().unwrap();
        writeln!(config, r#"database_path = "{}""#, db_path.display()).unwrap();
        config.flush().unwrap();

        Self {
            _temp: temp,
            config,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_ltt"));
        command.arg("--config").arg(self.config.path());
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().unwrap()
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "ltt {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn track(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command()
            .arg("track")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        // The process may exit before reading everything
        let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
        child.wait_with_output().unwrap()
    }
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_ltt"))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["customers", "log", "export", "settings", "track"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[test]
fn test_customer_lifecycle() {
    let env = Env::new();

    let added = env.run_ok(&[
        "customers",
        "add",
        "--name",
        "Acme Corp",
        "--engagement-type",
        "Retainer",
        "--hours",
        "10",
    ]);
    assert!(added.starts_with("Added Acme Corp ("));

    let listed = env.run_ok(&["customers", "list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&listed).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["hoursRemaining"], 10.0);

    env.run_ok(&["customers", "edit", "acme corp", "--hours", "12.5"]);
    env.run_ok(&["customers", "archive", "Acme Corp"]);
    let active = env.run_ok(&["customers", "list"]);
    assert!(active.starts_with("No customers."));
    let all = env.run_ok(&["customers", "list", "--all"]);
    assert!(all.contains("12.50h"));
    assert!(all.contains("(archived)"));

    env.run_ok(&["customers", "delete", "Acme Corp"]);
    let output = env.run(&["customers", "delete", "Acme Corp"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no customer matching"));
}

#[test]
fn test_invalid_hours_rejected() {
    let env = Env::new();
    let output = env.run(&["customers", "add", "--name", "Acme", "--hours=-3"]);
    assert!(!output.status.success());
    assert!(env.run_ok(&["customers", "list"]).starts_with("No customers."));
}

#[test]
fn test_track_session_is_persisted() {
    let env = Env::new();
    env.run_ok(&["customers", "add", "--name", "Acme", "--hours", "1"]);

    let output = env.track(&["acme"], "status\nstart\nstatus\nstop\nquit\n");
    assert!(
        output.status.success(),
        "track failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Customer: Acme"));
    assert!(stdout.contains("Started timer for Acme."));
    assert!(stdout.contains("Timer: running"));
    assert!(stdout.contains("Saved "));

    let log = env.run_ok(&["log", "Acme", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&log).unwrap();
    assert_eq!(value["sessions"].as_array().unwrap().len(), 1);
}

#[test]
fn test_track_saves_running_session_at_end_of_input() {
    let env = Env::new();
    env.run_ok(&["customers", "add", "--name", "Acme", "--hours", "1"]);

    let output = env.track(&[], "start\n");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("before exit."));

    let log = env.run_ok(&["log", "Acme", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&log).unwrap();
    assert_eq!(value["sessions"].as_array().unwrap().len(), 1);
}

#[test]
fn test_track_unknown_customer_fails() {
    let env = Env::new();
    let output = env.track(&["globex"], "quit\n");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no active customer matching"));
}

#[test]
fn test_export_writes_csv() {
    let env = Env::new();
    env.run_ok(&["customers", "add", "--name", "Acme Corp", "--hours", "1"]);
    env.track(&[], "start\nstop\nquit\n");

    let out_dir = TempDir::new().unwrap();
    let path = out_dir.path().join("acme.csv");
    let message = env.run_ok(&["export", "Acme Corp", "--output", path.to_str().unwrap()]);
    assert!(message.starts_with("Exported 1 session for Acme Corp"));

    let csv = std::fs::read_to_string(&path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Date,Duration,Start Time,End Time"));
    assert!(lines.next().unwrap().starts_with('"'));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_export_default_file_name() {
    let env = Env::new();
    env.run_ok(&["customers", "add", "--name", "Acme Corp", "--hours", "1"]);

    let work_dir = TempDir::new().unwrap();
    let output = env
        .command()
        .current_dir(work_dir.path())
        .args(["export", "Acme Corp"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(work_dir.path().join("time-log-acme-corp.csv").exists());
}

#[test]
fn test_settings_round_trip() {
    let env = Env::new();
    env.run_ok(&[
        "settings",
        "set",
        "--idle-detection",
        "true",
        "--idle-timeout-minutes",
        "30",
    ]);

    let shown = env.run_ok(&["settings", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(value["idleDetection"], true);
    assert_eq!(value["idleTimeoutMinutes"], 30);
    assert_eq!(value["theme"], "dark");
}
