//! Integration tests for the `kanban` CLI.
//!
//! Each test creates a temp working directory, runs `kanban` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Get the path to the built `kanban` binary.
fn kanban_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("kanban");
    path
}

/// Run `kanban` with `cwd` as the working directory.
fn kanban(cwd: &Path, args: &[&str]) -> Output {
    Command::new(kanban_bin())
        .current_dir(cwd)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn add(cwd: &Path, args: &[&str]) -> PathBuf {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    let out = kanban(cwd, &full);
    assert!(out.status.success(), "add failed: {}", stderr(&out));
    PathBuf::from(stdout(&out).trim())
}

#[test]
fn version_flag() {
    let tmp = TempDir::new().unwrap();
    let out = kanban(tmp.path(), &["--version"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn first_run_creates_config_and_columns() {
    let tmp = TempDir::new().unwrap();
    let out = kanban(tmp.path(), &["list"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let board = tmp.path().join(".kanban");
    assert!(board.join("config.toml").exists());
    for col in ["todo", "doing", "done"] {
        assert!(board.join(col).is_dir());
    }
    let text = stdout(&out);
    assert!(text.contains("To Do (todo) 0"));
    assert!(text.contains("Done (done) 0"));
}

#[test]
fn add_then_list() {
    let tmp = TempDir::new().unwrap();
    let path = add(
        tmp.path(),
        &["Fix login bug", "--tag", "bug", "--tag", "auth", "--body", "Steps"],
    );

    assert!(path.exists());
    assert_eq!(path.parent().unwrap().file_name().unwrap(), "todo");
    assert!(path.to_string_lossy().ends_with("-fix-login-bug.md"));
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("---\ntitle: Fix login bug\ntags:\n- bug\n- auth\n"));
    assert!(content.ends_with("---\n\nSteps\n"));

    let out = kanban(tmp.path(), &["list"]);
    let text = stdout(&out);
    assert!(text.contains("To Do (todo) 1"));
    assert!(text.contains("Fix login bug  [bug, auth]"));
}

#[test]
fn add_to_named_column_and_list_json() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), &["Review PR", "--column", "doing"]);

    let out = kanban(tmp.path(), &["list", "--column", "doing", "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let columns = json.as_array().unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0]["dir"], "doing");
    assert_eq!(columns[0]["tickets"][0]["title"], "Review PR");
    assert!(columns[0]["tickets"][0].get("agent_feedback").is_none());
}

#[test]
fn move_and_remove() {
    let tmp = TempDir::new().unwrap();
    let path = add(tmp.path(), &["Ship it"]);
    let name = path.file_name().unwrap().to_string_lossy().to_string();

    // Relative to the board directory
    let rel = format!("todo/{}", name);
    let out = kanban(tmp.path(), &["mv", &rel, "done"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let moved = tmp.path().join(".kanban/done").join(&name);
    assert!(!path.exists());
    assert!(moved.exists());

    let out = kanban(tmp.path(), &["rm", moved.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(!moved.exists());

    // Removing it again fails
    let out = kanban(tmp.path(), &["rm", moved.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("error: "));
}

#[test]
fn unknown_column_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let out = kanban(tmp.path(), &["add", "Lost", "--column", "nope"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("error: no column 'nope'"));
}

#[test]
fn empty_title_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let out = kanban(tmp.path(), &["add", "   "]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("title cannot be empty"));
}

#[test]
fn malformed_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "columns = 3\n").unwrap();

    let out = kanban(tmp.path(), &["--config", config.to_str().unwrap(), "list"]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("error: could not parse"));
}

#[test]
fn dir_override_and_custom_columns() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("board.toml");
    fs::write(
        &config,
        "[[columns]]\nname = \"Backlog\"\ndir = \"backlog\"\n\n[[columns]]\nname = \"Shipped\"\ndir = \"shipped\"\n",
    )
    .unwrap();

    let path = add(
        tmp.path(),
        &["--config", config.to_str().unwrap(), "--dir", "elsewhere", "Custom"],
    );
    assert!(path.starts_with(tmp.path().join("elsewhere/backlog")));

    let out = kanban(
        tmp.path(),
        &["--config", config.to_str().unwrap(), "--dir", "elsewhere", "list"],
    );
    assert!(stdout(&out).contains("Backlog (backlog) 1"));
    assert!(stdout(&out).contains("Shipped (shipped) 0"));
}

#[test]
fn list_warns_about_malformed_tickets() {
    let tmp = TempDir::new().unwrap();
    add(tmp.path(), &["Good one"]);
    fs::write(
        tmp.path().join(".kanban/todo/broken.md"),
        "---\ntitle: [unclosed\n---\n",
    )
    .unwrap();

    let out = kanban(tmp.path(), &["list"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("To Do (todo) 1"));
    assert!(stderr(&out).contains("warning: skipped"));
    assert!(stderr(&out).contains("broken.md"));
}

#[test]
fn first_run_writes_agent_instructions() {
    let tmp = TempDir::new().unwrap();
    kanban(tmp.path(), &["list"]);
    let agent = fs::read_to_string(tmp.path().join(".kanban/AGENT.md")).unwrap();
    assert!(agent.starts_with("# Kanban Agent Instructions"));
}

#[test]
fn prompt_for_one_ticket() {
    let tmp = TempDir::new().unwrap();
    let path = add(tmp.path(), &["Fix login bug"]);
    let name = path.file_name().unwrap().to_str().unwrap().to_string();

    let out = kanban(tmp.path(), &["prompt", path.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with(&format!(
        "Implement the task described in this ticket: @.kanban/todo/{}\n",
        name
    )));
    assert!(text.contains(&format!("\".kanban/doing/{}\" \".kanban/done/{}\"", name, name)));

    // Relative to the board directory works too
    let out = kanban(tmp.path(), &["prompt", &format!("todo/{}", name)]);
    assert_eq!(stdout(&out), text);
}

#[test]
fn batch_prompt_uses_config_template() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".kanban")).unwrap();
    fs::write(
        tmp.path().join(".kanban/config.toml"),
        "batch_ticket_prompt = \"{{range .Tickets}}[{{.Title}}]{{end}}\"\n",
    )
    .unwrap();
    add(tmp.path(), &["One"]);
    add(tmp.path(), &["Two", "--column", "doing"]);

    let out = kanban(tmp.path(), &["prompt", "--batch"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "[One]");
}

#[test]
fn batch_prompt_on_empty_column_fails() {
    let tmp = TempDir::new().unwrap();
    let out = kanban(tmp.path(), &["prompt", "--batch"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("no tickets in todo"));
}

#[test]
fn yaml_config_is_read_when_no_toml_exists() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".kanban")).unwrap();
    fs::write(
        tmp.path().join(".kanban/config.yaml"),
        "kanban_dir: tasks\ncolumns:\n  - name: Inbox\n    dir: inbox\n",
    )
    .unwrap();

    let path = add(tmp.path(), &["From yaml"]);
    assert!(path.starts_with(tmp.path().join("tasks/inbox")));
    assert!(!tmp.path().join(".kanban/config.toml").exists());
}
