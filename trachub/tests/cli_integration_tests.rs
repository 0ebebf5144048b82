// trachub/tests/cli_integration_tests.rs
//! Command-line integration tests for the `trachub` binary.
//!
//! The binary is run through `assert_cmd`, inputs and exports live in temporary
//! directories, and coloured output is stripped before comparing.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use strip_ansi_escapes::strip as strip_ansi_escapes_fn;

const TICKETS: &str = "\
id,type,owner,reporter,milestone,status,resolution,summary,description,createdtime,modifiedtime,component,priority,keywords,cc
1,defect,alice,bob,1.0,closed,fixed,'''Crash''' on start,\"== Steps ==\nrun it\",2015-03-04 10:20:00,2015-03-05 11:00:00,core,major,,
2,enhancement,carol,alice,,new,,Faster,see ticket:1,2015-03-06 09:00:00,2015-03-06 09:30:00,None,minor,,
";

fn trachub() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("trachub"));
    cmd.env("RUST_LOG", "debug");
    cmd.env_remove("TRACHUB_REPO");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
    fs::write(dir.join(name), content)?;
    Ok(())
}

fn plain(bytes: &[u8]) -> String {
    String::from_utf8_lossy(&strip_ansi_escapes_fn(bytes)).to_string()
}

#[test]
fn translate_reads_stdin_and_writes_stdout() -> Result<()> {
    let assert = trachub()
        .args(["translate", "--repo", "octo/widgets"])
        .write_stdin("== Title ==\n'''bold''' and ''italic''\n")
        .assert()
        .success();
    let stdout = plain(&assert.get_output().stdout);
    assert_eq!(stdout, "## Title\n*bold* and _italic_\n");
    Ok(())
}

#[test]
fn translate_resolves_ticket_references_from_export() -> Result<()> {
    let dir = tempdir()?;
    write(dir.path(), "tickets.csv", TICKETS)?;
    trachub()
        .args(["translate", "--repo", "octo/widgets", "--existing-issues", "5", "--tickets"])
        .arg(dir.path().join("tickets.csv"))
        .write_stdin("see ticket:2 and ticket:1")
        .assert()
        .success()
        .stdout("see issue #7 and issue #6\n");
    Ok(())
}

#[test]
fn unresolved_ticket_reference_fails() {
    trachub()
        .args(["translate", "--repo", "octo/widgets"])
        .write_stdin("see ticket:42")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Cannot resolve reference to ticket #42"));
}

#[test]
fn no_convert_copies_input() {
    trachub()
        .args(["translate", "--repo", "octo/widgets", "--no-convert"])
        .write_stdin("== Title ==\nticket:42\n")
        .assert()
        .success()
        .stdout("== Title ==\nticket:42\n");
}

#[test]
fn translate_file_to_file() -> Result<()> {
    let dir = tempdir()?;
    write(dir.path(), "in.txt", "[[Image(shot.png)]]\n")?;
    let output = dir.path().join("out.md");
    trachub()
        .args([
            "translate",
            "--repo",
            "octo/widgets",
            "--attachments-prefix",
            "https://files.example.org/att/",
            "--ticket-id",
            "9",
            "-i",
        ])
        .arg(dir.path().join("in.txt"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Writing translated content to file"));
    assert_eq!(
        fs::read_to_string(&output)?,
        "![shot.png](https://files.example.org/att/9/shot.png)\n"
    );
    Ok(())
}

#[test]
fn diff_view_marks_changed_lines() {
    let assert = trachub()
        .args(["translate", "--repo", "octo/widgets", "--diff"])
        .write_stdin("== Title ==\nsame\n")
        .assert()
        .success();
    let stdout = plain(&assert.get_output().stdout);
    assert!(stdout.contains("- == Title =="));
    assert!(stdout.contains("+ ## Title"));
    assert!(stdout.contains("  same"));
}

#[test]
fn disabled_rule_leaves_markup_alone() {
    trachub()
        .args(["translate", "--repo", "octo/widgets", "--disable", "heading_level_2"])
        .write_stdin("== Title ==\n")
        .assert()
        .success()
        .stdout("== Title ==\n");
}

#[test]
fn summary_goes_to_stderr() {
    let assert = trachub()
        .args(["translate", "--repo", "octo/widgets", "--summary"])
        .write_stdin("== Title ==\n")
        .assert()
        .success()
        .stdout("## Title\n");
    let stderr = plain(&assert.get_output().stderr);
    assert!(stderr.contains("Rule Summary"));
    assert!(stderr.contains("heading_level_2"));
}

#[test]
fn malformed_repo_is_rejected() {
    trachub()
        .args(["translate", "--repo", "widgets"])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

#[test]
fn repo_can_come_from_environment() {
    trachub()
        .env("TRACHUB_REPO", "octo/widgets")
        .arg("translate")
        .write_stdin("''x''")
        .assert()
        .success()
        .stdout("_x_\n");
}

#[test]
fn rules_lists_context_rules_first() {
    let assert = trachub().arg("rules").assert().success();
    let stdout = plain(&assert.get_output().stdout);
    let image = stdout.find("image_with_size").unwrap_or(usize::MAX);
    let heading = stdout.find("heading_level_2").unwrap_or(usize::MAX);
    assert!(image < heading);
    assert!(stdout.contains("ticket_lookup"));
}

#[test]
fn rules_rejects_missing_file() {
    trachub()
        .args(["rules", "--rules", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn plan_writes_json_to_stdout() -> Result<()> {
    let dir = tempdir()?;
    write(dir.path(), "tickets.csv", TICKETS)?;
    write(
        dir.path(),
        "migrate.yaml",
        "repo: octo/widgets\ntickets: tickets.csv\nconvert_text: true\nexisting_issues: 3\n",
    )?;
    let assert = trachub()
        .arg("plan")
        .arg(dir.path().join("migrate.yaml"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Planned 2 issues"));
    let plan: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(plan["repo"], "octo/widgets");
    assert_eq!(plan["issues"][0]["number"], 4);
    assert_eq!(plan["issues"][0]["title"], "*Crash* on start");
    assert!(plan["issues"][1]["body"]
        .as_str()
        .is_some_and(|body| body.starts_with("see issue #4")));
    Ok(())
}

#[test]
fn plan_writes_json_to_file() -> Result<()> {
    let dir = tempdir()?;
    write(dir.path(), "tickets.csv", TICKETS)?;
    write(dir.path(), "migrate.yaml", "repo: octo/widgets\n")?;
    let output = dir.path().join("plan.json");
    trachub()
        .arg("-q")
        .arg("plan")
        .arg(dir.path().join("migrate.yaml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let plan: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(plan["issues"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn plan_reports_unknown_settings() -> Result<()> {
    let dir = tempdir()?;
    write(dir.path(), "migrate.yaml", "repo: octo/widgets\nnot_an_option: 1\n")?;
    trachub()
        .arg("plan")
        .arg(dir.path().join("migrate.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not_an_option"));
    Ok(())
}
