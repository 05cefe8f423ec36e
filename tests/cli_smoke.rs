mod common;

use assert_cmd::prelude::*;
use common::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn extchurn() -> Command {
    let mut cmd = Command::cargo_bin("extchurn").unwrap();
    cmd.arg("--quiet");
    cmd
}

#[test]
fn scan_writes_log_and_prints_ranking() {
    if !has_git() {
        return;
    }
    let root = tempdir().unwrap();
    let repo = root.path().join("repo");
    init_git_repo(&repo);
    commit_file(&repo, "README", "start\n", 100);
    commit_file(&repo, "src/main.rs", &lines(5), 200);
    commit_file(&repo, "notes.md", &lines(2), 300);
    let log = root.path().join("history.csv");

    let out = extchurn()
        .arg("--log")
        .arg(&log)
        .args(["--email", "you\\@example.com"])
        .args(["scan", "--path"])
        .arg(root.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "                  rs | 5\n                  md | 2\n");

    let contents = fs::read_to_string(&log).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert!(contents.lines().all(|l| l.contains(",refs/heads/main,")));
}

#[test]
fn report_json_respects_window_and_deletions() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("log.csv");
    let now = chrono::Utc::now().timestamp();
    fs::write(
        &log,
        format!(
            "a,/r/.git,refs/heads/main,100,old,e@x,{{\"+go\":50}}\n\
             b,/r/.git,refs/heads/main,{now},new,e@x,{{\"+go\":5,\"-go\":3}}\n\
             this line is not a record\n"
        ),
    )
    .unwrap();

    let out = extchurn()
        .arg("--log")
        .arg(&log)
        .args(["report", "--days", "1", "--all", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let entries = v["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["key"], "+go");
    assert_eq!(entries[0]["total"], 5);
    assert_eq!(entries[1]["key"], "-go");
    assert_eq!(entries[1]["total"], 3);

    let out = extchurn()
        .arg("--log")
        .arg(&log)
        .args(["report", "--days", "-1", "--ndjson"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap(), "{\"key\":\"go\",\"total\":55}\n");
}

#[test]
fn skip_uses_existing_log_and_fails_without_one() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("missing.csv");
    extchurn()
        .arg("--log")
        .arg(&log)
        .args(["scan", "--skip"])
        .assert()
        .failure();

    fs::write(&log, "a,/r,refs/heads/x,1,t,e,{\"+c\":2}\n").unwrap();
    let out = extchurn()
        .arg("--log")
        .arg(&log)
        .args(["scan", "--skip", "--limit", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap(), "                   c | 2\n");
}

#[test]
fn files_lists_branch_tip() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    init_git_repo(dir.path());
    commit_file(dir.path(), "src/lib.rs", "pub fn hi() {}\n", 100);
    commit_file(dir.path(), "Makefile", "all:\n", 200);

    let out = extchurn()
        .args(["files", "--repo"])
        .arg(dir.path())
        .args(["--branch", "main"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "refs/heads/main\n  Makefile\n  src/lib.rs\n"
    );
}
