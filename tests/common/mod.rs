#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;

pub const AUTHOR: &str = "you@example.com";

pub fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

pub fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git").args(args).current_dir(dir).output().unwrap();
    assert!(out.status.success());
    String::from_utf8(out.stdout).unwrap().trim().to_string()
}

pub fn init_git_repo(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "core.safecrlf", "false"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "user.email", AUTHOR]);
    git(dir, &["config", "user.name", "Your Name"]);
}

pub fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
}

pub fn lines(count: usize) -> String {
    (0..count).map(|i| format!("line {i}\n")).collect()
}

/// Commits everything staged plus the working tree, authored by `email` at
/// unix time `when`.
pub fn commit_all(dir: &Path, message: &str, email: &str, when: i64) {
    git(dir, &["add", "-A"]);
    let date = format!("@{when} +0000");
    assert!(Command::new("git")
        .args(["commit", "-q", "-m", message])
        .env("GIT_AUTHOR_EMAIL", email)
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

pub fn commit_file(dir: &Path, name: &str, content: &str, when: i64) {
    write_file(dir, name, content);
    commit_all(dir, &format!("add {name}"), AUTHOR, when);
}
