#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

pub const BASELINE: &str = "data/generated/vcpkg_packages.yml";
pub const OVERRIDES: &str = "data/vcpkg_overrides.yml";
pub const EXTERNAL: &str = "data/external_projects.yml";
pub const PROGRESS: &str = "data/progress.yml";

pub fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap()
}

pub fn init_git_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "core.safecrlf", "false"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

pub fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Stage everything and commit with a fixed author and committer date.
pub fn commit_all(dir: &Path, message: &str, date: &str) {
    git(dir, &["add", "-A"]);
    let status = Command::new("git")
        .args(["commit", "-q", "--allow-empty", "-m", message])
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success());
}

/// A port list with `done` of `total` ports marked as adopted.
pub fn ports_yaml(total: usize, done: usize) -> String {
    let mut out = String::from("header:\n  vcpkg_commit_hash: abc\nports:\n");
    for i in 0..total {
        let status = if i < done { "✅" } else { "❔" };
        out.push_str(&format!("- name: port{i}\n  status: {status}\n"));
    }
    out
}

pub fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("adoption-history").unwrap();
    cmd.current_dir(dir).arg("--repo").arg(dir);
    cmd
}

pub fn read_series(path: &Path) -> Vec<serde_json::Value> {
    let text = fs::read_to_string(path).unwrap();
    serde_json::from_str::<serde_json::Value>(&text)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

pub fn counts(series: &[serde_json::Value]) -> Vec<(u64, u64)> {
    series
        .iter()
        .map(|p| (p["completed"].as_u64().unwrap(), p["total"].as_u64().unwrap()))
        .collect()
}

pub fn dates(series: &[serde_json::Value]) -> Vec<String> {
    series
        .iter()
        .map(|p| p["commit_date"].as_str().unwrap().to_string())
        .collect()
}
