mod common;

use assert_cmd::prelude::*;
use common::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

/// Three commits: no baseline yet, baseline plus overrides, then the
/// overrides dropped in favour of an external project list.
fn history(dir: &std::path::Path) {
    init_git_repo(dir);
    write_file(dir, "README.md", "tracking\n");
    commit_all(dir, "readme", "2024-01-01 10:00:00 +0000");

    write_file(dir, BASELINE, &ports_yaml(4, 1));
    write_file(dir, OVERRIDES, "ports:\n- name: port1\n  status: ✅\n");
    commit_all(dir, "baseline", "2024-01-02 10:00:00 +0000");

    write_file(dir, BASELINE, &ports_yaml(5, 1));
    fs::remove_file(dir.join(OVERRIDES)).unwrap();
    write_file(dir, EXTERNAL, "ports:\n- name: stdexec\n  status: ✅\n");
    commit_all(dir, "external", "2024-01-03 10:00:00 +0000");
}

#[test]
fn dirty_tree_is_refused() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    history(dir.path());
    write_file(dir.path(), BASELINE, "ports: []\n");

    let out = dir.path().join("out.json");
    cmd(dir.path())
        .args(["backfill", "--strategy", "checkout", "--output"])
        .arg(&out)
        .assert()
        .failure();

    assert!(!out.exists());
    assert_eq!(
        fs::read_to_string(dir.path().join(BASELINE)).unwrap(),
        "ports: []\n"
    );
}

#[test]
fn wrong_branch_is_refused() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    history(dir.path());
    git(dir.path(), &["checkout", "-q", "-b", "feature"]);

    cmd(dir.path())
        .args(["backfill", "--strategy", "checkout", "--no-live"])
        .assert()
        .failure();
}

#[test]
fn checkout_restores_tree_and_progress_file() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    history(dir.path());
    write_file(dir.path(), PROGRESS, "local: keep\n");
    let head = git(dir.path(), &["rev-parse", "HEAD"]);
    let baseline_before = fs::read(dir.path().join(BASELINE)).unwrap();

    let out = dir.path().join("out.json");
    cmd(dir.path())
        .args(["backfill", "--strategy", "checkout", "--no-live", "--output"])
        .arg(&out)
        .assert()
        .success();

    let series = read_series(&out);
    assert_eq!(counts(&series), vec![(2, 4), (2, 6)]);
    assert_eq!(
        dates(&series),
        vec!["2024-01-02T10:00:00+0000", "2024-01-03T10:00:00+0000"]
    );

    assert_eq!(git(dir.path(), &["rev-parse", "HEAD"]), head);
    assert_eq!(git(dir.path(), &["status", "--porcelain", "--untracked-files=no"]), "");
    assert_eq!(fs::read(dir.path().join(BASELINE)).unwrap(), baseline_before);
    assert!(!dir.path().join(OVERRIDES).exists());
    assert_eq!(
        fs::read_to_string(dir.path().join(PROGRESS)).unwrap(),
        "local: keep\n"
    );
}

#[test]
fn both_strategies_agree() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    history(dir.path());

    let via_show = dir.path().join("show.json");
    cmd(dir.path())
        .args(["backfill", "--no-live", "--output"])
        .arg(&via_show)
        .assert()
        .success();

    let via_checkout = dir.path().join("checkout.json");
    cmd(dir.path())
        .args(["backfill", "--strategy", "checkout", "--no-live", "--output"])
        .arg(&via_checkout)
        .assert()
        .success();

    assert_eq!(read_series(&via_show), read_series(&via_checkout));
}

#[test]
fn malformed_override_skips_commit_and_restores() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    init_git_repo(dir.path());
    write_file(dir.path(), BASELINE, &ports_yaml(2, 0));
    write_file(dir.path(), OVERRIDES, "ports: [[[\n");
    commit_all(dir.path(), "broken", "2024-01-01 10:00:00 +0000");
    write_file(dir.path(), OVERRIDES, "ports:\n- name: port0\n  status: ✅\n");
    commit_all(dir.path(), "fixed", "2024-01-02 10:00:00 +0000");

    let out = dir.path().join("out.json");
    cmd(dir.path())
        .args(["backfill", "--strategy", "checkout", "--no-live", "--output"])
        .arg(&out)
        .assert()
        .success();

    assert_eq!(counts(&read_series(&out)), vec![(1, 2)]);
    assert_eq!(git(dir.path(), &["status", "--porcelain", "--untracked-files=no"]), "");
    assert!(!dir.path().join(PROGRESS).exists());
}

#[test]
fn empty_baseline_is_skipped_before_checkout() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    init_git_repo(dir.path());
    write_file(dir.path(), BASELINE, "\n");
    commit_all(dir.path(), "placeholder", "2024-01-01 10:00:00 +0000");
    write_file(dir.path(), BASELINE, &ports_yaml(2, 1));
    commit_all(dir.path(), "generated", "2024-01-02 10:00:00 +0000");

    let out = dir.path().join("out.json");
    cmd(dir.path())
        .args(["backfill", "--strategy", "checkout", "--no-live", "--output"])
        .arg(&out)
        .assert()
        .success();

    assert_eq!(counts(&read_series(&out)), vec![(1, 2)]);
    assert_eq!(git(dir.path(), &["status", "--porcelain", "--untracked-files=no"]), "");
}

#[cfg(unix)]
#[test]
fn failing_merge_command_skips_every_commit() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    history(dir.path());

    let out = dir.path().join("out.json");
    cmd(dir.path())
        .args([
            "backfill",
            "--strategy",
            "checkout",
            "--merge-command",
            "false",
            "--no-live",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success();

    assert!(read_series(&out).is_empty());
    assert_eq!(git(dir.path(), &["status", "--porcelain", "--untracked-files=no"]), "");
}

#[cfg(unix)]
#[test]
fn configured_merge_command_produces_progress_file() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    history(dir.path());
    write_file(
        dir.path(),
        "adoption-history.toml",
        "strategy = \"checkout\"\n\
         merge_command = [\"sh\", \"-c\", \"cp data/generated/vcpkg_packages.yml data/progress.yml\"]\n",
    );

    let out = dir.path().join("out.json");
    cmd(dir.path())
        .args(["backfill", "--no-live", "--output"])
        .arg(&out)
        .assert()
        .success();

    // the copy ignores overrides and external projects
    assert_eq!(counts(&read_series(&out)), vec![(1, 4), (1, 5)]);
    assert!(!dir.path().join(PROGRESS).exists());
}
