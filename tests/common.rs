#![allow(dead_code)]
use assert_cmd::{cargo_bin_cmd, Command};
use std::path::PathBuf;
use tempfile::TempDir;

pub const EMAIL: &str = "amina@example.com";

pub fn miqat() -> Command {
    cargo_bin_cmd!("miqat")
}

/// A fresh database inside its own temp dir. Keep the `TempDir` alive for
/// the duration of the test.
pub fn test_db() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path: PathBuf = dir.path().join("miqat.db");
    (dir, path.to_string_lossy().to_string())
}

/// `miqat --db <path> <args...>`
pub fn run(db_path: &str, args: &[&str]) -> Command {
    let mut cmd = miqat();
    cmd.arg("--db").arg(db_path).args(args);
    cmd
}

pub fn login(db_path: &str) {
    run(db_path, &["profile", "login", EMAIL, "--name", "Amina"])
        .assert()
        .success();
}
