//! Test harness for codectx integration tests

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

pub use codectx::test_utils::TestRepo;

/// Run the binary in `dir`, returning stdout, stderr and success.
pub fn run_codectx(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = env!("CARGO_BIN_EXE_codectx");
    let output = Command::new(binary)
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run codectx");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_creates_temp_dir() {
        let repo = TestRepo::new();
        assert!(repo.path().exists());
    }

    #[test]
    fn test_harness_git_init() {
        let repo = TestRepo::with_git();
        assert!(repo.path().join(".git").exists());
    }

    #[test]
    fn test_harness_add_gitignore() {
        let repo = TestRepo::new();
        let path = repo.add_gitignore("sub", &["*.log", "!keep.log"]);
        assert_eq!(path, repo.path().join("sub/.gitignore"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "*.log\n!keep.log\n");
    }
}
