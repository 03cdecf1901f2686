//! Temporary project directories for tests and benchmarks.
//!
//! Only compiled with the `test-utils` feature.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary project directory, optionally a git repository.
///
/// Removed when dropped.
pub struct TestRepo {
    dir: TempDir,
    git_initialized: bool,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            dir,
            git_initialized: false,
        }
    }

    pub fn with_git() -> Self {
        let mut repo = Self::new();
        repo.init_git();
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `git init` with a local identity and signing disabled, so commits
    /// work on any machine.
    pub fn init_git(&mut self) {
        self.git(&["init", "--quiet"]);
        self.git(&["config", "user.email", "test@test.com"]);
        self.git(&["config", "user.name", "Test"]);
        self.git(&["config", "commit.gpgsign", "false"]);
        self.git_initialized = true;
    }

    fn git(&self, args: &[&str]) {
        Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run git");
    }

    fn write(&self, path: &str, content: &[u8]) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write a file, creating parent directories, and stage it when git
    /// is initialized.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.write(path, content.as_bytes());
        if self.git_initialized {
            self.git(&["add", path]);
        }
        full_path
    }

    /// Write a file without staging it.
    pub fn add_untracked(&self, path: &str, content: &str) -> PathBuf {
        self.write(path, content.as_bytes())
    }

    /// Write raw bytes without staging them.
    pub fn add_binary(&self, path: &str, content: &[u8]) -> PathBuf {
        self.write(path, content)
    }

    /// Write `dir/.gitignore` (the root one for an empty `dir`).
    pub fn add_gitignore(&self, dir: &str, lines: &[&str]) -> PathBuf {
        let path = if dir.is_empty() {
            ".gitignore".to_string()
        } else {
            format!("{}/.gitignore", dir.trim_end_matches('/'))
        };
        self.write(&path, format!("{}\n", lines.join("\n")).as_bytes())
    }

    pub fn stage_all(&self) {
        if self.git_initialized {
            self.git(&["add", "."]);
        }
    }

    pub fn commit(&self, message: &str) {
        assert!(self.git_initialized, "Git not initialized");
        self.git(&["commit", "--quiet", "-m", message, "--allow-empty"]);
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
