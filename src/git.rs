//! Git repository integration
//!
//! Tracked-file listing for `--git-only`, repository metadata for
//! `--include-git-info` and a porcelain-style status summary for
//! `--git-status`, all read through libgit2.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use git2::{Repository, Status, StatusOptions};
use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};
use tracing::debug;

use crate::error::Result;

/// Repository metadata embedded in the output.
#[derive(Debug, Clone, Serialize)]
pub struct GitInfo {
    pub commit_hash: String,
    pub branch: String,
    /// `Name <email>` of the last commit's author.
    pub author: String,
    pub commit_date: DateTime<FixedOffset>,
    pub is_dirty: bool,
    pub last_modified: DateTime<Local>,
    pub repository_url: String,
}

impl GitInfo {
    pub fn state(&self) -> &'static str {
        repository_state(self.is_dirty)
    }
}

/// Status of a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// Path relative to the repository root.
    pub path: String,
    /// Two-letter porcelain code (`" M"`, `"A "`, `"??"`...), empty when
    /// unchanged.
    pub code: String,
    pub tracked: bool,
    pub modified: bool,
    pub staged: bool,
}

impl FileStatus {
    pub fn description(&self) -> &'static str {
        if self.code.is_empty() {
            "Unchanged"
        } else {
            status_description(&self.code)
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub branch: String,
    pub commit_hash: String,
    /// `YYYY-MM-DD HH:MM:SS` in the commit's own offset.
    pub last_commit_time: String,
    pub is_dirty: bool,
    pub total_files: usize,
    pub tracked_files: usize,
    pub untracked_files: usize,
    pub modified_files: usize,
    pub staged_files: usize,
    /// Tracked files in index order, then untracked ones by path.
    pub files: Vec<FileStatus>,
}

pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| git2::Error::from_str("repository has no working directory"))?
            .to_path_buf();
        debug!("found git repository at {}", workdir.display());
        Ok(Self { repo, workdir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Absolute paths of every file in the index.
    pub fn tracked_files(&self) -> Result<HashSet<PathBuf>> {
        Ok(self
            .index_paths()?
            .into_iter()
            .map(|path| self.workdir.join(path))
            .collect())
    }

    pub fn info(&self) -> Result<GitInfo> {
        let head = self.repo.head()?;
        let commit = head.peel_to_commit()?;

        let branch = if self.repo.head_detached()? {
            "HEAD".to_string()
        } else {
            head.shorthand().unwrap_or("HEAD").to_string()
        };

        let author = commit.author();
        let author_line = format!(
            "{} <{}>",
            author.name().unwrap_or_default(),
            author.email().unwrap_or_default()
        );

        let repository_url = match self.repo.find_remote("origin") {
            Ok(remote) => remote.url().unwrap_or_default().to_string(),
            Err(_) => String::new(),
        };

        Ok(GitInfo {
            commit_hash: commit.id().to_string(),
            branch,
            author: author_line,
            commit_date: commit_time(&author.when())?,
            is_dirty: !self.porcelain_codes()?.is_empty(),
            last_modified: Local::now(),
            repository_url,
        })
    }

    pub fn status_summary(&self) -> Result<StatusSummary> {
        let info = self.info()?;
        let tracked = self.index_paths()?;
        let mut codes = self.porcelain_codes()?;

        let mut summary = StatusSummary {
            branch: info.branch,
            commit_hash: info.commit_hash,
            last_commit_time: info.commit_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            is_dirty: info.is_dirty,
            total_files: 0,
            tracked_files: tracked.len(),
            untracked_files: 0,
            modified_files: 0,
            staged_files: 0,
            files: Vec::with_capacity(tracked.len()),
        };

        for path in tracked {
            let code = codes.remove(&path).unwrap_or_default();
            let status = FileStatus {
                modified: is_modified(&code),
                staged: is_staged(&code),
                tracked: true,
                path,
                code,
            };
            summary.modified_files += usize::from(status.modified);
            summary.staged_files += usize::from(status.staged);
            summary.files.push(status);
        }

        let mut rest: Vec<_> = codes.into_iter().collect();
        rest.sort();
        for (path, code) in rest {
            let status = FileStatus {
                staged: is_staged(&code),
                modified: false,
                tracked: false,
                path,
                code,
            };
            summary.staged_files += usize::from(status.staged);
            summary.untracked_files += 1;
            summary.files.push(status);
        }

        summary.total_files = summary.tracked_files + summary.untracked_files;
        Ok(summary)
    }

    fn index_paths(&self) -> Result<Vec<String>> {
        let index = self.repo.index()?;
        Ok(index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .collect())
    }

    /// Porcelain codes for every changed or untracked path.
    fn porcelain_codes(&self) -> Result<HashMap<String, String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let mut codes = HashMap::new();
        for entry in statuses.iter() {
            let Some(code) = porcelain_code(entry.status()) else {
                continue;
            };
            if let Some(path) = entry.path() {
                codes.insert(path.to_string(), code);
            }
        }
        Ok(codes)
    }
}

fn commit_time(time: &git2::Time) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .ok_or_else(|| git2::Error::from_str("invalid commit time offset"))?;
    let utc = DateTime::from_timestamp(time.seconds(), 0)
        .ok_or_else(|| git2::Error::from_str("invalid commit timestamp"))?;
    Ok(utc.with_timezone(&offset))
}

/// Two-letter `git status --porcelain` code, `None` for clean or ignored
/// entries.
pub fn porcelain_code(status: Status) -> Option<String> {
    if status.is_empty() || status.contains(Status::IGNORED) {
        return None;
    }
    if status.contains(Status::CONFLICTED) {
        return Some("UU".to_string());
    }
    if status.contains(Status::WT_NEW) && !status.intersects(index_flags()) {
        return Some("??".to_string());
    }

    let x = if status.contains(Status::INDEX_NEW) {
        'A'
    } else if status.contains(Status::INDEX_MODIFIED) {
        'M'
    } else if status.contains(Status::INDEX_DELETED) {
        'D'
    } else if status.contains(Status::INDEX_RENAMED) {
        'R'
    } else if status.contains(Status::INDEX_TYPECHANGE) {
        'T'
    } else {
        ' '
    };
    let y = if status.contains(Status::WT_MODIFIED) {
        'M'
    } else if status.contains(Status::WT_DELETED) {
        'D'
    } else if status.contains(Status::WT_RENAMED) {
        'R'
    } else if status.contains(Status::WT_TYPECHANGE) {
        'T'
    } else {
        ' '
    };

    if x == ' ' && y == ' ' {
        return None;
    }
    Some(format!("{}{}", x, y))
}

fn index_flags() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

fn is_modified(code: &str) -> bool {
    code.contains(['M', 'D', 'R'])
}

fn is_staged(code: &str) -> bool {
    code.chars().next().is_some_and(|c| c != ' ' && c != '?')
}

pub fn status_description(code: &str) -> &'static str {
    match code {
        "??" => "Untracked",
        "A " => "Added",
        " M" => "Modified (not staged)",
        "M " => "Modified (staged)",
        "MM" => "Modified (partially staged)",
        "D " => "Deleted (staged)",
        " D" => "Deleted (not staged)",
        "R " => "Renamed",
        "C " => "Copied",
        "UU" => "Conflict",
        _ => "Unknown status",
    }
}

pub fn repository_state(is_dirty: bool) -> &'static str {
    if is_dirty {
        "Dirty (uncommitted changes)"
    } else {
        "Clean (no uncommitted changes)"
    }
}

/// Print a status summary, listing changed files when there are any.
pub fn print_status<W: WriteColor>(out: &mut W, summary: &StatusSummary) -> io::Result<()> {
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    out.set_color(&bold)?;
    writeln!(out, "Git Status Summary:")?;
    out.reset()?;

    writeln!(out, "  Branch: {}", summary.branch)?;
    writeln!(out, "  Commit: {}", summary.commit_hash)?;
    writeln!(out, "  Last commit: {}", summary.last_commit_time)?;
    writeln!(out, "  Repository state: {}", repository_state(summary.is_dirty))?;
    writeln!(out)?;
    writeln!(out, "  Total files: {}", summary.total_files)?;
    writeln!(out, "  Tracked files: {}", summary.tracked_files)?;
    writeln!(out, "  Untracked files: {}", summary.untracked_files)?;
    writeln!(out, "  Modified files: {}", summary.modified_files)?;
    writeln!(out, "  Staged files: {}", summary.staged_files)?;
    writeln!(out)?;

    if summary.modified_files > 0 || summary.untracked_files > 0 {
        writeln!(out, "  Changed files:")?;
        let mut code_color = ColorSpec::new();
        code_color.set_fg(Some(Color::Yellow));
        for status in summary.files.iter().filter(|s| !s.code.is_empty()) {
            write!(out, "    ")?;
            out.set_color(&code_color)?;
            write!(out, "{}", status.code)?;
            out.reset()?;
            writeln!(out, " {}", status.path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;
    use termcolor::NoColor;

    fn git(dir: &Path, args: &[&str]) {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
    }

    fn create_test_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init"]);
        git(dir.path(), &["config", "user.email", "test@test.com"]);
        git(dir.path(), &["config", "user.name", "Test"]);
        git(dir.path(), &["config", "commit.gpgsign", "false"]);
        dir
    }

    fn commit_all(dir: &Path) {
        git(dir, &["add", "-A"]);
        git(dir, &["commit", "-m", "initial"]);
    }

    #[test]
    fn test_tracked_files() {
        let dir = create_test_repo();
        fs::write(dir.path().join("tracked.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("untracked.rs"), "fn other() {}").unwrap();
        git(dir.path(), &["add", "tracked.rs"]);

        let repo = GitRepo::discover(dir.path()).unwrap();
        let tracked = repo.tracked_files().unwrap();
        assert!(tracked.contains(&repo.workdir().join("tracked.rs")));
        assert!(!tracked.contains(&repo.workdir().join("untracked.rs")));
    }

    #[test]
    fn test_discover_outside_repo() {
        let dir = TempDir::new().unwrap();
        // A temp dir could sit inside some repository on the host; only
        // assert when discovery really fails.
        if let Err(e) = GitRepo::discover(dir.path()) {
            assert!(matches!(e, crate::error::Error::Git(_)));
        }
    }

    #[test]
    fn test_info() {
        let dir = create_test_repo();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(dir.path());
        git(
            dir.path(),
            &["remote", "add", "origin", "https://example.com/repo.git"],
        );

        let info = GitRepo::discover(dir.path()).unwrap().info().unwrap();
        assert_eq!(info.commit_hash.len(), 40);
        assert_eq!(info.author, "Test <test@test.com>");
        assert_eq!(info.repository_url, "https://example.com/repo.git");
        assert!(!info.is_dirty);
        assert_eq!(info.state(), "Clean (no uncommitted changes)");

        fs::write(dir.path().join("new.txt"), "new").unwrap();
        let info = GitRepo::discover(dir.path()).unwrap().info().unwrap();
        assert!(info.is_dirty);
    }

    #[test]
    fn test_info_without_commits_fails() {
        let dir = create_test_repo();
        assert!(GitRepo::discover(dir.path()).unwrap().info().is_err());
    }

    #[test]
    fn test_status_summary() {
        let dir = create_test_repo();
        fs::write(dir.path().join("clean.txt"), "clean").unwrap();
        fs::write(dir.path().join("edited.txt"), "before").unwrap();
        commit_all(dir.path());

        fs::write(dir.path().join("edited.txt"), "after").unwrap();
        fs::write(dir.path().join("staged.txt"), "staged").unwrap();
        git(dir.path(), &["add", "staged.txt"]);
        fs::write(dir.path().join("loose.txt"), "loose").unwrap();

        let summary = GitRepo::discover(dir.path())
            .unwrap()
            .status_summary()
            .unwrap();

        assert_eq!(summary.tracked_files, 3);
        assert_eq!(summary.untracked_files, 1);
        assert_eq!(summary.total_files, 4);
        assert_eq!(summary.modified_files, 1);
        assert_eq!(summary.staged_files, 1);
        assert!(summary.is_dirty);

        let code_of = |name: &str| {
            summary
                .files
                .iter()
                .find(|s| s.path == name)
                .map(|s| s.code.as_str())
        };
        assert_eq!(code_of("clean.txt"), Some(""));
        assert_eq!(code_of("edited.txt"), Some(" M"));
        assert_eq!(code_of("staged.txt"), Some("A "));
        assert_eq!(code_of("loose.txt"), Some("??"));

        let mut out = NoColor::new(Vec::new());
        print_status(&mut out, &summary).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("Git Status Summary:"));
        assert!(text.contains("    ?? loose.txt"));
        assert!(!text.contains("clean.txt"));
    }

    #[test]
    fn test_porcelain_codes() {
        assert_eq!(porcelain_code(Status::CURRENT), None);
        assert_eq!(porcelain_code(Status::IGNORED), None);
        assert_eq!(porcelain_code(Status::WT_NEW).as_deref(), Some("??"));
        assert_eq!(
            porcelain_code(Status::INDEX_MODIFIED | Status::WT_MODIFIED).as_deref(),
            Some("MM")
        );
        assert_eq!(porcelain_code(Status::WT_DELETED).as_deref(), Some(" D"));
        assert_eq!(porcelain_code(Status::CONFLICTED).as_deref(), Some("UU"));
    }

    #[test]
    fn test_status_helpers() {
        assert_eq!(status_description("MM"), "Modified (partially staged)");
        assert_eq!(status_description("XY"), "Unknown status");
        assert!(is_staged("A "));
        assert!(!is_staged(" M"));
        assert!(!is_staged("??"));
        assert!(is_modified(" D"));
        assert!(!is_modified("A "));
    }
}
