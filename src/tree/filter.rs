//! Content filter for scanned files

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::file_utils::is_dotfile;
use crate::gitignore::{GitignoreRules, normalize};

const EXCLUDE_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Decides which scanned files get their content emitted.
///
/// Checks run in order: dotfiles, git-tracked set, gitignore rules,
/// exclude patterns, extension allow-list.
#[derive(Debug, Default)]
pub struct FileFilter {
    root: PathBuf,
    extensions: Vec<String>,
    excludes: Vec<Option<Pattern>>,
    include_dotfiles: bool,
    tracked: Option<HashSet<PathBuf>>,
    gitignore: Option<GitignoreRules>,
}

impl FileFilter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Comma-separated extensions; the leading dot is optional.
    pub fn with_extensions(mut self, list: &str) -> Self {
        self.extensions = split_list(list)
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Comma-separated glob patterns. A malformed pattern never matches.
    pub fn with_excludes(mut self, list: &str) -> Self {
        self.excludes = split_list(list)
            .map(|pattern| Pattern::new(pattern).ok())
            .collect();
        self
    }

    pub fn include_dotfiles(mut self, include: bool) -> Self {
        self.include_dotfiles = include;
        self
    }

    /// Only keep files in this set of absolute paths.
    pub fn with_tracked(mut self, tracked: HashSet<PathBuf>) -> Self {
        self.tracked = Some(tracked);
        self
    }

    pub fn with_gitignore(mut self, rules: GitignoreRules) -> Self {
        self.gitignore = Some(rules);
        self
    }

    pub fn is_included(&self, path: &Path) -> bool {
        match self.rejection(path) {
            Some(reason) => {
                debug!("skipping {}: {}", path.display(), reason);
                false
            }
            None => true,
        }
    }

    fn rejection(&self, path: &Path) -> Option<&'static str> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.include_dotfiles && is_dotfile(&name) {
            return Some("dotfile");
        }
        if let Some(tracked) = &self.tracked {
            if !tracked.contains(path) {
                return Some("not tracked by git");
            }
        }
        if let Some(rules) = &self.gitignore {
            if rules.should_ignore(path, Some(false)) {
                return Some("ignored by .gitignore");
            }
        }

        let relative = normalize(&self.root, path);
        let excluded = self.excludes.iter().flatten().any(|pattern| {
            pattern.matches_with(&name, EXCLUDE_MATCH)
                || relative
                    .as_deref()
                    .is_some_and(|rel| pattern.matches_with(rel, EXCLUDE_MATCH))
        });
        if excluded {
            return Some("matches exclude pattern");
        }

        if !self.extensions.is_empty() {
            let ext = path.extension().map(|e| e.to_string_lossy());
            let allowed = ext.is_some_and(|ext| self.extensions.iter().any(|a| *a == *ext));
            if !allowed {
                return Some("extension not selected");
            }
        }

        None
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}
