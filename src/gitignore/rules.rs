//! Ordered rule set and ignore evaluation

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::path::normalize;
use super::rule::{Rule, parse};

/// Name of the per-directory ignore file picked up by [`GitignoreRules::parse_all`].
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Rules from one or more ignore sources, evaluated relative to `root`.
///
/// Sources are appended in the order they are added; a later rule wins over
/// an earlier one for the same path. Queries only borrow the set, so it can
/// be shared freely once built.
#[derive(Debug, Clone)]
pub struct GitignoreRules {
    root: PathBuf,
    rules: Vec<Rule>,
}

impl GitignoreRules {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append rules parsed from raw lines. Returns how many were added.
    pub fn add_lines<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse(lines);
        let added = parsed.len();
        self.rules.extend(parsed);
        added
    }

    /// Read an ignore file and append its rules.
    ///
    /// The file is read completely before anything is appended, so a
    /// failure leaves the set exactly as it was.
    pub fn add_source(&mut self, path: &Path) -> Result<usize> {
        let bytes = fs::read(path).map_err(|source| Error::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let added = self.add_lines(text.lines());
        debug!("parsed {} rules from {}", added, path.display());
        Ok(added)
    }

    /// Find every `.gitignore` below the root and append its rules, root
    /// first then depth-first in name order.
    ///
    /// Stops at the first unreadable file; rules from files read before it
    /// are kept.
    pub fn parse_all(&mut self) -> Result<usize> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut added = 0;
        for entry in walker {
            let entry = entry.map_err(|e| Error::Walk(e.to_string()))?;
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if is_file && entry.file_name() == GITIGNORE_FILE {
                added += self.add_source(entry.path())?;
            }
        }
        Ok(added)
    }

    /// Decide whether `path` is excluded.
    ///
    /// `is_dir` is the caller's knowledge of whether the path is a
    /// directory; when `None` the filesystem is consulted, but only if a
    /// directory-only rule matches. A path that cannot be stat'd counts as
    /// not being a directory. Paths outside the root are never ignored.
    pub fn should_ignore(&self, path: &Path, is_dir: Option<bool>) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let Some(relative) = normalize(&self.root, path) else {
            trace!("{} is outside {}", path.display(), self.root.display());
            return false;
        };

        let mut is_dir = is_dir;
        for rule in self.rules.iter().rev() {
            if !rule.matches_path(&relative) {
                continue;
            }
            if rule.is_negation {
                return false;
            }
            if rule.is_directory_only && !*is_dir.get_or_insert_with(|| path.is_dir()) {
                continue;
            }
            trace!("{} ignored by '{}'", relative, rule.pattern);
            return true;
        }
        false
    }
}
