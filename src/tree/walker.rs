//! TreeWalker - scans a directory into a `TreeNode`

use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::file_utils::is_dotfile;
use crate::gitignore::GitignoreRules;

use super::config::WalkerConfig;
use super::node::TreeNode;

const GIT_DIR: &str = ".git";

/// Recursive directory scanner.
///
/// Children are sorted directories first, then by name. Symlinks are not
/// followed: a link to a file is listed as a file, anything else is
/// skipped.
pub struct TreeWalker {
    config: WalkerConfig,
    gitignore: Option<GitignoreRules>,
}

impl TreeWalker {
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            config,
            gitignore: None,
        }
    }

    /// Prune entries matched by these rules. Ignored directories are not
    /// descended into.
    pub fn with_gitignore(mut self, rules: GitignoreRules) -> Self {
        self.gitignore = Some(rules);
        self
    }

    pub fn walk(&self, root: &Path) -> Result<TreeNode> {
        let meta = fs::metadata(root).map_err(|e| Error::io(root, e))?;
        if !meta.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        let children = if self.config.at_max_depth(0) {
            Vec::new()
        } else {
            self.read_children(root, 0).map_err(|e| Error::io(root, e))?
        };

        let name = root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());

        Ok(TreeNode::Dir {
            name,
            path: root.to_path_buf(),
            children,
        })
    }

    fn read_children(&self, dir: &Path, depth: usize) -> io::Result<Vec<TreeNode>> {
        let mut children = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("failed to read entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if name == GIT_DIR || (!self.config.include_dotfiles && is_dotfile(&name)) {
                continue;
            }

            let Some(is_dir) = entry_is_dir(&entry) else {
                continue;
            };
            let path = entry.path();

            if let Some(rules) = &self.gitignore {
                if rules.should_ignore(&path, Some(is_dir)) {
                    trace!("pruned {}", path.display());
                    continue;
                }
            }

            if !is_dir {
                children.push(TreeNode::File { name, path });
                continue;
            }

            let grandchildren = if self.config.at_max_depth(depth + 1) {
                Vec::new()
            } else {
                match self.read_children(&path, depth + 1) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("failed to read directory {}: {}", path.display(), e);
                        continue;
                    }
                }
            };
            children.push(TreeNode::Dir {
                name,
                path,
                children: grandchildren,
            });
        }

        children.sort_by(|a, b| {
            b.is_dir()
                .cmp(&a.is_dir())
                .then_with(|| a.name().cmp(b.name()))
        });
        Ok(children)
    }
}

/// `Some(true)` for directories, `Some(false)` for files and links to
/// files, `None` for entries that should not be listed.
fn entry_is_dir(entry: &DirEntry) -> Option<bool> {
    let file_type = entry.file_type().ok()?;
    if file_type.is_symlink() {
        return fs::metadata(entry.path())
            .ok()
            .filter(|meta| meta.is_file())
            .map(|_| false);
    }
    Some(file_type.is_dir())
}
