//! In-memory directory tree

use std::path::{Path, PathBuf};

/// A scanned file or directory. Paths are absolute, built by joining
/// entry names onto the scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File {
        name: String,
        path: PathBuf,
    },
    Dir {
        name: String,
        path: PathBuf,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name, .. } => name,
            TreeNode::Dir { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            TreeNode::File { path, .. } => path,
            TreeNode::Dir { path, .. } => path,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Dir { .. })
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File { .. } => &[],
            TreeNode::Dir { children, .. } => children,
        }
    }

    /// Every file below this node, in tree order.
    pub fn file_paths(&self) -> Vec<&Path> {
        let mut paths = Vec::new();
        self.collect_files(&mut paths);
        paths
    }

    fn collect_files<'a>(&'a self, paths: &mut Vec<&'a Path>) {
        match self {
            TreeNode::File { path, .. } => paths.push(path),
            TreeNode::Dir { children, .. } => {
                for child in children {
                    child.collect_files(paths);
                }
            }
        }
    }

    /// Number of directories, counting this node if it is one.
    pub fn dir_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 0,
            TreeNode::Dir { children, .. } => {
                1 + children.iter().map(TreeNode::dir_count).sum::<usize>()
            }
        }
    }

    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 1,
            TreeNode::Dir { children, .. } => children.iter().map(TreeNode::file_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> TreeNode {
        let path = PathBuf::from(path);
        TreeNode::File {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            path,
        }
    }

    fn dir(path: &str, children: Vec<TreeNode>) -> TreeNode {
        let path = PathBuf::from(path);
        TreeNode::Dir {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            path,
            children,
        }
    }

    #[test]
    fn test_counts_and_order() {
        let tree = dir(
            "/p",
            vec![
                dir("/p/src", vec![file("/p/src/lib.rs"), dir("/p/src/empty", vec![])]),
                file("/p/README.md"),
            ],
        );

        assert_eq!(tree.dir_count(), 3);
        assert_eq!(tree.file_count(), 2);
        assert_eq!(
            tree.file_paths(),
            [Path::new("/p/src/lib.rs"), Path::new("/p/README.md")]
        );
    }

    #[test]
    fn test_file_node() {
        let node = file("/p/a.txt");
        assert!(!node.is_dir());
        assert!(node.children().is_empty());
        assert_eq!(node.dir_count(), 0);
        assert_eq!(node.file_paths(), [Path::new("/p/a.txt")]);
    }
}
