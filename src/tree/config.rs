//! Configuration types for the tree walker

/// Configuration for tree walking behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// List entries whose name starts with a dot (`.git` is never listed).
    pub include_dotfiles: bool,
    /// Directories at this depth are listed without their contents.
    pub max_depth: Option<usize>,
}

impl WalkerConfig {
    pub(super) fn at_max_depth(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }
}
