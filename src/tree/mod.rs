//! Directory scanning
//!
//! - `TreeWalker` scans a directory into a `TreeNode`
//! - `render_tree` draws it in `tree` style
//! - `FileFilter` picks the files whose content is emitted

mod config;
mod filter;
mod node;
mod render;
mod walker;

pub use config::WalkerConfig;
pub use filter::FileFilter;
pub use node::TreeNode;
pub use render::render_tree;
pub use walker::TreeWalker;
