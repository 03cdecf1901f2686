//! codectx - Pack a directory tree and its file contents into one document

pub mod analysis;
pub mod error;
pub mod file_utils;
pub mod git;
pub mod gitignore;
pub mod language;
pub mod limits;
pub mod output;
pub mod stats;
pub mod tree;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use analysis::{
    ComplexityAnalysis, HealthCheck, analyze_complexity, check_health, print_complexity,
    print_health,
};
pub use error::{Error, Result};
pub use file_utils::is_text_file;
pub use git::{GitInfo, GitRepo, StatusSummary, print_status};
pub use gitignore::{GitignoreRules, Rule};
pub use limits::{SizeLimiter, parse_size};
pub use output::{FileOutcome, Formatter, OutputConfig, OutputFormat, ScanOptions, ScanSummary};
pub use stats::{CodebaseStats, StatsCollector, StatsConfig, print_stats};
pub use tree::{FileFilter, TreeNode, TreeWalker, WalkerConfig, render_tree};
