//! Whole-tree project analysis
//!
//! Both passes look at every file under the target, independent of the
//! document filters, and skip `.git`.
//!
//! # Module Structure
//!
//! - `health` - Presence of project hygiene files, large files, empty
//!   directories and binary files
//! - `complexity` - Code, comment and blank line counts with a control
//!   flow score per file

mod complexity;
mod health;

use std::path::Path;

use ignore::{Walk, WalkBuilder};

pub use complexity::{
    COMPLEX_FILE_LINES, COMPLEX_FILE_SCORE, ComplexFile, ComplexityAnalysis, ExtensionMetrics,
    FileMetrics, analyze_complexity, analyze_file, analyze_lines, print_complexity,
};
pub use health::{HealthCheck, LARGE_FILE_THRESHOLD, check_health, print_health};

const GIT_DIR: &str = ".git";

/// Sorted walk over `root` with every ignore source disabled.
fn walk(root: &Path) -> Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != GIT_DIR)
        .build()
}

/// Share of `part` in `whole` as a percentage, zero for an empty whole.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
