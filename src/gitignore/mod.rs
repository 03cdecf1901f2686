//! Gitignore-style path exclusion
//!
//! A deliberately small subset of `.gitignore` semantics:
//!
//! - blank lines and `#` comments are skipped
//! - `!pattern` re-includes a path excluded by an earlier rule
//! - `pattern/` only matches directories
//! - a pattern is tried against the whole root-relative path and against
//!   every suffix of it, so slash-free patterns match at any depth
//! - the last matching rule wins
//!
//! Patterns use plain shell globs (`*`, `?`, `[...]`); `**` is not
//! recursive.

mod path;
mod rule;
mod rules;

pub use path::normalize;
pub use rule::{Rule, parse};
pub use rules::{GITIGNORE_FILE, GitignoreRules};
