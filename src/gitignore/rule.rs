//! Parsing of ignore-file lines into rules

use glob::{MatchOptions, Pattern};

/// `*` and `?` never cross a `/`, matching is case sensitive and dotfiles
/// are not special.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One exclusion (or re-inclusion) directive from an ignore file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Glob pattern with the `!` and trailing `/` markers removed.
    pub pattern: String,
    /// The line started with `!`: a match keeps the path.
    pub is_negation: bool,
    /// The line ended with `/`: only directories can match.
    pub is_directory_only: bool,
    compiled: Option<Pattern>,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, is_negation: bool, is_directory_only: bool) -> Self {
        let pattern = pattern.into();
        let compiled = compile(&pattern);
        Self {
            pattern,
            is_negation,
            is_directory_only,
            compiled,
        }
    }

    /// Parse a single ignore-file line.
    ///
    /// Returns `None` for blank lines and `#` comments.
    ///
    /// ```
    /// use codectx::gitignore::Rule;
    ///
    /// let rule = Rule::parse_line("!keep/").unwrap();
    /// assert_eq!(rule.pattern, "keep");
    /// assert!(rule.is_negation && rule.is_directory_only);
    /// assert!(Rule::parse_line("   # comment").is_none());
    /// ```
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (is_negation, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (is_directory_only, pattern) = match rest.strip_suffix('/') {
            Some(pattern) => (true, pattern),
            None => (false, rest),
        };

        Some(Self::new(pattern, is_negation, is_directory_only))
    }

    /// Whether the pattern is a valid glob. Invalid patterns never match.
    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    /// Match the pattern against one candidate string.
    pub fn matches(&self, candidate: &str) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|p| p.matches_with(candidate, MATCH_OPTIONS))
    }

    /// Match against a slash-separated relative path, or against any of its
    /// suffixes obtained by dropping leading segments. This lets `*.log`
    /// match `logs/today/app.log`.
    pub fn matches_path(&self, relative: &str) -> bool {
        if self.matches(relative) {
            return true;
        }
        relative
            .match_indices('/')
            .any(|(idx, _)| self.matches(&relative[idx + 1..]))
    }
}

/// Parse every line of an ignore source, preserving order.
pub fn parse<I, S>(lines: I) -> Vec<Rule>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| Rule::parse_line(line.as_ref()))
        .collect()
}

/// Compile a pattern, collapsing runs of `*` so that `**` behaves as a plain
/// single-segment wildcard instead of a recursive one. A class opened with
/// `[^` is negated like `[!`.
fn compile(pattern: &str) -> Option<Pattern> {
    let mut rewritten = String::with_capacity(pattern.len());
    let mut prev = None;
    for ch in pattern.chars() {
        match (prev, ch) {
            (Some('*'), '*') => continue,
            (Some('['), '^') => rewritten.push('!'),
            _ => rewritten.push(ch),
        }
        prev = Some(ch);
    }
    Pattern::new(&rewritten).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_pattern_kept_verbatim() {
        for raw in ["*.log", "target", "src/*.rs", "file?.txt", "[ab]c"] {
            let rule = Rule::parse_line(raw).unwrap();
            assert_eq!(rule.pattern, raw);
            assert!(!rule.is_negation);
            assert!(!rule.is_directory_only);
        }
    }

    #[test]
    fn test_negation_prefix_stripped() {
        let rule = Rule::parse_line("!important.log").unwrap();
        assert!(rule.is_negation);
        assert!(!rule.is_directory_only);
        assert_eq!(rule.pattern, "important.log");
    }

    #[test]
    fn test_directory_suffix_stripped() {
        let rule = Rule::parse_line("node_modules/").unwrap();
        assert!(rule.is_directory_only);
        assert!(!rule.is_negation);
        assert_eq!(rule.pattern, "node_modules");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let rule = Rule::parse_line("   build/  \t").unwrap();
        assert_eq!(rule.pattern, "build");
        assert!(rule.is_directory_only);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        assert!(Rule::parse_line("").is_none());
        assert!(Rule::parse_line("   ").is_none());
        assert!(Rule::parse_line("\t\t").is_none());
        assert!(Rule::parse_line("# comment").is_none());
        assert!(Rule::parse_line("    # indented comment").is_none());
    }

    #[test]
    fn test_parse_preserves_order() {
        let source = "# header\n*.log\n*.tmp\n!important.log\n\nbuild/\nnode_modules/\n";
        let rules = parse(source.lines());
        let patterns: Vec<_> = rules.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            ["*.log", "*.tmp", "important.log", "build", "node_modules"]
        );
        assert!(rules[2].is_negation);
        assert!(rules[3].is_directory_only);
        assert!(rules[4].is_directory_only);
    }

    #[test]
    fn test_star_stays_within_segment() {
        let rule = Rule::new("src/*.rs", false, false);
        assert!(rule.matches("src/main.rs"));
        assert!(!rule.matches("src/bin/main.rs"));
    }

    #[test]
    fn test_question_mark_and_classes() {
        let rule = Rule::new("file?.txt", false, false);
        assert!(rule.matches("file1.txt"));
        assert!(!rule.matches("file12.txt"));

        let rule = Rule::new("[abc].txt", false, false);
        assert!(rule.matches("a.txt"));
        assert!(!rule.matches("d.txt"));
    }

    #[test]
    fn test_literal_pattern_needs_exact_segment() {
        let rule = Rule::new("build", false, false);
        assert!(rule.matches_path("build"));
        assert!(rule.matches_path("src/build"));
        assert!(!rule.matches_path("builds"));
        assert!(!rule.matches_path("src/rebuild"));
    }

    #[test]
    fn test_suffix_matching_at_any_depth() {
        let rule = Rule::new("test_*", false, false);
        assert!(rule.matches_path("src/sub/test_file.go"));
        assert!(!rule.matches_path("src/sub/file_test.go"));

        let rule = Rule::new("sub/*.go", false, false);
        assert!(rule.matches_path("src/sub/main.go"));
    }

    #[test]
    fn test_double_star_is_not_recursive() {
        let rule = Rule::new("src/**/gen", false, false);
        assert!(rule.is_valid());
        assert!(rule.matches("src/a/gen"));
        assert!(!rule.matches("src/a/b/gen"));
    }

    #[test]
    fn test_caret_negates_class() {
        let rule = Rule::new("[^a].txt", false, false);
        assert!(rule.matches("b.txt"));
        assert!(!rule.matches("a.txt"));

        let bang = Rule::new("[!a].txt", false, false);
        assert!(bang.matches("b.txt"));
        assert!(!bang.matches("a.txt"));
        assert_eq!(rule.pattern, "[^a].txt");
    }

    #[test]
    fn test_unterminated_class_never_matches() {
        let rule = Rule::new("[abc", false, false);
        assert!(!rule.is_valid());
        assert!(!rule.matches_path("a"));
        assert!(!rule.matches_path("dir/a"));
    }
}
