//! Line classification and complexity scoring

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use termcolor::{ColorSpec, WriteColor};
use tracing::debug;

use crate::error::{Error, Result};
use crate::file_utils::{extension, is_text_file};
use crate::gitignore::normalize;

use super::{percent, walk};

/// Files longer than this are listed as complex.
pub const COMPLEX_FILE_LINES: usize = 300;
/// Files scoring above this are listed as complex.
pub const COMPLEX_FILE_SCORE: f64 = 20.0;

static CONTROL_FLOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(if|for|while|switch|match)\s+.*\{").expect("CONTROL_FLOW regex is invalid")
});
static FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(pub(\([^)]*\))?\s+)?(async\s+)?(func|fn|def|function)\s+\w+")
        .expect("FUNCTION_DECL regex is invalid")
});

/// Comment markers for one extension.
#[derive(Debug, Clone, Copy, Default)]
struct CommentSyntax {
    line: Option<&'static str>,
    block: Option<(&'static str, &'static str)>,
}

impl CommentSyntax {
    fn for_extension(ext: &str) -> Self {
        match ext {
            "go" | "c" | "h" | "cpp" | "hpp" | "java" | "js" | "ts" | "cs" | "php" | "swift"
            | "rs" | "kt" | "scala" => Self {
                line: Some("//"),
                block: Some(("/*", "*/")),
            },
            "py" | "rb" | "sh" | "bash" | "zsh" | "toml" | "yaml" | "yml" => Self {
                line: Some("#"),
                block: None,
            },
            "sql" => Self {
                line: Some("--"),
                block: Some(("/*", "*/")),
            },
            "html" | "htm" | "xml" => Self {
                line: None,
                block: Some(("<!--", "-->")),
            },
            _ => Self::default(),
        }
    }
}

/// Counts for a single file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMetrics {
    pub lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// +1 per line opening a control flow block, +0.5 per function
    /// declaration.
    pub score: f64,
}

impl FileMetrics {
    pub fn is_complex(&self) -> bool {
        self.lines > COMPLEX_FILE_LINES || self.score > COMPLEX_FILE_SCORE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexFile {
    pub path: String,
    pub lines: usize,
    pub score: f64,
}

/// Totals for one extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionMetrics {
    pub extension: String,
    pub files: usize,
    pub lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// Share of the analyzed files.
    pub percentage: f64,
}

/// Result of [`analyze_complexity`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexityAnalysis {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// Code lines as a percentage of all lines.
    pub code_density: f64,
    pub complex_files: Vec<ComplexFile>,
    /// Sorted by file count, then by extension.
    pub by_extension: Vec<ExtensionMetrics>,
}

/// Classify every line read from `reader`.
///
/// A line inside or opening a block comment is a comment line; a line
/// starting with the line marker is a comment line; anything else that is
/// not blank is code and feeds the score.
pub fn analyze_lines<R: BufRead>(mut reader: R, ext: &str) -> io::Result<FileMetrics> {
    let syntax = CommentSyntax::for_extension(ext);
    let mut metrics = FileMetrics::default();
    let mut in_block = false;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim();
        metrics.lines += 1;

        if trimmed.is_empty() {
            metrics.blank_lines += 1;
            continue;
        }

        if let Some((open, close)) = syntax.block {
            if in_block {
                metrics.comment_lines += 1;
                in_block = !trimmed.contains(close);
                continue;
            }
            if let Some(start) = trimmed.find(open) {
                metrics.comment_lines += 1;
                in_block = !trimmed[start + open.len()..].contains(close);
                continue;
            }
        }

        if syntax.line.is_some_and(|marker| trimmed.starts_with(marker)) {
            metrics.comment_lines += 1;
            continue;
        }

        metrics.code_lines += 1;
        if CONTROL_FLOW.is_match(&line) {
            metrics.score += 1.0;
        }
        if FUNCTION_DECL.is_match(&line) {
            metrics.score += 0.5;
        }
    }
    Ok(metrics)
}

pub fn analyze_file(path: &Path) -> io::Result<FileMetrics> {
    let reader = BufReader::new(File::open(path)?);
    analyze_lines(reader, extension(path).as_deref().unwrap_or_default())
}

/// Analyze every text file with an extension under `root`. Unreadable
/// files are logged and left out.
pub fn analyze_complexity(root: &Path) -> Result<ComplexityAnalysis> {
    let mut analysis = ComplexityAnalysis::default();
    let mut by_extension: BTreeMap<String, ExtensionMetrics> = BTreeMap::new();

    for entry in walk(root) {
        let entry = entry.map_err(|e| Error::Walk(e.to_string()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let Some(ext) = extension(path) else {
            continue;
        };
        if !is_text_file(path).unwrap_or(false) {
            continue;
        }

        let relative = normalize(root, path).unwrap_or_else(|| path.display().to_string());
        let metrics = match analyze_file(path) {
            Ok(metrics) => metrics,
            Err(e) => {
                debug!("failed to analyze {}: {}", relative, e);
                continue;
            }
        };

        analysis.total_lines += metrics.lines;
        analysis.code_lines += metrics.code_lines;
        analysis.comment_lines += metrics.comment_lines;
        analysis.blank_lines += metrics.blank_lines;

        let totals = by_extension
            .entry(ext.clone())
            .or_insert_with(|| ExtensionMetrics {
                extension: ext,
                ..Default::default()
            });
        totals.files += 1;
        totals.lines += metrics.lines;
        totals.code_lines += metrics.code_lines;
        totals.comment_lines += metrics.comment_lines;
        totals.blank_lines += metrics.blank_lines;

        if metrics.is_complex() {
            analysis.complex_files.push(ComplexFile {
                path: relative,
                lines: metrics.lines,
                score: metrics.score,
            });
        }
    }

    analysis.code_density = percent(analysis.code_lines, analysis.total_lines);

    let files: usize = by_extension.values().map(|m| m.files).sum();
    let mut by_extension: Vec<ExtensionMetrics> = by_extension
        .into_values()
        .map(|mut m| {
            m.percentage = percent(m.files, files);
            m
        })
        .collect();
    by_extension.sort_by(|a, b| b.files.cmp(&a.files));
    analysis.by_extension = by_extension;

    Ok(analysis)
}

pub fn print_complexity<W: WriteColor>(
    out: &mut W,
    analysis: &ComplexityAnalysis,
) -> io::Result<()> {
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    let total = analysis.total_lines;

    writeln!(out)?;
    out.set_color(&bold)?;
    writeln!(out, "Complexity Analysis:")?;
    out.reset()?;
    writeln!(out, "  Total lines: {}", total)?;
    writeln!(
        out,
        "  Code lines: {} ({:.1}%)",
        analysis.code_lines,
        percent(analysis.code_lines, total)
    )?;
    writeln!(
        out,
        "  Comment lines: {} ({:.1}%)",
        analysis.comment_lines,
        percent(analysis.comment_lines, total)
    )?;
    writeln!(
        out,
        "  Blank lines: {} ({:.1}%)",
        analysis.blank_lines,
        percent(analysis.blank_lines, total)
    )?;
    writeln!(out, "  Code density: {:.1}%", analysis.code_density)?;

    if !analysis.by_extension.is_empty() {
        writeln!(out)?;
        out.set_color(&bold)?;
        writeln!(out, "Lines by Extension:")?;
        out.reset()?;
        for m in &analysis.by_extension {
            writeln!(
                out,
                "  {}: {} files ({:.1}%) - {} lines",
                m.extension, m.files, m.percentage, m.lines
            )?;
        }
    }

    if !analysis.complex_files.is_empty() {
        writeln!(out)?;
        out.set_color(&bold)?;
        writeln!(out, "Complex Files:")?;
        out.reset()?;
        for file in &analysis.complex_files {
            writeln!(
                out,
                "  {}: {} lines, complexity score: {:.1}",
                file.path, file.lines, file.score
            )?;
        }
    }
    Ok(())
}
