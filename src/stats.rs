//! Scan statistics collection and display
//!
//! Counts directories and files, sizes, text/binary split, an estimated
//! token count for the emitted content, an optional per-language
//! breakdown and optional advanced figures (average size, top extensions,
//! size buckets, modification ages).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::LazyLock;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Local};
use regex::Regex;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::error::{Error, Result};
use crate::file_utils::extension;
use crate::language::Language;

const MB: f64 = 1024.0 * 1024.0;

const KB: u64 = 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bounds (exclusive) and labels of the file size buckets. The last
/// bucket is open ended.
pub const SIZE_BUCKETS: [(u64, &str); 6] = [
    (KB, "0-1KB"),
    (10 * KB, "1KB-10KB"),
    (100 * KB, "10KB-100KB"),
    (KB * KB, "100KB-1MB"),
    (10 * KB * KB, "1MB-10MB"),
    (u64::MAX, "10MB+"),
];

/// Number of extensions listed by the advanced statistics.
pub const TOP_EXTENSIONS: usize = 10;

static CODE_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[{}()\[\];,.:+\-*/=<>!&|%^~]").expect("CODE_SYMBOL regex is invalid")
});
static DATA_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[{}\[\]",:]"#).expect("DATA_SYNTAX regex is invalid"));

/// Collected statistics about a scan.
#[derive(Debug, Clone, Default)]
pub struct CodebaseStats {
    pub files: usize,
    pub directories: usize,
    pub total_size: u64,
    pub text_files: usize,
    pub binary_files: usize,
    pub estimated_tokens: usize,
    pub processing_time: Duration,
    /// Empty unless the language breakdown was requested.
    pub by_language: Vec<LanguageStats>,
    /// Only filled when advanced statistics were requested.
    pub advanced: Option<AdvancedStats>,
}

impl CodebaseStats {
    pub fn average_file_size(&self) -> f64 {
        if self.files == 0 {
            return 0.0;
        }
        self.total_size as f64 / self.files as f64
    }
}

/// Size and age figures over the recorded files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedStats {
    /// Most common extensions, by file count.
    pub top_extensions: Vec<ExtensionStats>,
    /// File counts per [`SIZE_BUCKETS`] entry.
    pub size_distribution: [usize; SIZE_BUCKETS.len()],
    pub modified: ModificationStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionStats {
    pub extension: String,
    pub files: usize,
    pub size: u64,
}

/// Files bucketed by the age of their last modification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModificationStats {
    pub last_24_hours: usize,
    pub last_week: usize,
    pub last_month: usize,
    pub last_year: usize,
    pub older: usize,
    pub oldest: Option<SystemTime>,
    pub newest: Option<SystemTime>,
}

impl ModificationStats {
    fn record(&mut self, modified: SystemTime, now: SystemTime) {
        // Timestamps in the future count as fresh.
        let age = now.duration_since(modified).unwrap_or_default();
        if age < DAY {
            self.last_24_hours += 1;
        } else if age < DAY * 7 {
            self.last_week += 1;
        } else if age < DAY * 30 {
            self.last_month += 1;
        } else if age < DAY * 365 {
            self.last_year += 1;
        } else {
            self.older += 1;
        }

        if self.oldest.is_none_or(|oldest| modified < oldest) {
            self.oldest = Some(modified);
        }
        if self.newest.is_none_or(|newest| modified > newest) {
            self.newest = Some(modified);
        }
    }
}

/// Index into [`SIZE_BUCKETS`] for a file of `size` bytes.
pub fn size_bucket(size: u64) -> usize {
    SIZE_BUCKETS
        .iter()
        .position(|&(limit, _)| size < limit)
        .unwrap_or(SIZE_BUCKETS.len() - 1)
}

/// Statistics for a single language.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageStats {
    pub language: String,
    pub files: usize,
    pub size: u64,
    /// Share of the files that have an extension.
    pub percentage: f64,
    pub extensions: Vec<String>,
}

/// Configuration for statistics collection.
#[derive(Debug, Clone, Default)]
pub struct StatsConfig {
    /// Group files by language
    pub language_stats: bool,
    /// Extension ranking, size buckets and modification ages
    pub advanced: bool,
}

#[derive(Debug, Default)]
struct LanguageEntry {
    files: usize,
    size: u64,
    extensions: BTreeSet<String>,
}

/// Statistics collector that accumulates data while files are emitted.
#[derive(Debug)]
pub struct StatsCollector {
    config: StatsConfig,
    started: Instant,
    stats: CodebaseStats,
    by_language: BTreeMap<&'static str, LanguageEntry>,
    by_extension: BTreeMap<String, (usize, u64)>,
    size_distribution: [usize; SIZE_BUCKETS.len()],
    modified: ModificationStats,
}

impl StatsCollector {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
            stats: CodebaseStats::default(),
            by_language: BTreeMap::new(),
            by_extension: BTreeMap::new(),
            size_distribution: [0; SIZE_BUCKETS.len()],
            modified: ModificationStats::default(),
        }
    }

    pub fn record_directories(&mut self, count: usize) {
        self.stats.directories += count;
    }

    /// Record a file. Text files also contribute to the token estimate.
    pub fn record_file(&mut self, path: &Path, is_text: bool) -> Result<()> {
        let meta = path.metadata().map_err(|e| Error::io(path, e))?;
        let size = meta.len();

        self.stats.files += 1;
        self.stats.total_size += size;
        if is_text {
            self.stats.text_files += 1;
            self.stats.estimated_tokens += estimate_tokens(path).unwrap_or((size / 4) as usize);
        } else {
            self.stats.binary_files += 1;
        }

        if self.config.advanced {
            self.size_distribution[size_bucket(size)] += 1;
            if let Ok(modified) = meta.modified() {
                self.modified.record(modified, SystemTime::now());
            }
            if let Some(ext) = extension(path) {
                let entry = self.by_extension.entry(ext).or_default();
                entry.0 += 1;
                entry.1 += size;
            }
        }

        if self.config.language_stats {
            if let Some(ext) = extension(path) {
                let name = Language::from_extension(&ext).map_or("Other", |lang| lang.name());
                let entry = self.by_language.entry(name).or_default();
                entry.files += 1;
                entry.size += size;
                entry.extensions.insert(ext);
            }
        }
        Ok(())
    }

    /// Time since the collector was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Snapshot of the statistics so far.
    pub fn snapshot(&self) -> CodebaseStats {
        let with_extension: usize = self.by_language.values().map(|e| e.files).sum();

        let mut languages: Vec<LanguageStats> = self
            .by_language
            .iter()
            .map(|(name, entry)| LanguageStats {
                language: name.to_string(),
                files: entry.files,
                size: entry.size,
                percentage: entry.files as f64 / with_extension as f64 * 100.0,
                extensions: entry.extensions.iter().cloned().collect(),
            })
            .collect();
        // Stable sort keeps the name order among equal counts.
        languages.sort_by(|a, b| b.files.cmp(&a.files));

        CodebaseStats {
            processing_time: self.elapsed(),
            by_language: languages,
            advanced: self.config.advanced.then(|| self.advanced()),
            ..self.stats.clone()
        }
    }

    fn advanced(&self) -> AdvancedStats {
        let mut top_extensions: Vec<ExtensionStats> = self
            .by_extension
            .iter()
            .map(|(ext, &(files, size))| ExtensionStats {
                extension: ext.clone(),
                files,
                size,
            })
            .collect();
        top_extensions.sort_by(|a, b| b.files.cmp(&a.files));
        top_extensions.truncate(TOP_EXTENSIONS);

        AdvancedStats {
            top_extensions,
            size_distribution: self.size_distribution,
            modified: self.modified.clone(),
        }
    }
}

/// Estimate the number of LLM tokens in a text file.
pub fn estimate_tokens(path: &Path) -> io::Result<usize> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(estimate_content_tokens(
        extension(path).as_deref().unwrap_or_default(),
        &content,
    ))
}

/// Language-aware token heuristic over the lines of `content`.
pub fn estimate_content_tokens(ext: &str, content: &str) -> usize {
    match ext {
        "go" | "java" | "c" | "cpp" | "cc" | "cxx" | "h" | "hpp" => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with("/*"))
            .map(code_line_tokens)
            .sum(),
        "js" | "ts" | "py" | "rb" | "php" | "cs" | "kt" | "swift" | "rs" => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
            .map(code_line_tokens)
            .sum(),
        "json" | "xml" | "yaml" | "yml" | "toml" => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(data_line_tokens)
            .sum(),
        "md" | "txt" | "rst" => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(text_line_tokens)
            .sum(),
        _ => content.lines().map(|l| l.len() / 4).sum(),
    }
}

fn code_line_tokens(line: &str) -> usize {
    let line = line.split("//").next().unwrap_or_default();
    let line = line.split('#').next().unwrap_or_default();
    let words = line.split_whitespace().count();
    let symbols = CODE_SYMBOL.find_iter(line).count();
    (words as f64 * 1.3 + symbols as f64 * 0.5) as usize
}

fn data_line_tokens(line: &str) -> usize {
    let cleaned = DATA_SYNTAX.replace_all(line, " ");
    (cleaned.split_whitespace().count() as f64 * 1.1) as usize
}

fn text_line_tokens(line: &str) -> usize {
    let words = line
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|w| !w.is_empty())
        .count();
    (words as f64 * 1.3) as usize
}

/// Print statistics, with the language breakdown when it was collected.
pub fn print_stats<W: WriteColor>(out: &mut W, stats: &CodebaseStats) -> io::Result<()> {
    let mut bold = ColorSpec::new();
    bold.set_bold(true);

    writeln!(out)?;
    out.set_color(&bold)?;
    writeln!(out, "Statistics:")?;
    out.reset()?;
    writeln!(out, "  Total files: {}", stats.files)?;
    writeln!(out, "  Total directories: {}", stats.directories)?;
    writeln!(out, "  Total size: {:.1}MB", stats.total_size as f64 / MB)?;
    writeln!(out, "  Text files: {}", stats.text_files)?;
    writeln!(out, "  Binary files: {}", stats.binary_files)?;
    writeln!(
        out,
        "  Estimated tokens: ~{}",
        format_number(stats.estimated_tokens)
    )?;
    writeln!(
        out,
        "  Processing time: {}",
        format_elapsed(stats.processing_time)
    )?;

    if let Some(advanced) = &stats.advanced {
        print_advanced(out, stats, advanced, &bold)?;
    }

    if stats.by_language.is_empty() {
        return Ok(());
    }

    let mut lang_color = ColorSpec::new();
    lang_color.set_fg(Some(Color::Cyan));

    writeln!(out)?;
    out.set_color(&bold)?;
    writeln!(out, "Language Distribution:")?;
    out.reset()?;
    for lang in &stats.by_language {
        write!(out, "  ")?;
        out.set_color(&lang_color)?;
        write!(out, "{:<12}", lang.language)?;
        out.reset()?;
        writeln!(
            out,
            "{:>4} files ({:.1}%) - {:.2} KB",
            lang.files,
            lang.percentage,
            lang.size as f64 / 1024.0
        )?;
    }

    writeln!(out)?;
    out.set_color(&bold)?;
    writeln!(out, "File Extensions by Language:")?;
    out.reset()?;
    for lang in &stats.by_language {
        writeln!(out, "  {}: {}", lang.language, lang.extensions.join(", "))?;
    }
    Ok(())
}

fn print_advanced<W: WriteColor>(
    out: &mut W,
    stats: &CodebaseStats,
    advanced: &AdvancedStats,
    bold: &ColorSpec,
) -> io::Result<()> {
    writeln!(
        out,
        "  Average file size: {:.2} KB",
        stats.average_file_size() / 1024.0
    )?;

    if !advanced.top_extensions.is_empty() {
        writeln!(out)?;
        out.set_color(bold)?;
        writeln!(out, "Top Extensions:")?;
        out.reset()?;
        for ext in &advanced.top_extensions {
            writeln!(
                out,
                "  .{:<10}{:>4} files - {:.2} KB",
                ext.extension,
                ext.files,
                ext.size as f64 / 1024.0
            )?;
        }
    }

    writeln!(out)?;
    out.set_color(bold)?;
    writeln!(out, "File Size Distribution:")?;
    out.reset()?;
    for (&(_, label), count) in SIZE_BUCKETS.iter().zip(advanced.size_distribution) {
        writeln!(out, "  {:<12}{:>4}", label, count)?;
    }

    let modified = &advanced.modified;
    writeln!(out)?;
    out.set_color(bold)?;
    writeln!(out, "Last Modified:")?;
    out.reset()?;
    writeln!(out, "  Last 24 hours: {}", modified.last_24_hours)?;
    writeln!(out, "  Last week: {}", modified.last_week)?;
    writeln!(out, "  Last month: {}", modified.last_month)?;
    writeln!(out, "  Last year: {}", modified.last_year)?;
    writeln!(out, "  Older: {}", modified.older)?;
    if let (Some(oldest), Some(newest)) = (modified.oldest, modified.newest) {
        writeln!(out, "  Oldest file: {}", format_timestamp(oldest))?;
        writeln!(out, "  Newest file: {}", format_timestamp(newest))?;
    }
    Ok(())
}

fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Millisecond-rounded human-readable duration.
pub fn format_elapsed(elapsed: Duration) -> String {
    let rounded = Duration::from_millis(elapsed.as_millis() as u64);
    if rounded.is_zero() {
        return "<1ms".to_string();
    }
    humantime::format_duration(rounded).to_string()
}

/// Format a number with thousand separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
