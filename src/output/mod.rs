//! Document output
//!
//! `Formatter` drives a format-specific `ContentOutput`: it writes the
//! tree header, streams every selected file line by line, applies the size
//! limits and closes the document.
//!
//! # Module Structure
//!
//! - `config` - Output configuration and format selection
//! - `text` - Plain text with dashed file separators
//! - `markdown` - Headings and fenced code blocks
//! - `html` - Self-contained page with inline CSS
//! - `json` - Single JSON document written at the end

mod config;
mod html;
mod json;
mod markdown;
mod text;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::file_utils::{extension, scan_lines};
use crate::git::GitInfo;
use crate::limits::{FileSize, SizeLimiter};
use crate::stats::CodebaseStats;

pub use config::{OutputConfig, OutputFormat};
pub use html::{HtmlOutput, escape_html};
pub use json::{JsonOutput, ScanOptions};
pub use markdown::MarkdownOutput;
pub use text::TextOutput;

/// A file about to be emitted.
#[derive(Debug, Clone)]
pub struct FileEntry<'a> {
    pub path: &'a Path,
    /// Root-relative path with `/` separators.
    pub relative: &'a str,
    pub size: u64,
    pub extension: Option<String>,
    pub line_count: usize,
    pub ends_with_newline: bool,
}

/// Run-level data that is only known once every file has been handled.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub target_directory: String,
    /// Snapshot of the run's `StatsCollector`.
    pub stats: CodebaseStats,
}

/// Events emitted by `Formatter`, rendered in one output format.
///
/// For a file the sequence is `begin_file`, then `line` calls or a single
/// `skipped`, an optional `truncated`, then `end_file`.
pub trait ContentOutput {
    fn begin(&mut self, out: &mut dyn Write, tree: &str, git: Option<&GitInfo>)
    -> io::Result<()>;

    fn begin_file(&mut self, out: &mut dyn Write, file: &FileEntry) -> io::Result<()>;

    /// One line of content without its terminator. `number` is 1-based.
    fn line(&mut self, out: &mut dyn Write, number: usize, line: &str) -> io::Result<()>;

    /// The file was not emitted, `reason` says why.
    fn skipped(&mut self, out: &mut dyn Write, reason: &str) -> io::Result<()>;

    /// The total limit was hit inside this file.
    fn truncated(&mut self, out: &mut dyn Write, message: &str) -> io::Result<()>;

    fn end_file(&mut self, out: &mut dyn Write) -> io::Result<()>;

    fn finish(&mut self, out: &mut dyn Write, summary: &ScanSummary) -> io::Result<()>;
}

/// What happened to a file handed to [`Formatter::write_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Written,
    TooLarge(u64),
    /// The total limit was reached while writing this file.
    Truncated,
    /// The total limit had already been reached; nothing was written.
    LimitReached,
}

pub struct Formatter<W: Write> {
    out: W,
    renderer: Box<dyn ContentOutput>,
    limiter: SizeLimiter,
}

impl<W: Write> Formatter<W> {
    pub fn new(out: W, config: &OutputConfig, limiter: SizeLimiter) -> Self {
        let renderer: Box<dyn ContentOutput> = match config.format {
            OutputFormat::Text => Box::new(TextOutput::new(config.line_numbers)),
            OutputFormat::Markdown => Box::new(MarkdownOutput::new(config.line_numbers)),
            OutputFormat::Html => Box::new(HtmlOutput::new(config.line_numbers)),
            OutputFormat::Json => Box::new(JsonOutput::new(config.options.clone())),
        };
        Self::with_renderer(out, renderer, limiter)
    }

    pub fn with_renderer(out: W, renderer: Box<dyn ContentOutput>, limiter: SizeLimiter) -> Self {
        Self {
            out,
            renderer,
            limiter,
        }
    }

    pub fn write_header(&mut self, tree: &str, git: Option<&GitInfo>) -> Result<()> {
        self.renderer.begin(&mut self.out, tree, git)?;
        Ok(())
    }

    /// Emit one file.
    ///
    /// The file is read twice through one handle: a chunked pass for the
    /// line count, then one line at a time for the content. A file that
    /// cannot be opened or scanned yields `Error::Io` before anything is
    /// written, so the caller can report it and move on.
    pub fn write_file(&mut self, path: &Path, relative: &str) -> Result<FileOutcome> {
        if self.limiter.is_exhausted() {
            return Ok(FileOutcome::LimitReached);
        }

        let size = match self.limiter.check_file(path)? {
            FileSize::TooLarge(size) => {
                let entry = FileEntry {
                    path,
                    relative,
                    size,
                    extension: extension(path),
                    line_count: 0,
                    ends_with_newline: false,
                };
                let message = self.limiter.file_too_large_message(size);
                self.renderer.begin_file(&mut self.out, &entry)?;
                self.renderer.skipped(&mut self.out, &message)?;
                self.renderer.end_file(&mut self.out)?;
                return Ok(FileOutcome::TooLarge(size));
            }
            FileSize::Within(size) => size,
        };

        let mut reader = File::open(path)
            .map(BufReader::new)
            .map_err(|e| Error::io(path, e))?;
        let (line_count, ends_with_newline) =
            scan_lines(&mut reader).map_err(|e| Error::io(path, e))?;
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(path, e))?;

        let entry = FileEntry {
            path,
            relative,
            size,
            extension: extension(path),
            line_count,
            ends_with_newline,
        };

        self.renderer.begin_file(&mut self.out, &entry)?;
        let mut outcome = FileOutcome::Written;
        let mut buf = Vec::new();
        let mut number = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| Error::io(path, e))?;
            if read == 0 {
                break;
            }
            number += 1;
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            let line = String::from_utf8_lossy(&buf);

            if !self.limiter.try_consume(line.len() as u64 + 1) {
                let message = self.limiter.truncated_message();
                self.renderer.truncated(&mut self.out, &message)?;
                outcome = FileOutcome::Truncated;
                break;
            }
            self.renderer.line(&mut self.out, number, &line)?;
        }
        self.renderer.end_file(&mut self.out)?;
        Ok(outcome)
    }

    pub fn is_truncated(&self) -> bool {
        self.limiter.is_exhausted()
    }

    /// Close the document and hand back the writer, flushed.
    pub fn finish(mut self, summary: &ScanSummary) -> Result<W> {
        self.renderer.finish(&mut self.out, summary)?;
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn render(config: &OutputConfig, limiter: SizeLimiter, files: &[(&str, &str)]) -> String {
        let dir = TempDir::new().unwrap();
        let mut formatter = Formatter::new(Vec::new(), config, limiter);
        formatter.write_header("└── a.txt\n", None).unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            formatter.write_file(&path, name).unwrap();
        }
        let out = formatter.finish(&ScanSummary::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_document() {
        let out = render(
            &OutputConfig::default(),
            SizeLimiter::unlimited(),
            &[("a.txt", "hello\nworld\n")],
        );
        let dashes = "-".repeat(80);
        assert_eq!(
            out,
            format!("└── a.txt\n\n\na.txt:\n{}\n 1 | hello\n 2 | world\n", dashes)
        );
    }

    #[test]
    fn test_lines_streamed_without_trailing_newline() {
        let out = render(
            &OutputConfig::default(),
            SizeLimiter::unlimited(),
            &[("a.txt", "one\r\ntwo")],
        );
        assert!(out.ends_with(" 1 | one\n 2 | two\n"), "{}", out);

        let json = render(
            &OutputConfig {
                format: OutputFormat::Json,
                ..Default::default()
            },
            SizeLimiter::unlimited(),
            &[("a.txt", "one\ntwo")],
        );
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["files"][0]["content"], "one\ntwo");
        assert_eq!(doc["files"][0]["line_count"], 2);
    }

    #[test]
    fn test_invalid_utf8_replaced_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mixed.txt");
        fs::write(&path, b"ok\nbad \xff byte\nok again\n").unwrap();

        let mut formatter = Formatter::new(
            Vec::new(),
            &OutputConfig::default(),
            SizeLimiter::unlimited(),
        );
        formatter.write_file(&path, "mixed.txt").unwrap();
        let out = String::from_utf8(formatter.finish(&ScanSummary::default()).unwrap()).unwrap();

        assert!(out.contains(" 1 | ok\n"));
        assert!(out.contains(" 2 | bad \u{fffd} byte\n"));
        assert!(out.contains(" 3 | ok again\n"));
    }

    #[test]
    fn test_total_limit_truncates_once() {
        // "abc\n" is 4 characters, the limit allows two lines.
        let out = render(
            &OutputConfig::default(),
            SizeLimiter::new(0, 8),
            &[("a.txt", "abc\nabc\nabc\n"), ("b.txt", "never\n")],
        );

        assert_eq!(out.matches(" | abc").count(), 2);
        assert_eq!(
            out.matches("[Output truncated: reached character limit of 8]")
                .count(),
            1
        );
        assert!(!out.contains("b.txt"));
    }

    #[test]
    fn test_file_too_large_in_every_format() {
        for format in [
            OutputFormat::Text,
            OutputFormat::Markdown,
            OutputFormat::Html,
            OutputFormat::Json,
        ] {
            let config = OutputConfig {
                format,
                ..Default::default()
            };
            let out = render(
                &config,
                SizeLimiter::new(4, 0),
                &[("big.txt", "too much content\n")],
            );
            assert!(out.contains("File too large"), "{:?}: {}", format, out);
            assert!(!out.contains("too much content"), "{:?}", format);
        }
    }

    #[test]
    fn test_unreadable_file_writes_nothing() {
        let mut formatter = Formatter::new(
            Vec::new(),
            &OutputConfig::default(),
            SizeLimiter::unlimited(),
        );
        let err = formatter
            .write_file(Path::new("/nonexistent/file.txt"), "file.txt")
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));

        let out = formatter.finish(&ScanSummary::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_limit_reached_outcome() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "0123456789\n").unwrap();
        fs::write(&b, "x\n").unwrap();

        let mut formatter = Formatter::new(
            Vec::new(),
            &OutputConfig::default(),
            SizeLimiter::new(0, 5),
        );
        assert_eq!(
            formatter.write_file(&a, "a.txt").unwrap(),
            FileOutcome::Truncated
        );
        assert!(formatter.is_truncated());
        assert_eq!(
            formatter.write_file(&b, "b.txt").unwrap(),
            FileOutcome::LimitReached
        );
    }
}
