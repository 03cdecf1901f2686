//! Markdown output formatting
//!
//! Produces a document suitable for pasting into an LLM conversation: the
//! tree in a fenced block, then one heading and code block per file.

use std::io::{self, Write};

use crate::git::GitInfo;
use crate::language::fence_tag;

use super::{ContentOutput, FileEntry, ScanSummary};

pub struct MarkdownOutput {
    line_numbers: bool,
}

impl MarkdownOutput {
    pub fn new(line_numbers: bool) -> Self {
        Self { line_numbers }
    }
}

impl ContentOutput for MarkdownOutput {
    fn begin(
        &mut self,
        out: &mut dyn Write,
        tree: &str,
        git: Option<&GitInfo>,
    ) -> io::Result<()> {
        writeln!(out, "# Project Structure")?;
        writeln!(out)?;
        if let Some(git) = git {
            writeln!(out, "## Git Information")?;
            writeln!(out)?;
            writeln!(out, "- **Branch:** {}", git.branch)?;
            writeln!(out, "- **Commit:** `{}`", git.commit_hash)?;
            writeln!(out, "- **Author:** {}", git.author)?;
            writeln!(out, "- **Commit date:** {}", git.commit_date.to_rfc3339())?;
            writeln!(out, "- **State:** {}", git.state())?;
            if !git.repository_url.is_empty() {
                writeln!(out, "- **Remote:** {}", git.repository_url)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "## Directory Tree")?;
        writeln!(out, "```")?;
        writeln!(out, "{}", tree)?;
        writeln!(out, "```")?;
        writeln!(out)?;
        writeln!(out, "## Files")
    }

    fn begin_file(&mut self, out: &mut dyn Write, file: &FileEntry) -> io::Result<()> {
        writeln!(out, "\n### {}", file.relative)?;
        writeln!(out, "```{}", fence_tag(file.extension.as_deref()))
    }

    fn line(&mut self, out: &mut dyn Write, number: usize, line: &str) -> io::Result<()> {
        if self.line_numbers {
            writeln!(out, "{} | {}", number, line)
        } else {
            writeln!(out, "{}", line)
        }
    }

    fn skipped(&mut self, out: &mut dyn Write, reason: &str) -> io::Result<()> {
        writeln!(out, "{}", reason)
    }

    fn truncated(&mut self, out: &mut dyn Write, message: &str) -> io::Result<()> {
        writeln!(out, "{}", message)
    }

    fn end_file(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "```")
    }

    fn finish(&mut self, _out: &mut dyn Write, _summary: &ScanSummary) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_document_shape() {
        let mut out = Vec::new();
        let mut md = MarkdownOutput::new(true);
        md.begin(&mut out, "└── main.rs\n", None).unwrap();
        let file = FileEntry {
            path: Path::new("/p/main.rs"),
            relative: "main.rs",
            size: 12,
            extension: Some("rs".to_string()),
            line_count: 1,
            ends_with_newline: true,
        };
        md.begin_file(&mut out, &file).unwrap();
        md.line(&mut out, 1, "fn main() {}").unwrap();
        md.end_file(&mut out).unwrap();

        let expected = "\
# Project Structure

## Directory Tree
```
└── main.rs

```

## Files

### main.rs
```rust
1 | fn main() {}
```
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_file_without_extension() {
        let mut out = Vec::new();
        let mut md = MarkdownOutput::new(false);
        let file = FileEntry {
            path: Path::new("/p/Makefile"),
            relative: "Makefile",
            size: 0,
            extension: None,
            line_count: 0,
            ends_with_newline: false,
        };
        md.begin_file(&mut out, &file).unwrap();
        md.line(&mut out, 1, "all:").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n### Makefile\n```\nall:\n");
    }
}
