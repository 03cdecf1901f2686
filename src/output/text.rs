//! Plain text output

use std::io::{self, Write};

use crate::git::GitInfo;

use super::{ContentOutput, FileEntry, ScanSummary};

const SEPARATOR_WIDTH: usize = 80;

/// Tree, then each file under a dashed header.
pub struct TextOutput {
    line_numbers: bool,
}

impl TextOutput {
    pub fn new(line_numbers: bool) -> Self {
        Self { line_numbers }
    }
}

/// Git metadata block shared by the text-like formats.
pub(super) fn write_git_info(out: &mut dyn Write, git: &GitInfo) -> io::Result<()> {
    writeln!(out, "Git Repository Information:")?;
    writeln!(out, "  Branch: {}", git.branch)?;
    writeln!(out, "  Commit: {}", git.commit_hash)?;
    writeln!(out, "  Author: {}", git.author)?;
    writeln!(out, "  Commit date: {}", git.commit_date.to_rfc3339())?;
    writeln!(out, "  Repository state: {}", git.state())?;
    if !git.repository_url.is_empty() {
        writeln!(out, "  Remote: {}", git.repository_url)?;
    }
    Ok(())
}

impl ContentOutput for TextOutput {
    fn begin(
        &mut self,
        out: &mut dyn Write,
        tree: &str,
        git: Option<&GitInfo>,
    ) -> io::Result<()> {
        if let Some(git) = git {
            write_git_info(out, git)?;
            writeln!(out)?;
        }
        writeln!(out, "{}", tree)
    }

    fn begin_file(&mut self, out: &mut dyn Write, file: &FileEntry) -> io::Result<()> {
        writeln!(out, "\n{}:", file.relative)?;
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))
    }

    fn line(&mut self, out: &mut dyn Write, number: usize, line: &str) -> io::Result<()> {
        if self.line_numbers {
            writeln!(out, "{:>2} | {}", number, line)
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

    fn end_file(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, _out: &mut dyn Write, _summary: &ScanSummary) -> io::Result<()> {
        Ok(())
    }
}
