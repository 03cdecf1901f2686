//! Per-file and total output size limits

use std::path::Path;

use crate::error::{Error, Result};

/// Default per-file limit (1MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

const MB: f64 = 1024.0 * 1024.0;

/// Result of checking a file against the per-file limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSize {
    Within(u64),
    TooLarge(u64),
}

/// Tracks the per-file limit and the characters emitted so far.
///
/// A limit of zero disables that check.
#[derive(Debug, Clone)]
pub struct SizeLimiter {
    max_file_size: u64,
    max_total_size: u64,
    emitted: u64,
    exhausted: bool,
}

impl SizeLimiter {
    pub fn new(max_file_size: u64, max_total_size: u64) -> Self {
        Self {
            max_file_size,
            max_total_size,
            emitted: 0,
            exhausted: false,
        }
    }

    /// No per-file or total limit.
    pub fn unlimited() -> Self {
        Self::new(0, 0)
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn max_total_size(&self) -> u64 {
        self.max_total_size
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Whether the total limit has been hit.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn check_file(&self, path: &Path) -> Result<FileSize> {
        let size = path.metadata().map_err(|e| Error::io(path, e))?.len();
        Ok(self.check_size(size))
    }

    pub fn check_size(&self, size: u64) -> FileSize {
        if self.max_file_size > 0 && size > self.max_file_size {
            FileSize::TooLarge(size)
        } else {
            FileSize::Within(size)
        }
    }

    /// Account for `amount` more characters of output.
    ///
    /// Returns `false` once the running total would pass the limit; the
    /// limiter then stays exhausted and the characters are not counted.
    pub fn try_consume(&mut self, amount: u64) -> bool {
        if self.exhausted {
            return false;
        }
        if self.max_total_size > 0 && self.emitted + amount > self.max_total_size {
            self.exhausted = true;
            return false;
        }
        self.emitted += amount;
        true
    }

    pub fn truncated_message(&self) -> String {
        format!(
            "[Output truncated: reached character limit of {}]",
            self.max_total_size
        )
    }

    pub fn file_too_large_message(&self, size: u64) -> String {
        format!(
            "[File too large: {:.1}MB - skipped (max: {:.1}MB)]",
            size as f64 / MB,
            self.max_file_size as f64 / MB
        )
    }
}

impl Default for SizeLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE, 0)
    }
}

/// Parse a size like `500KB`, `1M` or `2048` into bytes.
///
/// Units are 1024-based and case insensitive: B, K/KB, M/MB, G/GB. A bare
/// number is bytes and an empty string is zero.
pub fn parse_size(s: &str) -> Result<u64> {
    let upper = s.trim().to_uppercase();
    if upper.is_empty() {
        return Ok(0);
    }

    let split = upper
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(upper.len());
    let (num_str, unit) = upper.split_at(split);

    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        _ => return Err(Error::InvalidSize(s.to_string())),
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| Error::InvalidSize(s.to_string()))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| Error::InvalidSize(s.to_string()))
}
