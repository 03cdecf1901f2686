//! Error types shared across the crate

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An ignore-pattern source could not be read. Rules parsed from
    /// earlier sources stay in effect.
    #[error("ignore source unreadable: {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("directory walk failed: {0}")]
    Walk(String),
    #[error("invalid size '{0}'")]
    InvalidSize(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("git: {0}")]
    Git(#[from] git2::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
