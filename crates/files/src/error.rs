//! The single error type for failed file operations

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The file operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Write,
    Copy,
    Move,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            FileOp::Read => "read",
            FileOp::Write => "write",
            FileOp::Copy => "copy",
            FileOp::Move => "move",
        };
        f.write_str(verb)
    }
}

/// Any I/O failure from a file utility
///
/// Not-found, permission and truncated reads or writes all surface as this one
/// type; the underlying `io::Error` stays reachable through `source()`.
#[derive(Debug, thiserror::Error)]
#[error("could not {op} `{shown}`", shown = .path.display())]
pub struct FileError {
    op: FileOp,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl FileError {
    pub fn new(op: FileOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let err = Self {
            op,
            path: path.into(),
            source,
        };
        tracing::debug!(op = %err.op, path = %err.path.display(), error = %err.source, "file operation failed");
        err
    }

    pub fn op(&self) -> FileOp {
        self.op
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kind of the underlying I/O error
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == io::ErrorKind::NotFound
    }

    pub fn into_io_error(self) -> io::Error {
        self.source
    }
}
