//! Requests whose work is done against a local file
//!
//! A file request names a path, does its work on that path and delivers the
//! result or a [`FileError`] to its listeners. Relative paths resolve against
//! the configured file root.

use std::path::{Path, PathBuf};

use imgreq_cache::CacheConfig;

use crate::error::FileError;
use crate::files::read_file_string;

pub trait FileRequest {
    type Output;

    /// Path of the file this request works on
    fn path(&self) -> &Path;

    /// Do the work on the resolved path
    fn do_file_work(&self, path: &Path) -> Result<Self::Output, FileError>;

    fn deliver_result(&self, result: Self::Output);

    fn deliver_error(&self, error: FileError) {
        tracing::debug!(%error, "file request failed with no error listener");
    }
}

/// Resolve a request path against `root`; absolute paths are kept as is
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Run a file request synchronously and deliver its outcome
///
/// Returns whether the work succeeded.
pub fn perform<R: FileRequest + ?Sized>(request: &R, config: &CacheConfig) -> bool {
    let path = resolve_path(&config.file_root, request.path());
    match request.do_file_work(&path) {
        Ok(result) => {
            request.deliver_result(result);
            true
        }
        Err(error) => {
            request.deliver_error(error);
            false
        }
    }
}

/// Reads a file as text and hands it to a listener
pub struct StringFileRequest<L, E> {
    path: PathBuf,
    listener: L,
    error_listener: E,
}

impl<L, E> StringFileRequest<L, E>
where
    L: Fn(String),
    E: Fn(FileError),
{
    pub fn new(path: impl Into<PathBuf>, listener: L, error_listener: E) -> Self {
        Self {
            path: path.into(),
            listener,
            error_listener,
        }
    }
}

impl<L, E> FileRequest for StringFileRequest<L, E>
where
    L: Fn(String),
    E: Fn(FileError),
{
    type Output = String;

    fn path(&self) -> &Path {
        &self.path
    }

    fn do_file_work(&self, path: &Path) -> Result<String, FileError> {
        read_file_string(path)
    }

    fn deliver_result(&self, result: String) {
        (self.listener)(result);
    }

    fn deliver_error(&self, error: FileError) {
        (self.error_listener)(error);
    }
}
