//! File utilities for file-backed requests
//!
//! Every I/O failure is reported as a single [`FileError`] so request code
//! can deliver it without inspecting OS-level causes.

pub mod assets;
pub mod error;
pub mod files;
pub mod request;

pub use assets::{
    copy_file_from_assets, read_asset_data, read_asset_lines, read_asset_string, AssetSource,
    DirAssets,
};
pub use error::{FileError, FileOp};
pub use files::{
    copy_file, move_file, read_file_data, read_file_lines, read_file_string, write_file_data,
    write_file_lines, write_file_string,
};
pub use request::{perform, resolve_path, FileRequest, StringFileRequest};
