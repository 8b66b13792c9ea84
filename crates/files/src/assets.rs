//! Bundled read-only assets
//!
//! Assets are addressed by a relative name. [`DirAssets`] serves them from a
//! directory; other sources (an archive, an embedded table) implement
//! [`AssetSource`].

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::error::{FileError, FileOp};
use crate::files::read_lines;

/// Source of named, read-only assets
pub trait AssetSource {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// Assets stored as files below a root directory
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an asset name, refusing names that escape the root
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || name.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid asset name `{name}`"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for DirAssets {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.resolve(name)?)?;
        Ok(Box::new(file))
    }
}

/// Read a whole asset into memory
pub fn read_asset_data<A: AssetSource + ?Sized>(assets: &A, name: &str) -> Result<Vec<u8>, FileError> {
    let read = || -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        assets.open(name)?.read_to_end(&mut data)?;
        Ok(data)
    };
    read().map_err(|e| FileError::new(FileOp::Read, name, e))
}

/// Read a whole asset as text, replacing invalid UTF-8
pub fn read_asset_string<A: AssetSource + ?Sized>(assets: &A, name: &str) -> Result<String, FileError> {
    let data = read_asset_data(assets, name)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Read an asset line by line
pub fn read_asset_lines<A: AssetSource + ?Sized>(assets: &A, name: &str) -> Result<Vec<String>, FileError> {
    assets
        .open(name)
        .and_then(|reader| read_lines(BufReader::new(reader)))
        .map_err(|e| FileError::new(FileOp::Read, name, e))
}

/// Copy an asset out to a file, creating or truncating `output`
pub fn copy_file_from_assets<A, P>(assets: &A, name: &str, output: P) -> Result<(), FileError>
where
    A: AssetSource + ?Sized,
    P: AsRef<Path>,
{
    let output = output.as_ref();
    let mut reader = assets
        .open(name)
        .map_err(|e| FileError::new(FileOp::Read, name, e))?;
    let mut writer = File::create(output).map_err(|e| FileError::new(FileOp::Write, output, e))?;
    io::copy(&mut reader, &mut writer).map_err(|e| FileError::new(FileOp::Copy, name, e))?;
    Ok(())
}
