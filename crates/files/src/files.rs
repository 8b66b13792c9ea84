//! Read, write, copy and move helpers returning [`FileError`].

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{FileError, FileOp};

/// Copy the contents of `from` into `to`, creating or truncating `to`
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<(), FileError> {
    let (from, to) = (from.as_ref(), to.as_ref());

    let mut reader = File::open(from).map_err(|e| FileError::new(FileOp::Read, from, e))?;
    let mut writer = File::create(to).map_err(|e| FileError::new(FileOp::Write, to, e))?;
    io::copy(&mut reader, &mut writer).map_err(|e| FileError::new(FileOp::Copy, from, e))?;
    writer.flush().map_err(|e| FileError::new(FileOp::Write, to, e))
}

/// Rename `from` to `to`
pub fn move_file<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<(), FileError> {
    let from = from.as_ref();
    fs::rename(from, to).map_err(|e| FileError::new(FileOp::Move, from, e))
}

/// Read a whole file into memory
pub fn read_file_data<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, FileError> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| FileError::new(FileOp::Read, path, e))
}

/// Read a whole file as text, replacing invalid UTF-8
pub fn read_file_string<P: AsRef<Path>>(path: P) -> Result<String, FileError> {
    let data = read_file_data(path)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Read a file line by line, without line terminators
pub fn read_file_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, FileError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FileError::new(FileOp::Read, path, e))?;
    read_lines(BufReader::new(file)).map_err(|e| FileError::new(FileOp::Read, path, e))
}

pub(crate) fn read_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

/// Write `data` to `path`, creating or truncating it
pub fn write_file_data<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<(), FileError> {
    let path = path.as_ref();
    fs::write(path, data).map_err(|e| FileError::new(FileOp::Write, path, e))
}

pub fn write_file_string<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), FileError> {
    write_file_data(path, contents.as_bytes())
}

/// Write each line followed by `\n`
pub fn write_file_lines<P, I, S>(path: P, lines: I) -> Result<(), FileError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let write = || -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for line in lines {
            writer.write_all(line.as_ref().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    };
    write().map_err(|e| FileError::new(FileOp::Write, path, e))
}
