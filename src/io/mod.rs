//! Plain-text and STL export of meshes and particle positions.

mod obj;
mod points;

#[cfg(feature = "stl-io")]
mod stl;

pub use obj::write_obj;
pub use points::{save_points, write_points};

#[cfg(feature = "stl-io")]
pub use stl::{to_stl_ascii, to_stl_binary};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export errors.
#[derive(Debug)]
pub enum IoError {
    StdIo(std::io::Error),

    MalformedMesh(String),
    MalformedPath(String),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use IoError::*;

        match self {
            StdIo(error) => write!(f, "std::io::Error: {error}"),

            MalformedMesh(msg) => write!(f, "Mesh is malformed: {msg}"),
            MalformedPath(msg) => write!(f, "The path is malformed: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(value: std::io::Error) -> Self {
        Self::StdIo(value)
    }
}

/// Create (or truncate) `path` and hand a buffered writer to `write`.
pub(crate) fn write_file<F>(path: &Path, write: F) -> Result<(), IoError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), IoError>,
{
    if path.as_os_str().is_empty() || path.is_dir() {
        return Err(IoError::MalformedPath(path.display().to_string()));
    }
    let mut out = BufWriter::new(File::create(path)?);
    write(&mut out)?;
    out.flush()?;
    Ok(())
}
