use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::core::GraphError;

/// Read a whole artifact into memory.
pub fn read_text(file_path: &Path) -> io::Result<String> {
    let file = File::open(file_path)?;
    let file_size = file.metadata()?.len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;
    Ok(content)
}

/// [`read_text`] with the error attached to the path.
pub fn read_source(file_path: &Path) -> Result<String, GraphError> {
    read_text(file_path).map_err(|source| GraphError::Io {
        path: file_path.to_path_buf(),
        source,
    })
}

pub fn path_string(file_path: &Path) -> String {
    file_path.to_string_lossy().into_owned()
}
