use std::fs;
use std::path::{Path, PathBuf};

use crate::editing::Document;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(PathBuf),
}

/// Read a markdown file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| IoError::InvalidUtf8(path.to_path_buf()))
}

/// Read a markdown file into a document, or start empty if it does not exist yet
pub fn load_document(path: &Path) -> Result<Document, IoError> {
    match read_file(path) {
        Ok(content) => {
            log::info!("loaded {} ({} bytes)", path.display(), content.len());
            Ok(Document::new(&content))
        }
        Err(IoError::NotFound(_)) => {
            log::info!("{} does not exist yet, starting empty", path.display());
            Ok(Document::new(""))
        }
        Err(e) => Err(e),
    }
}

/// Write content to a markdown file
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    log::info!("wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}
