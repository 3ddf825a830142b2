use std::path::PathBuf;

/// Errors raised while reading or writing permission list files.
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("Failed to read permission list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write permission list {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
