use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatDirError {
    #[error("Layout infeasible: {0}")]
    LayoutInfeasible(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Name too long: '{name}' is {len} bytes (max 16)")]
    NameTooLong { name: String, len: usize },

    #[error("Disk full: no free cluster available")]
    DiskFull,

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Corrupt image: {0}")]
    CorruptImage(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
