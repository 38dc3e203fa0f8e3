//! Error types for the file store

use posting_layout::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for file store internals
pub type Result<T> = std::result::Result<T, FileStoreError>;

/// Errors raised while reading or writing entity files
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// Store root has not been initialized
    #[error("template store not initialized: {path}")]
    NotInitialized { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

impl FileStoreError {
    pub(crate) fn yaml(path: impl Into<PathBuf>, source: serde_yaml_ng::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }
}

impl From<FileStoreError> for StoreError {
    fn from(error: FileStoreError) -> Self {
        StoreError::backend(error)
    }
}
