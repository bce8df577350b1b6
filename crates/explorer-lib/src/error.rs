//! Error types for the snapshot explorer core

use std::path::PathBuf;

/// Errors surfaced by the explorer operations
///
/// Malformed or partial snapshot content is never an error: it is
/// normalized to empty lists and zero counts while indexing.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("unsupported resource kind: {0}")]
    UnsupportedKind(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("failed to read snapshot {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot is not valid JSON: {0}")]
    SnapshotParse(#[from] serde_json::Error),
}

impl ExplorerError {
    /// True for errors caused by the caller's selection rather than by data access
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            ExplorerError::UnsupportedKind(_)
                | ExplorerError::InvalidQuery(_)
                | ExplorerError::UnknownComponent(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
