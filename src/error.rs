use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

/// Failures the scanner can run into.
///
/// Only `PathResolution` ever reaches a caller of the scanner. The other
/// variants are recovered where they happen and reported through the
/// scanner's event sink.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root could not be turned into an absolute, link-free path.
    #[error("cannot resolve path {path}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single directory entry could not be inspected.
    #[error("cannot access path {path}: {source}")]
    EntryAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A whole directory could not be listed.
    #[error("cannot access folder {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The inventory artifact could not be created or appended to.
    #[error("failed writing CSV {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ScanError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ScanError::PathResolution { path, .. }
            | ScanError::EntryAccess { path, .. }
            | ScanError::DirectoryAccess { path, .. }
            | ScanError::ArtifactWrite { path, .. } => path,
        }
    }
}
