use std::fmt;
use std::io;
use std::path::PathBuf;

use compact_str::CompactString;

use crate::error::ScanError;

/// One unit of interest discovered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InventoryRecord {
    /// Base name of the file or acquisition directory
    pub name: CompactString,
    /// Absolute path with symlinks resolved
    pub location: PathBuf,
    /// Own size for files, recursive total for acquisition directories
    pub size_bytes: u64,
}

impl InventoryRecord {
    /// Size in GiB, the unit the artifact and the sample view display.
    pub fn size_gb(&self) -> f64 {
        self.size_bytes as f64 / 1_073_741_824.0
    }

    /// The `(name, location, size_bytes)` triple handed to consumers.
    pub fn into_tuple(self) -> (String, String, u64) {
        (
            self.name.into(),
            self.location.to_string_lossy().into_owned(),
            self.size_bytes,
        )
    }
}

/// Why a directory was left out of the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path contains one of the excluded substrings
    ExcludedPath,
    /// The directory is a symbolic link
    Symlink,
}

/// Running counters for a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub records: u64,
    pub dirs_listed: u64,
    pub dirs_skipped: u64,
    pub entry_errors: u64,
    pub dir_errors: u64,
    pub total_bytes: u64,
    pub elapsed_ms: u64,
}

/// Structured events emitted by a scanner to its sink.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// `run` is about to write the inventory of a root
    RunStarted { root: PathBuf, output: PathBuf },
    /// `run` is done; `rows` is `None` when the artifact was not written
    RunFinished { output: PathBuf, rows: Option<u64> },
    /// The root could not be resolved, nothing was scanned (error)
    RootUnresolved { path: PathBuf, message: String },
    /// Starting scan of a root
    Started { root: PathBuf },
    /// A directory matched a skip rule (warning)
    Skipped { path: PathBuf, reason: SkipReason },
    /// One entry could not be inspected (warning)
    EntryUnreadable {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },
    /// A directory could not be listed; its subtree is abandoned (warning)
    DirectoryUnreadable {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },
    /// Scan exhausted
    Completed { stats: ScanStats },
    /// The artifact was written
    ArtifactWritten { path: PathBuf, rows: u64 },
    /// The artifact could not be written (error)
    ArtifactFailed { path: PathBuf, message: String },
}

impl ScanEvent {
    /// Path the event is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ScanEvent::Started { root } | ScanEvent::RunStarted { root, .. } => Some(root),
            ScanEvent::RunFinished { output, .. } => Some(output),
            ScanEvent::RootUnresolved { path, .. }
            | ScanEvent::Skipped { path, .. }
            | ScanEvent::EntryUnreadable { path, .. }
            | ScanEvent::DirectoryUnreadable { path, .. }
            | ScanEvent::ArtifactWritten { path, .. }
            | ScanEvent::ArtifactFailed { path, .. } => Some(path),
            ScanEvent::Completed { .. } => None,
        }
    }

    pub fn level(&self) -> tracing::Level {
        match self {
            ScanEvent::Started { .. }
            | ScanEvent::RunStarted { .. }
            | ScanEvent::RunFinished { .. }
            | ScanEvent::Completed { .. }
            | ScanEvent::ArtifactWritten { .. } => tracing::Level::INFO,
            ScanEvent::Skipped { .. }
            | ScanEvent::EntryUnreadable { .. }
            | ScanEvent::DirectoryUnreadable { .. } => tracing::Level::WARN,
            ScanEvent::RootUnresolved { .. } | ScanEvent::ArtifactFailed { .. } => {
                tracing::Level::ERROR
            }
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level() == tracing::Level::WARN
    }
}

impl From<&ScanError> for ScanEvent {
    fn from(err: &ScanError) -> Self {
        let path = err.path().to_path_buf();
        match err {
            ScanError::EntryAccess { source, .. } => ScanEvent::EntryUnreadable {
                path,
                kind: source.kind(),
                message: source.to_string(),
            },
            ScanError::DirectoryAccess { source, .. } => ScanEvent::DirectoryUnreadable {
                path,
                kind: source.kind(),
                message: source.to_string(),
            },
            ScanError::PathResolution { source, .. } => ScanEvent::RootUnresolved {
                path,
                message: source.to_string(),
            },
            ScanError::ArtifactWrite { source, .. } => ScanEvent::ArtifactFailed {
                path,
                message: source.to_string(),
            },
        }
    }
}

/// The log line for an event, without level or timestamp.
impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanEvent::RunStarted { root, .. } => {
                write!(f, "Searching the parent folder: {}", root.display())
            }
            ScanEvent::RunFinished { output, .. } => {
                write!(f, "Finished. Output CSV: {}", output.display())
            }
            ScanEvent::RootUnresolved { path, message } => {
                write!(f, "Cannot resolve path: {} ({})", path.display(), message)
            }
            ScanEvent::Started { root } => write!(f, "Scanning folder: {}", root.display()),
            ScanEvent::Skipped { path, reason } => match reason {
                SkipReason::ExcludedPath => write!(f, "Skipping the folder: {}", path.display()),
                SkipReason::Symlink => {
                    write!(f, "Skipping the folder (symbolic link): {}", path.display())
                }
            },
            ScanEvent::EntryUnreadable {
                path,
                kind,
                message,
            } => {
                if *kind == io::ErrorKind::PermissionDenied {
                    write!(
                        f,
                        "Cannot access path due to permission issues: {}",
                        path.display()
                    )
                } else {
                    write!(f, "Cannot access path: {} ({})", path.display(), message)
                }
            }
            ScanEvent::DirectoryUnreadable {
                path,
                kind,
                message,
            } => {
                if *kind == io::ErrorKind::PermissionDenied {
                    write!(
                        f,
                        "Cannot access folder due to permission issues: {}",
                        path.display()
                    )
                } else {
                    write!(f, "Cannot access folder: {} ({})", path.display(), message)
                }
            }
            ScanEvent::Completed { stats } => write!(
                f,
                "Scan finished: {} records ({:.3} GB) from {} folders in {}ms, {} skipped, {} unreadable",
                stats.records,
                stats.total_bytes as f64 / 1_073_741_824.0,
                stats.dirs_listed,
                stats.elapsed_ms,
                stats.dirs_skipped,
                stats.entry_errors + stats.dir_errors
            ),
            ScanEvent::ArtifactWritten { path, rows } => {
                write!(f, "Wrote {} rows to {}", rows, path.display())
            }
            ScanEvent::ArtifactFailed { path, message } => {
                write!(f, "Failed writing CSV: {} ({})", path.display(), message)
            }
        }
    }
}
