//! Adapter for the sample-files page of the lab tracker.
//!
//! The tracker stores one data root per sample and renders whatever this
//! module hands back. A bad or missing root never becomes a failure here,
//! only an explanatory message next to an empty listing.

use std::sync::Arc;

use crate::scanner::types::ScanEvent;
use crate::scanner::DirectoryScanner;
use crate::sink::{EventSink, TracingSink};

/// Message shown when a sample has no data root configured.
pub const NO_PATH_MESSAGE: &str = "No file path is set for this sample.";

/// One row of the sample-files table.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub name: String,
    pub location: String,
    /// Size in GiB
    pub size_gb: f64,
}

/// What the sample-files view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleFiles {
    pub files: Vec<FileRow>,
    pub error: Option<String>,
}

impl SampleFiles {
    /// Scan a sample's data root, reporting diagnostics through `tracing`.
    ///
    /// `limit` stops the walk after that many rows.
    pub fn collect(root: Option<&str>, limit: Option<usize>) -> Self {
        Self::collect_with_sink(root, limit, Arc::new(TracingSink))
    }

    pub fn collect_with_sink(
        root: Option<&str>,
        limit: Option<usize>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let root = match root.map(str::trim) {
            Some(root) if !root.is_empty() => root,
            _ => {
                return Self {
                    files: Vec::new(),
                    error: Some(NO_PATH_MESSAGE.to_string()),
                }
            }
        };

        let scanner = match DirectoryScanner::builder(root).sink(sink.clone()).build() {
            Ok(scanner) => scanner,
            Err(e) => {
                sink.emit(&ScanEvent::from(&e));
                return Self {
                    files: Vec::new(),
                    error: Some(format!("Error scanning path: {}", e)),
                }
            }
        };

        let files = scanner
            .scan()
            .take(limit.unwrap_or(usize::MAX))
            .map(|record| FileRow {
                size_gb: record.size_gb(),
                name: record.name.to_string(),
                location: record.location.to_string_lossy().into_owned(),
            })
            .collect();

        Self { files, error: None }
    }
}
