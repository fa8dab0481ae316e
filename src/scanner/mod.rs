pub mod rules;
pub mod size;
pub mod types;

use std::fmt;
use std::fs;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use compact_str::CompactString;

use self::rules::{EntryClass, MatchRules};
use self::types::{InventoryRecord, ScanEvent, ScanStats, SkipReason};
use crate::artifact;
use crate::error::{Result, ScanError};
use crate::sink::{EventSink, FileSink, TracingSink};

/// Default artifact file name, created in the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "address_book.csv";
/// Default log file name, created in the working directory.
pub const DEFAULT_LOG_FILE: &str = "output.log";

fn in_working_dir(name: &str) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(name))
        .unwrap_or_else(|_| PathBuf::from(name))
}

/// Configures a [`DirectoryScanner`].
pub struct ScannerBuilder {
    root: PathBuf,
    output_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
    rules: MatchRules,
    sink: Option<Arc<dyn EventSink>>,
}

impl ScannerBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_path: None,
            log_path: None,
            rules: MatchRules::default(),
            sink: None,
        }
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Resolve the root and build the scanner.
    ///
    /// Without an explicit sink, events go to `tracing` and are appended to
    /// the log path.
    pub fn build(self) -> Result<DirectoryScanner> {
        let root = fs::canonicalize(&self.root).map_err(|source| ScanError::PathResolution {
            path: self.root.clone(),
            source,
        })?;

        let log_path = self
            .log_path
            .unwrap_or_else(|| in_working_dir(DEFAULT_LOG_FILE));
        let sink: Arc<dyn EventSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new((TracingSink, FileSink::new(&log_path))),
        };

        Ok(DirectoryScanner {
            root,
            output_path: self
                .output_path
                .unwrap_or_else(|| in_working_dir(DEFAULT_OUTPUT_FILE)),
            log_path,
            rules: self.rules,
            sink,
        })
    }
}

/// Inventories spectra files and acquisition directories beneath one root.
pub struct DirectoryScanner {
    root: PathBuf,
    output_path: PathBuf,
    log_path: PathBuf,
    rules: MatchRules,
    sink: Arc<dyn EventSink>,
}

impl fmt::Debug for DirectoryScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryScanner")
            .field("root", &self.root)
            .field("output_path", &self.output_path)
            .field("log_path", &self.log_path)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl DirectoryScanner {
    /// Scanner with default paths and rules, logging to `tracing` and the
    /// default log file.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        ScannerBuilder::new(root).build()
    }

    pub fn builder(root: impl Into<PathBuf>) -> ScannerBuilder {
        ScannerBuilder::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Start a lazy walk of the root. Nothing touches the filesystem until
    /// the first record is pulled.
    pub fn scan(&self) -> Scan<'_> {
        Scan {
            scanner: self,
            stack: vec![self.root.clone()],
            current: self.root.clone(),
            listing: None,
            stats: ScanStats::default(),
            started: None,
            done: false,
        }
    }

    /// Append every record of a fresh scan to the output artifact.
    ///
    /// Failures are reported to the sink and yield `None`; they never reach
    /// the caller as errors.
    pub fn write_inventory(&self) -> Option<u64> {
        match artifact::append_inventory(&self.output_path, self.scan()) {
            Ok(rows) => {
                self.emit(&ScanEvent::ArtifactWritten {
                    path: self.output_path.clone(),
                    rows,
                });
                Some(rows)
            }
            Err(err) => {
                self.emit(&ScanEvent::from(&err));
                None
            }
        }
    }

    /// Standalone entry point: scan the root and persist the artifact.
    ///
    /// The start and finish events are emitted even when the artifact
    /// cannot be written.
    pub fn run(&self) -> Option<u64> {
        self.emit(&ScanEvent::RunStarted {
            root: self.root.clone(),
            output: self.output_path.clone(),
        });
        let rows = self.write_inventory();
        self.emit(&ScanEvent::RunFinished {
            output: self.output_path.clone(),
            rows,
        });
        rows
    }

    fn emit(&self, event: &ScanEvent) {
        self.sink.emit(event);
    }
}

/// Pull-based depth-first walk produced by [`DirectoryScanner::scan`].
///
/// Finite and not restartable. Dropping it stops all further filesystem work.
pub struct Scan<'a> {
    scanner: &'a DirectoryScanner,
    stack: Vec<PathBuf>,
    /// Directory whose listing is in progress
    current: PathBuf,
    listing: Option<fs::ReadDir>,
    stats: ScanStats,
    started: Option<Instant>,
    done: bool,
}

impl Scan<'_> {
    /// Counters so far; `elapsed_ms` is measured up to now.
    pub fn stats(&self) -> ScanStats {
        let mut stats = self.stats;
        if !self.done {
            if let Some(started) = self.started {
                stats.elapsed_ms = started.elapsed().as_millis() as u64;
            }
        }
        stats
    }

    fn skip_reason(&self, dir: &Path) -> Option<SkipReason> {
        if self.scanner.rules.is_excluded_path(dir) {
            return Some(SkipReason::ExcludedPath);
        }
        let is_link = fs::symlink_metadata(dir)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        is_link.then_some(SkipReason::Symlink)
    }

    fn skip(&mut self, path: PathBuf, reason: SkipReason) {
        self.stats.dirs_skipped += 1;
        self.scanner.emit(&ScanEvent::Skipped { path, reason });
    }

    fn visit(&mut self, entry: &fs::DirEntry) -> Option<InventoryRecord> {
        match self.inspect(entry) {
            Ok(Some(record)) => {
                self.stats.records += 1;
                self.stats.total_bytes += record.size_bytes;
                Some(record)
            }
            Ok(None) => None,
            Err(err) => {
                self.stats.entry_errors += 1;
                self.scanner.emit(&ScanEvent::from(&err));
                None
            }
        }
    }

    fn inspect(&mut self, entry: &fs::DirEntry) -> Result<Option<InventoryRecord>> {
        let path = entry.path();
        let access = |source: std::io::Error| ScanError::EntryAccess {
            path: path.clone(),
            source,
        };
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        let scanner: &DirectoryScanner = self.scanner;
        let rules = &scanner.rules;
        let file_type = entry.file_type().map_err(access)?;

        if file_type.is_symlink() {
            // Links are never traversed. Linked directories are reported,
            // linked spectra files count with their target's size.
            return match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => {
                    self.skip(path, SkipReason::Symlink);
                    Ok(None)
                }
                Ok(meta) if rules.matches_extension(&name) => {
                    let location = fs::canonicalize(&path).map_err(access)?;
                    Ok(Some(record(&name, location, meta.len())))
                }
                Ok(_) => Ok(None),
                Err(source) if rules.matches_extension(&name) => Err(access(source)),
                Err(_) => Ok(None),
            };
        }

        match rules.classify(&name, file_type.is_dir()) {
            EntryClass::Acquisition => {
                let location = fs::canonicalize(&path).map_err(access)?;
                let size = size::directory_size(&path);
                Ok(Some(record(&name, location, size)))
            }
            EntryClass::Descend => {
                self.stack.push(path);
                Ok(None)
            }
            EntryClass::Spectra => {
                let location = fs::canonicalize(&path).map_err(access)?;
                let meta = entry.metadata().map_err(access)?;
                Ok(Some(record(&name, location, meta.len())))
            }
            EntryClass::Ignore => Ok(None),
        }
    }

    fn finish(&mut self) {
        if let Some(started) = self.started {
            self.stats.elapsed_ms = started.elapsed().as_millis() as u64;
        }
        self.done = true;
        self.scanner.emit(&ScanEvent::Completed { stats: self.stats });
    }
}

fn record(name: &str, location: PathBuf, size_bytes: u64) -> InventoryRecord {
    InventoryRecord {
        name: CompactString::new(name),
        location,
        size_bytes,
    }
}

impl Iterator for Scan<'_> {
    type Item = InventoryRecord;

    fn next(&mut self) -> Option<InventoryRecord> {
        if self.done {
            return None;
        }
        if self.started.is_none() {
            self.started = Some(Instant::now());
            self.scanner.emit(&ScanEvent::Started {
                root: self.scanner.root.clone(),
            });
        }

        loop {
            if let Some(listing) = self.listing.as_mut() {
                match listing.next() {
                    Some(Ok(entry)) => {
                        if let Some(record) = self.visit(&entry) {
                            return Some(record);
                        }
                    }
                    Some(Err(source)) => {
                        let err = ScanError::EntryAccess {
                            path: self.current.clone(),
                            source,
                        };
                        self.stats.entry_errors += 1;
                        self.scanner.emit(&ScanEvent::from(&err));
                    }
                    None => self.listing = None,
                }
                continue;
            }

            let Some(dir) = self.stack.pop() else {
                self.finish();
                return None;
            };

            if let Some(reason) = self.skip_reason(&dir) {
                self.skip(dir, reason);
                continue;
            }

            match fs::read_dir(&dir) {
                Ok(listing) => {
                    self.stats.dirs_listed += 1;
                    self.listing = Some(listing);
                    self.current = dir;
                }
                Err(source) => {
                    // Subtree abandoned; the rest of the stack still runs.
                    let err = ScanError::DirectoryAccess { path: dir, source };
                    self.stats.dir_errors += 1;
                    self.scanner.emit(&ScanEvent::from(&err));
                }
            }
        }
    }
}

impl FusedIterator for Scan<'_> {}
