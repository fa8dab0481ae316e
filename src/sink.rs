use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::scanner::types::ScanEvent;

/// Receiver of the structured events a scanner emits.
///
/// Each scanner owns its sink; nothing here is process-global. Rendering is
/// left to the implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ScanEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: &ScanEvent) {
        (**self).emit(event)
    }
}

/// Forward events to a channel so another thread can poll them.
impl EventSink for Mutex<mpsc::Sender<ScanEvent>> {
    fn emit(&self, event: &ScanEvent) {
        if let Ok(tx) = self.lock() {
            let _ = tx.send(event.clone());
        }
    }
}

/// Renders events through `tracing` at the level each event carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ScanEvent) {
        let level = event.level();
        if level == Level::ERROR {
            tracing::error!("{}", event);
        } else if level == Level::WARN {
            tracing::warn!("{}", event);
        } else {
            tracing::info!("{}", event);
        }
    }
}

/// Appends one line per event to a log file.
///
/// The file is opened on the first event. If it cannot be opened the sink
/// says so once through `tracing` and drops everything after.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
    unavailable: AtomicBool,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for FileSink {
    fn emit(&self, event: &ScanEvent) {
        if self.unavailable.load(Ordering::Relaxed) {
            return;
        }
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        if guard.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => *guard = Some(file),
                Err(e) => {
                    self.unavailable.store(true, Ordering::Relaxed);
                    tracing::warn!("Log file {} unavailable: {}", self.path.display(), e);
                    return;
                }
            }
        }
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "{} {}", event.level(), event);
        }
    }
}

/// Sends every event to both sinks, left first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&self, event: &ScanEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ScanEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.events
            .lock()
            .map(|events| events.to_vec())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<ScanEvent> {
        self.events()
            .into_iter()
            .filter(ScanEvent::is_warning)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &ScanEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::types::SkipReason;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn memory_sink_keeps_order_and_filters_warnings() {
        let sink = MemorySink::new();
        sink.emit(&ScanEvent::Started {
            root: PathBuf::from("/data"),
        });
        sink.emit(&ScanEvent::Skipped {
            path: PathBuf::from("/data/xi_data"),
            reason: SkipReason::ExcludedPath,
        });
        sink.emit(&ScanEvent::ArtifactFailed {
            path: PathBuf::from("/ro/out.csv"),
            message: "read-only file system".into(),
        });

        assert_eq!(sink.events().len(), 3);
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].path(),
            Some(PathBuf::from("/data/xi_data").as_path())
        );
    }

    #[test]
    fn channel_sink_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let sink = Mutex::new(tx);
        sink.emit(&ScanEvent::Started {
            root: PathBuf::from("/data"),
        });
        assert_eq!(
            rx.try_recv().ok(),
            Some(ScanEvent::Started {
                root: PathBuf::from("/data")
            })
        );
    }

    #[test]
    fn arc_sink_shares_one_buffer() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn EventSink> = sink.clone();
        shared.emit(&ScanEvent::Completed {
            stats: Default::default(),
        });
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn file_sink_appends_one_line_per_event() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let log = temp.path().join("scan.log");
        fs::write(&log, "earlier line\n").unwrap();

        let sink = FileSink::new(&log);
        sink.emit(&ScanEvent::Skipped {
            path: PathBuf::from("/data/xi_data"),
            reason: SkipReason::ExcludedPath,
        });
        sink.emit(&ScanEvent::ArtifactFailed {
            path: PathBuf::from("/ro/out.csv"),
            message: "read-only file system".into(),
        });

        let content = fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "earlier line",
                "WARN Skipping the folder: /data/xi_data",
                "ERROR Failed writing CSV: /ro/out.csv (read-only file system)",
            ]
        );
    }

    #[test]
    fn file_sink_in_missing_directory_drops_events() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let log = temp.path().join("no/such/dir/scan.log");

        let sink = FileSink::new(&log);
        sink.emit(&ScanEvent::Started {
            root: PathBuf::from("/data"),
        });
        sink.emit(&ScanEvent::Started {
            root: PathBuf::from("/data"),
        });
        assert!(!log.exists());
        assert_eq!(sink.path(), log.as_path());
    }

    #[test]
    fn pair_sink_reaches_both_sides() {
        let left = Arc::new(MemorySink::new());
        let right = Arc::new(MemorySink::new());
        let tee = (left.clone(), right.clone());
        tee.emit(&ScanEvent::Started {
            root: PathBuf::from("/data"),
        });
        assert_eq!(left.events(), right.events());
        assert_eq!(left.events().len(), 1);
    }
}
