// Public library interface for spectra-addressbook
// The standalone binaries and the sample-files view both drive the scanner through here

pub mod artifact;
pub mod error;
pub mod listing;
pub mod logging;
pub mod scanner;
pub mod sink;

pub use error::{Result, ScanError};
pub use listing::{FileRow, SampleFiles};
pub use scanner::types::{InventoryRecord, ScanEvent, ScanStats, SkipReason};
pub use scanner::{DirectoryScanner, Scan, ScannerBuilder};
pub use sink::{EventSink, FileSink, MemorySink, TracingSink};
