use std::fs::OpenOptions;
use std::path::Path;

use crate::error::{Result, ScanError};
use crate::scanner::types::InventoryRecord;

/// Header row written to a new or empty artifact.
pub const HEADER: [&str; 3] = ["file_name", "location", "size_GB"];

const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Bytes as GiB with three decimals, the artifact's size column format.
pub fn format_gb(bytes: u64) -> String {
    format!("{:.3}", bytes as f64 / BYTES_PER_GB)
}

/// Append one CSV row per record to `path`, creating it if needed.
///
/// The header goes in only when the file is new or empty, so repeated runs
/// accumulate rows under a single header. Returns the number of rows written.
pub fn append_inventory<I>(path: &Path, records: I) -> Result<u64>
where
    I: IntoIterator<Item = InventoryRecord>,
{
    let fail = |source: csv::Error| ScanError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| fail(e.into()))?;
    let is_empty = file.metadata().map_err(|e| fail(e.into()))?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_empty {
        writer.write_record(HEADER).map_err(fail)?;
    }

    let mut rows: u64 = 0;
    for record in records {
        let location = record.location.to_string_lossy();
        let size = format_gb(record.size_bytes);
        writer
            .write_record([record.name.as_str(), location.as_ref(), size.as_str()])
            .map_err(fail)?;
        rows += 1;
    }

    writer.flush().map_err(|e| fail(e.into()))?;
    Ok(rows)
}
