use std::fs;
use std::path::Path;

use jwalk::{Parallelism, WalkDir};

/// Total size of all regular files beneath `path`.
///
/// Used for acquisition directories, which are reported as one unit. The
/// walk stays on the calling thread, does not follow symlinked directories
/// and does not apply the scan's skip rules. Symlinked files count at their
/// target's size. Anything that cannot be read contributes zero.
pub fn directory_size(path: &Path) -> u64 {
    let mut total: u64 = 0;

    for entry in WalkDir::new(path)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Size walk under {} hit an error: {}", path.display(), e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => total += meta.len(),
            _ => {}
        }
    }

    total
}
