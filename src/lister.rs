use std::path::Path;

use ignore::WalkBuilder;
use tracing::warn;

/// One immediate child of the listed directory.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

/// Enumerate the immediate children of `dir`. An unreadable or missing
/// directory yields an empty list. Order is whatever the filesystem returns;
/// callers impose their own.
pub fn list_entries(dir: &Path) -> Vec<Entry> {
    // The walker's own hidden/gitignore filtering stays off; exclusion is the
    // pattern filter's job.
    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("failed to access entry: {err}");
                continue;
            }
        };

        // Depth 0 is the listed directory itself.
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        entries.push(Entry { name, is_dir });
    }

    entries
}
