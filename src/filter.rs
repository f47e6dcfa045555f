use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

/// Patterns excluded from every listing: hidden entries and build manifests.
const BASE_PATTERNS: [&str; 3] = [".*", "*.sum", "*.mod"];

/// Shell-glob exclusion patterns, matched against bare entry names.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    /// Build the pattern set: the base patterns followed by any patterns read
    /// from the ignore file at `ignore_file`. A missing ignore file
    /// contributes nothing.
    pub fn load(ignore_file: &Path) -> Self {
        let mut patterns: Vec<String> = BASE_PATTERNS.iter().map(|p| (*p).to_string()).collect();
        patterns.extend(read_ignore_patterns(ignore_file));
        Self { patterns }
    }

    /// True if `name` matches any pattern in the set. A pattern that fails to
    /// compile as a glob never matches.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| match glob::Pattern::new(pattern) {
                Ok(compiled) => compiled.matches(name),
                Err(err) => {
                    warn!("skipping malformed glob pattern {pattern:?}: {err}");
                    false
                }
            })
    }
}

/// Read one glob pattern per line, trimmed. Blank lines and `#` comments are
/// skipped.
fn read_ignore_patterns(path: &Path) -> Vec<String> {
    let Ok(file) = File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
