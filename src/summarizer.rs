use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::client::CompletionClient;
use crate::filter::PatternSet;
use crate::lister::{self, Entry};

/// Leading byte window of a file handed to the completion service. The window
/// may stop mid-line or mid-character.
const SNIPPET_BYTES: usize = 4000;

/// Token ceiling for one-sentence file summaries.
const SUMMARY_MAX_TOKENS: u32 = 120;

/// One summarized directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub name: String,
    pub abs_path: PathBuf,
    pub is_dir: bool,
    pub text: String,
}

/// Summarize every entry of `dir` that no exclusion pattern matches, one
/// concurrent task per entry, and return the summaries in byte-wise ascending
/// name order. Any task failure fails the whole run.
pub fn summarize_directory(
    dir: &Path,
    patterns: &PatternSet,
    client: &dyn CompletionClient,
) -> Result<Vec<Summary>> {
    let entries: Vec<Entry> = lister::list_entries(dir)
        .into_iter()
        .filter(|entry| !patterns.is_excluded(&entry.name))
        .collect();

    // The channel holds one slot per task, so no send blocks; the scope join
    // is the wait-for-all barrier, and dropping the sender closes the channel.
    let (sender, receiver) = mpsc::sync_channel(entries.len());
    rayon::scope(|scope| {
        for entry in &entries {
            let sender = sender.clone();
            scope.spawn(move |_| {
                let _ = sender.send(summarize_entry(dir, entry, client));
            });
        }
    });
    drop(sender);

    let mut summaries = receiver.into_iter().collect::<Result<Vec<Summary>>>()?;
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(summaries)
}

/// Render one block per summary: a `## <name>` heading, then the summary
/// text, blank line separated.
pub fn render_report(summaries: &[Summary], writer: &mut impl Write) -> Result<()> {
    for summary in summaries {
        writeln!(writer, "## {}\n\n{}\n", summary.name, summary.text)
            .context("failed to write report")?;
    }
    Ok(())
}

fn summarize_entry(dir: &Path, entry: &Entry, client: &dyn CompletionClient) -> Result<Summary> {
    let path = dir.join(&entry.name);
    let abs_path = std::path::absolute(&path).unwrap_or(path);

    if entry.is_dir {
        let text = format!("directory[{}]", abs_path.display());
        return Ok(Summary {
            name: entry.name.clone(),
            abs_path,
            is_dir: true,
            text,
        });
    }

    let snippet = read_snippet(&abs_path)
        .with_context(|| format!("failed to read {}", abs_path.display()))?;
    let instruction = format!(
        "You are a code file summarizer assistant. Given the user's input, respond with a one \
         sentence summary of what the file contains. The summary should be something that would \
         be useful to see from a README file. The file's name is '{}'.",
        entry.name
    );
    let text = client.complete(&instruction, &snippet, SUMMARY_MAX_TOKENS)?;

    Ok(Summary {
        name: entry.name.clone(),
        abs_path,
        is_dir: false,
        text,
    })
}

/// Read up to `SNIPPET_BYTES` leading bytes, decoded lossily.
fn read_snippet(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; SNIPPET_BYTES];
    let mut filled = 0;
    while filled < buffer.len() {
        let read = file.read(&mut buffer[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    buffer.truncate(filled);
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
