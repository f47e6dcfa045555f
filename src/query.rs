use std::collections::HashMap;
use std::io::Read;

use anyhow::{Context, Result};

use crate::client::CompletionClient;

/// Token ceiling for direct queries, looser than the one-sentence summaries.
const QUERY_MAX_TOKENS: u32 = 512;

pub const DEFAULT_PERSONA: &str = "default";

/// Named system instructions selectable with `--persona`.
pub fn persona_registry() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            "default",
            "You are a file summarizer assistant. Given the user submitted file, provide a one \
             sentence summary of what the file contains and what its purpose is.",
        ),
        (
            "comedian",
            "You are a stand-up comedian. Answer the user's input with a short, funny take that \
             still addresses what was asked.",
        ),
        (
            "pirate",
            "You are a grizzled pirate captain. Answer the user's input in pirate speak.",
        ),
    ])
}

/// Send one free-text message to the completion service under the named
/// persona and return the trimmed reply. An unknown persona name selects an
/// empty system instruction.
pub fn run_query(
    message: &str,
    persona: &str,
    personas: &HashMap<&str, &str>,
    client: &dyn CompletionClient,
) -> Result<String> {
    let instruction = personas.get(persona).copied().unwrap_or_default();
    client.complete(instruction, message, QUERY_MAX_TOKENS)
}

/// The query message: the argument as given, or the entirety of standard
/// input when the argument is absent, empty, or a single `-`.
pub fn read_message(arg: Option<String>) -> Result<String> {
    match arg {
        Some(arg) if arg != "-" && !arg.is_empty() => Ok(arg),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read message from stdin")?;
            Ok(buffer)
        }
    }
}
