mod client;
mod filter;
mod lister;
mod query;
mod summarizer;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::client::HttpCompletionClient;
use crate::filter::PatternSet;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Automatically create descriptions of directories and the files within"
)]
struct Args {
    /// Base URL of the OpenAI-compatible endpoint used for summarization
    #[arg(
        long,
        global = true,
        env = "DIRSCRIBE_AI_ENDPOINT",
        default_value = "http://localhost:8080/v1"
    )]
    ai_endpoint: String,

    /// API key for the endpoint, if it requires one
    #[arg(long, global = true, env = "DIRSCRIBE_AI_KEY")]
    ai_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the files and subdirectories of a directory
    #[command(alias = "ls")]
    List {
        /// The directory to list
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,
    },
    /// Send a free-text prompt to the endpoint
    #[command(alias = "q")]
    Query {
        /// Persona to answer as
        #[arg(short, long, default_value = query::DEFAULT_PERSONA)]
        persona: String,

        /// The message to send; reads standard input when absent or `-`
        message: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let client = HttpCompletionClient::new(&args.ai_endpoint, args.ai_key)?;

    match args.command {
        Command::List { directory } => {
            let patterns = PatternSet::load(&directory.join(".gitignore"));
            let summaries = summarizer::summarize_directory(&directory, &patterns, &client)?;
            summarizer::render_report(&summaries, &mut io::stdout().lock())?;
        }
        Command::Query { persona, message } => {
            let message = query::read_message(message)?;
            let personas = query::persona_registry();
            let response = query::run_query(&message, &persona, &personas, &client)?;
            println!("{response}");
        }
    }

    Ok(())
}
