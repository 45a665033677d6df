use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "docsift",
    about = "Document outline extraction and persona-driven hybrid retrieval"
)]
pub struct Cli {
    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the title and heading outline of documents
    Outline(OutlineArgs),
    /// List the flat heading texts of a document
    Headings(HeadingsArgs),
    /// Split documents into heading-anchored content chunks
    Chunks(ChunksArgs),
    /// Rank chunks across documents for a persona and task
    Search(SearchArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Outline --

#[derive(Debug, Parser)]
pub struct OutlineArgs {
    /// Decoded document dumps (JSON), one per source PDF
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Headings --

#[derive(Debug, Parser)]
pub struct HeadingsArgs {
    /// Decoded document dump (JSON)
    pub document: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Chunks --

#[derive(Debug, Parser)]
pub struct ChunksArgs {
    /// Decoded document dumps (JSON), one per source PDF
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Decoded document dumps (JSON), one per source PDF
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Who is asking, e.g. "Travel Planner"
    #[arg(short, long)]
    pub persona: String,

    /// What they need, e.g. "Plan a 4-day trip for 10 college friends"
    #[arg(short, long)]
    pub task: String,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,

    /// Override the detected domain (travel, research, business,
    /// culinary, general)
    #[arg(long)]
    pub domain: Option<String>,

    /// Skip the embedding model and rank by BM25 alone
    #[arg(long)]
    pub lexical_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docsift",
            &mut std::io::stdout(),
        );
    }
}
