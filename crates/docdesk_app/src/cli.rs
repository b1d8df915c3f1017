use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "docdesk", version, about = "Upload, index and question documents on a RAG server.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Server base URL; overrides the config file.
    #[arg(long, global = true, env = "DOCDESK_SERVER")]
    pub server: Option<String>,

    /// Config file (defaults to ./docdesk.ron when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List uploaded documents.
    List,
    /// Upload files one after another.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete one uploaded document.
    Delete {
        name: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Delete every uploaded document.
    DeleteAll {
        #[arg(long)]
        yes: bool,
    },
    /// Build the vector index from the uploaded documents.
    Index {
        #[arg(long)]
        chunk_size: Option<u32>,
        #[arg(long)]
        chunk_overlap: Option<u32>,
        #[arg(long)]
        embedding_model: Option<String>,
    },
    /// Show index statistics.
    Stats,
    /// Delete the vector index.
    DeleteIndex {
        #[arg(long)]
        yes: bool,
    },
    /// Ask a single question.
    Ask {
        question: String,
        #[command(flatten)]
        params: SearchArgs,
    },
    /// Interactive conversation (/clear, /sources on|off, /quit).
    Chat {
        #[command(flatten)]
        params: SearchArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    /// Number of chunks to retrieve.
    #[arg(long)]
    pub top_k: Option<u32>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    #[arg(long)]
    pub system_prompt: Option<String>,
    /// Hide the cited sources.
    #[arg(long)]
    pub no_sources: bool,
}
