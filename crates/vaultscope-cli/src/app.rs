//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vaultscope")]
#[command(
    author,
    version,
    about = "Citation-grounded research over your private document vault"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage research queries
    Query(QueryArgs),

    /// Run research for a query
    Run(RunArgs),

    /// Manage vault documents
    Vault(VaultArgs),

    /// Inspect research results
    Result(ResultArgs),

    /// Record or list feedback
    Feedback(FeedbackArgs),

    /// Show research metrics
    Metrics,
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub action: QueryAction,
}

#[derive(Subcommand)]
pub enum QueryAction {
    /// Submit a new research query
    Add {
        /// Query text
        #[arg(required = true)]
        text: Vec<String>,
        /// Query this one refines
        #[arg(long)]
        parent: Option<i64>,
    },
    /// List queries, newest first
    List {
        /// Filter by status (pending, in_progress, completed, failed)
        #[arg(long)]
        status: Option<String>,
        /// Only saved queries
        #[arg(long)]
        saved: bool,
        /// Only refinements of this query
        #[arg(long)]
        parent: Option<i64>,
        /// Maximum number of queries
        #[arg(short = 'n')]
        limit: Option<usize>,
    },
    /// Show a query and its latest result
    Show { id: i64 },
    /// Bookmark a query
    Save {
        id: i64,
        /// Remove the bookmark instead
        #[arg(long)]
        unset: bool,
    },
    /// List refinements of a query
    Related { id: i64 },
}

#[derive(Args)]
pub struct RunArgs {
    /// Query id
    pub query_id: i64,

    /// Restrict retrieval to these vault documents
    #[arg(long = "doc", value_name = "ID")]
    pub docs: Vec<i64>,
}

#[derive(Args)]
pub struct VaultArgs {
    #[command(subcommand)]
    pub action: VaultAction,
}

#[derive(Subcommand)]
pub enum VaultAction {
    /// Add a document to the vault
    Add {
        #[arg(long)]
        title: String,
        /// Document body
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read the document body from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Where the document came from
        #[arg(long)]
        url: Option<String>,
    },
    /// List vault documents, newest first
    List {
        /// Maximum number of documents
        #[arg(short = 'n')]
        limit: Option<usize>,
        /// Case-insensitive substring filter over title and content
        #[arg(long)]
        search: Option<String>,
    },
    /// Remove a document
    #[command(alias = "rm")]
    Remove { id: i64 },
    /// Manage notes on a document
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// Attach a note to a document
    Add {
        /// Document id
        doc_id: i64,
        /// Note text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List notes on a document, newest first
    List {
        /// Document id
        doc_id: i64,
    },
    /// Remove a note
    #[command(alias = "rm")]
    Remove { id: i64 },
}

#[derive(Args)]
pub struct ResultArgs {
    #[command(subcommand)]
    pub action: ResultAction,
}

#[derive(Subcommand)]
pub enum ResultAction {
    /// Show a result with its report, citations and feedback
    Show { id: i64 },
    /// List results for a query, newest first
    List { query_id: i64 },
}

#[derive(Args)]
pub struct FeedbackArgs {
    #[command(subcommand)]
    pub action: FeedbackAction,
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Record feedback on a result or query
    Add {
        #[arg(long)]
        result: Option<i64>,
        #[arg(long)]
        query: Option<i64>,
        /// Rating from 1 to 5
        #[arg(long)]
        rating: Option<i64>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// List feedback for a result or query
    List {
        #[arg(long, conflicts_with = "query")]
        result: Option<i64>,
        #[arg(long)]
        query: Option<i64>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
