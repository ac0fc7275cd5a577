//! CLI struct definitions for the reqtrack command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use crate::core::lifecycle::RequestKind;
use crate::core::request::Priority;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(
    name = "reqtrack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track build, support, and intelligence requests through their lifecycles."
)]
pub(crate) struct Cli {
    /// Config file or directory containing reqtrack.toml (defaults to the working directory).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// JSON seed collection (defaults to the embedded sample).
    #[clap(long, global = true)]
    pub seed: Option<PathBuf>,
    /// Output format for this command.
    #[clap(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List requests, newest first.
    #[clap(name = "list", visible_alias = "ls")]
    List {
        #[clap(long, value_enum)]
        kind: Option<RequestKind>,
        /// Status name; requires --kind.
        #[clap(long, requires = "kind")]
        status: Option<String>,
        #[clap(long, value_enum)]
        priority: Option<Priority>,
    },
    /// Show one request with its legal next statuses.
    Show {
        #[clap(long)]
        id: String,
    },
    /// Print the legal next statuses for a status of a request kind.
    Next {
        #[clap(long, value_enum)]
        kind: RequestKind,
        #[clap(long)]
        status: String,
    },
    /// Status, priority and SLA breakdown.
    Summary {
        #[clap(long, value_enum)]
        kind: Option<RequestKind>,
        /// Only count requests with this scope label.
        #[clap(long)]
        scope: Option<String>,
    },
    /// Open requests grouped by SLA class.
    Sla {
        #[clap(long, value_enum)]
        kind: Option<RequestKind>,
    },
    /// Most recent submissions, completions and activity.
    Feed {
        /// Number of entries (defaults to feed.limit from config).
        #[clap(long)]
        limit: Option<usize>,
    },
    /// Apply a JSON-lines mutation script to the seeded store and report.
    Replay {
        #[clap(long)]
        script: PathBuf,
    },
}
