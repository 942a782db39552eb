use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "converge")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative reconciliation of remote infrastructure objects", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Reconciler config file (default: <config dir>/config.toml)
    #[arg(long, global = true, env = "CONVERGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List built-in resource types
    Types,

    /// Show the schema of a resource type
    Schema {
        /// Resource type, e.g. codebuild_project
        resource_type: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Expand a declared document into the remote request
    Expand(DocumentArgs),

    /// Show content identities of block set members
    Identity(DocumentArgs),

    /// Show drift between a declared and an observed document
    Diff {
        /// Resource type, e.g. codebuild_project
        resource_type: String,

        /// Declared document (JSON, '-' for stdin)
        declared: PathBuf,

        /// Observed document (JSON)
        observed: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective reconciler configuration
    Config {
        /// Only print the config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct DocumentArgs {
    /// Resource type, e.g. codebuild_project
    pub resource_type: String,

    /// Declared document (JSON, '-' for stdin)
    pub document: PathBuf,
}
