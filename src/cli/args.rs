//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Merge taxonomy lineages into one tree and render, compact or export it
#[derive(Parser, Debug)]
#[command(name = "taxotree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory with nodes.dmp and names.dmp (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub taxdump: Option<PathBuf>,

    /// Taxonomy root identifier (overrides config); lineages are cut to start here
    #[arg(long, global = true)]
    pub root: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where entity names come from.
#[derive(Args, Debug, Clone)]
pub struct EntityArgs {
    /// Entity names, e.g. "Tribolium madens"
    pub names: Vec<String>,

    /// File with one entity per line, optionally followed by TAB and a score
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the merged tree as an indented listing
    Tree {
        #[command(flatten)]
        entities: EntityArgs,

        /// Show only leaves and branch points
        #[arg(short, long)]
        compact: bool,
    },

    /// Print the merged tree as Newick, optionally writing it to a file
    Export {
        #[command(flatten)]
        entities: EntityArgs,

        /// Output file (default: export.output from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Leaf attributes to embed in the written file
        #[arg(long, value_delimiter = ',')]
        attributes: Option<Vec<String>>,

        /// Also draw the tree as an ASCII diagram
        #[arg(long)]
        ascii: bool,
    },

    /// Show the resolved lineage of one entity
    Lineage {
        /// Entity name
        name: String,
    },

    /// Draw a Newick file as an ASCII diagram
    Show {
        /// Newick file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Write ./.taxotree.toml instead of the global config
        #[arg(short, long)]
        local: bool,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
