pub mod commands;
pub mod formatter;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "decomplex",
    version,
    about = "Remove redundant species complexes from DNA barcode reference sets",
    long_about = "Decomplex clusters barcode sequences by pairwise BLAST similarity, scores the \
                  clustering against known taxon labels, and drops the sequences of taxa that \
                  cannot be told apart from a better-supported taxon at the chosen threshold."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of aligner threads (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster sequences and remove redundant complex members
    Remove(commands::remove::RemoveArgs),

    /// Build or refresh the cached similarity matrix only
    Matrix(commands::matrix::MatrixArgs),
}
