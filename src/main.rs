use clap::Parser;
use colored::*;
use decomplex::cli::{Cli, Commands};
use decomplex::DecomplexError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins, then DECOMPLEX_LOG, then the -v count
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let log_level = std::env::var("DECOMPLEX_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<DecomplexError>() {
            Some(DecomplexError::Config(_)) => 2,
            Some(DecomplexError::Io(_)) | Some(DecomplexError::InputNotFound(_)) => 3,
            Some(DecomplexError::Parse(_))
            | Some(DecomplexError::MalformedMatrixLine { .. })
            | Some(DecomplexError::MalformedLabelLine { .. }) => 4,
            Some(DecomplexError::Aligner(_)) => 5,
            Some(DecomplexError::AlignerTimeout { .. }) => 6,
            None => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose > 0 {
        let threads = if cli.threads == 0 {
            num_cpus::get()
        } else {
            cli.threads
        };
        eprintln!("Using up to {} aligner threads", threads);
    }

    match cli.command {
        Commands::Remove(args) => decomplex::cli::commands::remove::run(args, cli.threads),
        Commands::Matrix(args) => decomplex::cli::commands::matrix::run(args, cli.threads),
    }
}
