pub mod matrix;
pub mod remove;

use crate::bio::fasta::{index_by_id, parse_fasta};
use crate::bio::sequence::Sequence;
use crate::core::config::{load_config, Config};
use crate::core::pipeline::Decomplexer;
use crate::core::similarity::{CachePolicy, MatrixSource, SimilarityMatrix};
use crate::tools::blast::BlastAligner;
use crate::tools::traits::Aligner;
use crate::utils::paths::{ensure_output_dir, OutputPaths};
use crate::DecomplexError;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

/// Options shared by every subcommand that needs a similarity matrix
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// FASTA file to be clustered
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Minimum alignment length before scores are penalised [default: 400].
    /// Short barcodes such as ITS1 or ITS2 usually want 100.
    #[arg(long, visible_alias = "mc", value_name = "LENGTH")]
    pub mincoverage: Option<usize>,

    /// Output folder [default: dnabarcoder]
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Similarity matrix file to reuse [default: <out>/<input stem>.sim]
    #[arg(long, visible_alias = "sim", value_name = "FILE")]
    pub simfilename: Option<PathBuf>,

    /// Align again even if the similarity matrix file exists
    #[arg(long)]
    pub recompute: bool,

    /// Configuration file
    #[arg(long, env = "DECOMPLEX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hide the progress spinner
    #[arg(short, long)]
    pub quiet: bool,
}

/// Inputs resolved once per command
pub struct RunContext {
    pub config: Config,
    pub input: PathBuf,
    pub sequences: Vec<Sequence>,
    pub paths: OutputPaths,
    pub cache_policy: CachePolicy,
    pub quiet: bool,
}

impl RunContext {
    /// Resolve configuration, read the input and lay out the output files
    pub fn prepare(args: &CommonArgs, threads: usize) -> anyhow::Result<Self> {
        let config = resolve_config(args, threads)?;

        crate::require_input(&args.input)?;
        let sequences = parse_fasta(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?;
        if sequences.is_empty() {
            return Err(DecomplexError::Parse(format!(
                "No sequences found in {}",
                args.input.display()
            ))
            .into());
        }
        index_by_id(&sequences)?;
        debug!("Loaded {} sequences from {}", sequences.len(), args.input.display());

        ensure_output_dir(&config.output.directory).with_context(|| {
            format!(
                "Failed to create output folder {}",
                config.output.directory.display()
            )
        })?;

        let cache_policy = if args.recompute {
            CachePolicy::Recompute
        } else {
            CachePolicy::ReuseExisting
        };

        // A matrix named on the command line has to exist unless it is being rebuilt
        if let Some(explicit) = &args.simfilename {
            if cache_policy == CachePolicy::ReuseExisting {
                crate::require_input(explicit)?;
            }
        }

        let paths = OutputPaths::new(&config.output.directory, &args.input)
            .with_similarity(args.simfilename.clone());

        Ok(Self {
            config,
            input: args.input.clone(),
            sequences,
            paths,
            cache_policy,
            quiet: args.quiet,
        })
    }

    pub fn decomplexer(&self) -> Decomplexer {
        Decomplexer::new()
            .with_threshold(self.config.clustering.threshold)
            .with_min_coverage(self.config.clustering.min_coverage)
            .with_matrix_path(&self.paths.similarity)
            .with_cache_policy(self.cache_policy)
            .with_silent(self.quiet)
    }

    /// Load the cached matrix, or run BLAST and save a fresh one
    pub fn similarity(&self) -> anyhow::Result<(SimilarityMatrix, MatrixSource)> {
        let path = &self.paths.similarity;
        if self.cache_policy == CachePolicy::ReuseExisting && path.exists() {
            println!("Loading similarity matrix {}", path.display());
            let matrix = SimilarityMatrix::load(path)?;
            return Ok((matrix, MatrixSource::Cache(path.clone())));
        }

        println!("Computing similarity matrix...");
        let mut aligner = BlastAligner::new(self.config.blast_options())?;
        aligner.verify_installation()?;

        let result = self
            .decomplexer()
            .similarity(&self.sequences, &mut aligner)
            .context("Similarity matrix could not be computed")?;
        println!("Saved similarity matrix {}", path.display());
        Ok(result)
    }
}

/// Config file (if any) with command-line values laid over it
pub fn resolve_config(args: &CommonArgs, threads: usize) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(min_coverage) = args.mincoverage {
        config.clustering.min_coverage = min_coverage;
    }
    if let Some(out) = &args.out {
        config.output.directory = out.clone();
    }
    if threads > 0 {
        config.aligner.threads = threads;
    }

    config.validate()?;
    Ok(config)
}
