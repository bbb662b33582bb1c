use crate::bio::labels::ClassTable;
use crate::cli::commands::{CommonArgs, RunContext};
use crate::cli::formatter::{self, print_output_file, print_section, print_success, print_warning};
use crate::core::pipeline::DecomplexOutcome;
use crate::report::json::RunSummary;
use crate::report::{save_cluster_report, save_filtered_fasta};
use anyhow::Context;
use clap::Args;
use colored::*;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Similarity threshold for linking two sequences [default: 1.0]
    #[arg(short = 't', long, visible_alias = "threshold", value_name = "SCORE")]
    pub cutoff: Option<f64>,

    /// Tab-separated classification file (sequence id, labels...)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub classification: Option<PathBuf>,

    /// Column of the classification file holding the label [default: 0]
    #[arg(short = 'p', long, value_name = "COLUMN")]
    pub classificationpos: Option<usize>,
}

pub fn run(args: RemoveArgs, threads: usize) -> anyhow::Result<()> {
    formatter::init();

    let mut ctx = RunContext::prepare(&args.common, threads)?;
    if let Some(cutoff) = args.cutoff {
        ctx.config.clustering.threshold = cutoff;
    }
    if let Some(position) = args.classificationpos {
        ctx.config.labels.position = position;
    }
    ctx.config.validate()?;

    let classes = match &args.classification {
        Some(path) => {
            let known: HashSet<&str> = ctx.sequences.iter().map(|s| s.id.as_str()).collect();
            ClassTable::load(path, &known, &ctx.config.label_options())
                .with_context(|| format!("Failed to load classification {}", path.display()))?
        }
        None => {
            print_warning("no classification file given; every label is empty and nothing will be removed");
            ClassTable::new()
        }
    };

    let (matrix, source) = ctx.similarity()?;
    let outcome = ctx
        .decomplexer()
        .evaluate(&ctx.sequences, &classes, &matrix, source)?;

    write_score_table(&mut std::io::stdout().lock(), &outcome)?;

    let by_id = crate::bio::fasta::index_by_id(&ctx.sequences)?;
    save_cluster_report(&ctx.paths.cluster_report, &outcome, &by_id, &classes)?;

    let retained = outcome.retained(&ctx.sequences, &classes);
    save_filtered_fasta(&ctx.paths.filtered_fasta, &retained)?;

    let summary = RunSummary::from_outcome(
        &ctx.input,
        ctx.config.clustering.min_coverage,
        ctx.sequences.len(),
        retained.len(),
        &outcome,
    );
    summary.save(&ctx.paths.summary)?;

    print_section("Results");
    println!(
        "  {} clusters, {} sequences kept of {}",
        outcome.clusters.len().to_string().bold(),
        retained.len().to_string().bold(),
        ctx.sequences.len()
    );
    if !outcome.removed_labels.is_empty() {
        let removed: Vec<&str> = outcome.removed_labels.iter().map(String::as_str).collect();
        println!("  Removed complex members: {}", removed.join(", ").yellow());
    }

    print_output_file("Cluster report", &ctx.paths.cluster_report);
    print_output_file("Filtered sequences", &ctx.paths.filtered_fasta);
    print_output_file("Run summary", &ctx.paths.summary);
    print_success("Done");

    Ok(())
}

/// The two-line `Threshold\tFmeasure` table printed after clustering
pub fn write_score_table<W: Write>(writer: &mut W, outcome: &DecomplexOutcome) -> std::io::Result<()> {
    writeln!(writer, "Threshold\tFmeasure")?;
    writeln!(writer, "{}\t{}", outcome.threshold, outcome.f_measure)
}
