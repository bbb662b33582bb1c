use crate::cli::commands::{CommonArgs, RunContext};
use crate::cli::formatter::{self, print_output_file, print_success, print_tip};
use crate::core::similarity::MatrixSource;
use clap::Args;

#[derive(Args, Debug)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: MatrixArgs, threads: usize) -> anyhow::Result<()> {
    formatter::init();

    let ctx = RunContext::prepare(&args.common, threads)?;
    let (matrix, source) = ctx.similarity()?;

    match source {
        MatrixSource::Cache(path) => {
            print_success(&format!("Similarity matrix already present ({} entries)", matrix.len()));
            print_output_file("Similarity matrix", &path);
            print_tip("pass --recompute to align again");
        }
        MatrixSource::Aligner { .. } => {
            print_success(&format!(
                "Similarity matrix built for {} sequences ({} entries)",
                ctx.sequences.len(),
                matrix.len()
            ));
            print_output_file("Similarity matrix", &ctx.paths.similarity);
            print_tip("`decomplex remove` with any --cutoff now reuses this matrix");
        }
    }

    Ok(())
}
