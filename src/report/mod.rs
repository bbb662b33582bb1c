use crate::bio::fasta::write_fasta_to_writer;
use crate::bio::labels::ClassTable;
use crate::bio::sequence::Sequence;
use crate::core::pipeline::DecomplexOutcome;
use crate::Result;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub mod json;

pub const CLUSTER_REPORT_HEADER: &str = "ClusterID\tSequenceID\tClassification\tPrediction";

/// Write the per-sequence cluster table.
///
/// One row per clustered sequence: cluster id, full sequence description,
/// ground-truth label and the majority label of its cluster.
pub fn write_cluster_report<W: Write>(
    writer: &mut W,
    outcome: &DecomplexOutcome,
    sequences: &IndexMap<&str, &Sequence>,
    classes: &ClassTable,
) -> Result<()> {
    writeln!(writer, "{}", CLUSTER_REPORT_HEADER)?;

    for (cluster, composition) in outcome.clusters.iter().zip(&outcome.compositions) {
        let predicted = composition.predicted();
        for member in &cluster.members {
            let Some(seq) = sequences.get(member.as_str()) else {
                continue;
            };
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                cluster.id,
                seq.full_description(),
                classes.label_of(member),
                predicted
            )?;
        }
    }

    Ok(())
}

pub fn save_cluster_report<P: AsRef<Path>>(
    path: P,
    outcome: &DecomplexOutcome,
    sequences: &IndexMap<&str, &Sequence>,
    classes: &ClassTable,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_cluster_report(&mut writer, outcome, sequences, classes)?;
    writer.flush()?;
    Ok(())
}

/// Write the sequences that survived complex removal, in input order
pub fn save_filtered_fasta<P: AsRef<Path>>(path: P, retained: &[&Sequence]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_fasta_to_writer(&mut writer, retained.iter().copied())?;
    writer.flush()?;
    Ok(())
}
