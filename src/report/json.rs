use crate::core::pipeline::DecomplexOutcome;
use crate::core::similarity::MatrixSource;
use crate::{DecomplexError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Machine-readable record of one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub input: PathBuf,
    pub threshold: f64,
    pub min_coverage: usize,
    pub f_measure: f64,
    pub sequences: usize,
    pub clusters: usize,
    pub complex_clusters: usize,
    pub retained_sequences: usize,
    pub removed_labels: Vec<String>,
    /// Matrix file loaded or written, if any
    pub similarity_matrix: Option<PathBuf>,
    pub matrix_from_cache: bool,
}

impl RunSummary {
    pub fn from_outcome(
        input: &Path,
        min_coverage: usize,
        sequences: usize,
        retained_sequences: usize,
        outcome: &DecomplexOutcome,
    ) -> Self {
        let (similarity_matrix, matrix_from_cache) = match &outcome.matrix_source {
            MatrixSource::Cache(path) => (Some(path.clone()), true),
            MatrixSource::Aligner { saved_to } => (saved_to.clone(), false),
        };

        Self {
            input: input.to_path_buf(),
            threshold: outcome.threshold,
            min_coverage,
            f_measure: outcome.f_measure,
            sequences,
            clusters: outcome.clusters.len(),
            complex_clusters: outcome.compositions.iter().filter(|c| c.is_complex()).count(),
            retained_sequences,
            removed_labels: outcome.removed_labels.iter().cloned().collect(),
            similarity_matrix,
            matrix_from_cache,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DecomplexError::Parse(format!("Failed to serialize summary: {}", e)))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
