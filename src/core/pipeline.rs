/// One decomplexing run: similarity, clustering, evaluation, complex removal
use crate::bio::fasta::index_by_id;
use crate::bio::labels::ClassTable;
use crate::bio::sequence::Sequence;
use crate::core::clusterer::{cluster_points, points_by_id, Cluster, Point};
use crate::core::complexes::{compositions, resolve_complexes, ClusterComposition};
use crate::core::evaluation::f_measure;
use crate::core::graph::build_graph;
use crate::core::similarity::{CachePolicy, MatrixSource, SimilarityBuilder, SimilarityMatrix};
use crate::tools::traits::Aligner;
use crate::{DecomplexError, Result};
use indexmap::IndexSet;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub struct Decomplexer {
    threshold: f64,
    min_coverage: usize,
    matrix_path: Option<PathBuf>,
    cache_policy: CachePolicy,
    silent: bool,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct DecomplexOutcome {
    pub threshold: f64,
    pub clusters: Vec<Cluster>,
    pub f_measure: f64,
    pub compositions: Vec<ClusterComposition>,
    /// Labels whose sequences are dropped from the filtered output
    pub removed_labels: IndexSet<String>,
    pub matrix_source: MatrixSource,
}

impl DecomplexOutcome {
    /// Sequences whose label survived complex resolution, in input order
    pub fn retained<'a>(&self, sequences: &'a [Sequence], classes: &ClassTable) -> Vec<&'a Sequence> {
        sequences
            .iter()
            .filter(|seq| !self.removed_labels.contains(classes.label_of(&seq.id)))
            .collect()
    }
}

impl Default for Decomplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Decomplexer {
    pub fn new() -> Self {
        Self {
            threshold: 1.0,
            min_coverage: 400,
            matrix_path: None,
            cache_policy: CachePolicy::ReuseExisting,
            silent: false,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_coverage(mut self, min_coverage: usize) -> Self {
        self.min_coverage = min_coverage;
        self
    }

    /// Matrix file to reuse or (re)write
    pub fn with_matrix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.matrix_path = Some(path.into());
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    fn check_threshold(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(DecomplexError::Config(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Load the cached matrix or align `sequences` against themselves
    pub fn similarity<A: Aligner + ?Sized>(
        &self,
        sequences: &[Sequence],
        aligner: &mut A,
    ) -> Result<(SimilarityMatrix, MatrixSource)> {
        if let (Some(path), CachePolicy::ReuseExisting) = (&self.matrix_path, self.cache_policy) {
            if path.exists() {
                return SimilarityBuilder::new(aligner, self.min_coverage)
                    .with_cache(path, self.cache_policy)
                    .build(sequences);
            }
        }

        let spinner = if self.silent {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        };
        spinner.set_message(format!(
            "Aligning {} sequences with {}",
            sequences.len(),
            aligner.name()
        ));

        let mut builder = SimilarityBuilder::new(aligner, self.min_coverage);
        if let Some(path) = &self.matrix_path {
            builder = builder.with_cache(path, self.cache_policy);
        }
        let result = builder.build(sequences);
        spinner.finish_and_clear();
        result
    }

    pub fn run<A: Aligner + ?Sized>(
        &self,
        sequences: &[Sequence],
        classes: &ClassTable,
        aligner: &mut A,
    ) -> Result<DecomplexOutcome> {
        self.check_threshold()?;
        index_by_id(sequences)?;
        let (matrix, matrix_source) = self.similarity(sequences, aligner)?;
        self.evaluate(sequences, classes, &matrix, matrix_source)
    }

    /// Cluster, score and resolve complexes over an already built matrix
    pub fn evaluate(
        &self,
        sequences: &[Sequence],
        classes: &ClassTable,
        matrix: &SimilarityMatrix,
        matrix_source: MatrixSource,
    ) -> Result<DecomplexOutcome> {
        self.check_threshold()?;
        let by_id = index_by_id(sequences)?;

        let ids: Vec<&str> = by_id.keys().copied().collect();
        let graph = build_graph(&ids, matrix, self.threshold);
        info!(
            "Neighbor graph at threshold {}: {} sequences, {} edges",
            self.threshold,
            graph.node_count(),
            graph.edge_count()
        );

        let points = points_by_id(graph.into_adjacency().into_iter().map(|(id, neighbors)| {
            let payload = by_id.get(id.as_str()).copied();
            let point = Point::new(id, neighbors.into_iter().collect());
            match payload {
                Some(seq) => point.with_payload(seq),
                None => point,
            }
        }));
        let clusters = cluster_points(points);
        let score = f_measure(classes.groups(), &clusters);
        info!("{} clusters, F-measure {:.4}", clusters.len(), score);

        let compositions = compositions(&clusters, classes);
        let removed_labels = resolve_complexes(&compositions, classes);
        info!(
            "{} of {} clusters mix labels; {} labels marked for removal",
            compositions.iter().filter(|c| c.is_complex()).count(),
            compositions.len(),
            removed_labels.len()
        );

        Ok(DecomplexOutcome {
            threshold: self.threshold,
            clusters,
            f_measure: score,
            compositions,
            removed_labels,
            matrix_source,
        })
    }
}
