/// Pairwise similarity matrix and its construction from aligner hits
///
/// The matrix is sparse: a missing entry means the aligner reported no
/// evidence of similarity for that pair. Scores are stored per direction so a
/// cached file loads back exactly as written.
use crate::bio::sequence::Sequence;
use crate::tools::traits::{Aligner, AlignmentHit};
use crate::{DecomplexError, Result};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    rows: IndexMap<String, IndexMap<String, f64>>,
}

impl SimilarityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score of `i` against `j`, if one was recorded
    pub fn get(&self, i: &str, j: &str) -> Option<f64> {
        self.rows.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Every recorded score of `i`, in insertion order
    pub fn row(&self, i: &str) -> Option<&IndexMap<String, f64>> {
        self.rows.get(i)
    }

    /// Record one direction, keeping the larger score if one exists
    pub fn insert_max(&mut self, i: &str, j: &str, score: f64) {
        let row = self.rows.entry(i.to_string()).or_default();
        match row.get_mut(j) {
            Some(existing) if *existing >= score => {}
            Some(existing) => *existing = score,
            None => {
                row.insert(j.to_string(), score);
            }
        }
    }

    /// Record both directions of a pair
    pub fn insert_pair_max(&mut self, i: &str, j: &str, score: f64) {
        self.insert_max(i, j, score);
        self.insert_max(j, i, score);
    }

    /// Number of stored (directed) entries
    pub fn len(&self) -> usize {
        self.rows.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(IndexMap::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.rows.iter().flat_map(|(i, row)| {
            row.iter()
                .map(move |(j, score)| (i.as_str(), j.as_str(), *score))
        })
    }

    /// Load a matrix file: one `id1 id2 score` line per entry.
    ///
    /// Duplicate lines keep the maximum score. A line that does not parse
    /// fails the load.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        crate::require_input(path)?;
        let reader = BufReader::new(File::open(path)?);
        Self::from_reader(reader, path)
    }

    pub fn from_reader<R: BufRead>(reader: R, source: &Path) -> Result<Self> {
        let mut matrix = Self::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let malformed = || DecomplexError::MalformedMatrixLine {
                path: source.to_path_buf(),
                line: index + 1,
                content: line.clone(),
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return Err(malformed());
            }
            let score: f64 = fields[2].parse().map_err(|_| malformed())?;
            if !score.is_finite() {
                return Err(malformed());
            }

            matrix.insert_max(fields[0], fields[1], score);
        }

        Ok(matrix)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for (i, j, score) in self.iter() {
            writeln!(writer, "{} {} {}", i, j, score)?;
        }
        Ok(())
    }
}

/// Identity scaled down for alignments shorter than `min_coverage`
pub fn coverage_score(identity_percent: f64, coverage: usize, min_coverage: usize) -> f64 {
    let sim = identity_percent / 100.0;
    if coverage >= min_coverage {
        sim
    } else {
        sim * coverage as f64 / min_coverage as f64
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Turn aligner hits into a symmetric matrix over `sequences`.
///
/// Every sequence scores 1 against itself. Hits naming ids outside the
/// sequence set are ignored.
pub fn matrix_from_hits(
    sequences: &[Sequence],
    hits: &[AlignmentHit],
    min_coverage: usize,
) -> SimilarityMatrix {
    let mut matrix = SimilarityMatrix::new();
    for seq in sequences {
        matrix.insert_max(&seq.id, &seq.id, 1.0);
    }

    let mut ignored = 0usize;
    for hit in hits {
        if matrix.row(&hit.query_id).is_none() || matrix.row(&hit.subject_id).is_none() {
            debug!(
                "Ignoring hit {} -> {}: not in the sequence set",
                hit.query_id, hit.subject_id
            );
            ignored += 1;
            continue;
        }

        let score = round4(coverage_score(hit.identity, hit.coverage(), min_coverage));
        matrix.insert_pair_max(&hit.query_id, &hit.subject_id, score);
    }

    if ignored > 0 {
        debug!("Ignored {} hits with unknown sequence ids", ignored);
    }

    matrix
}

/// Whether an existing matrix file may stand in for a fresh alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    ReuseExisting,
    Recompute,
}

/// Where a matrix came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixSource {
    Cache(PathBuf),
    Aligner { saved_to: Option<PathBuf> },
}

/// Loads a cached matrix or builds one with an aligner
pub struct SimilarityBuilder<'a, A: Aligner + ?Sized> {
    aligner: &'a mut A,
    min_coverage: usize,
    cache_path: Option<PathBuf>,
    policy: CachePolicy,
}

impl<'a, A: Aligner + ?Sized> SimilarityBuilder<'a, A> {
    pub fn new(aligner: &'a mut A, min_coverage: usize) -> Self {
        Self {
            aligner,
            min_coverage,
            cache_path: None,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_cache(mut self, path: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        self.cache_path = Some(path.into());
        self.policy = policy;
        self
    }

    pub fn build(&mut self, sequences: &[Sequence]) -> Result<(SimilarityMatrix, MatrixSource)> {
        if let (Some(path), CachePolicy::ReuseExisting) = (&self.cache_path, self.policy) {
            if path.exists() {
                info!("Loading similarity matrix {}", path.display());
                let matrix = SimilarityMatrix::load(path)?;
                return Ok((matrix, MatrixSource::Cache(path.clone())));
            }
        }

        info!(
            "Computing similarity matrix for {} sequences with {}",
            sequences.len(),
            self.aligner.name()
        );
        let hits = self.aligner.search_all_vs_all(sequences)?;
        let matrix = matrix_from_hits(sequences, &hits, self.min_coverage);

        // Only a complete matrix reaches the cache
        if let Some(path) = &self.cache_path {
            info!("Saving similarity matrix {}", path.display());
            matrix.save(path)?;
        }

        Ok((
            matrix,
            MatrixSource::Aligner {
                saved_to: self.cache_path.clone(),
            },
        ))
    }
}
