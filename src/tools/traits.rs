/// Trait definitions for the external aligner seam
///
/// The similarity builder only needs pairwise local-alignment hits, so any
/// tool (or a canned test double) that can produce them plugs in here.
use crate::bio::sequence::Sequence;
use crate::Result;

/// One local-alignment hit, as reported in BLAST tabular output
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentHit {
    pub query_id: String,
    pub subject_id: String,
    /// Percent identity, 0-100
    pub identity: f64,
    pub alignment_length: usize,
    pub query_start: usize,
    pub query_end: usize,
}

impl AlignmentHit {
    pub fn new(
        query_id: impl Into<String>,
        subject_id: impl Into<String>,
        identity: f64,
        query_start: usize,
        query_end: usize,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            subject_id: subject_id.into(),
            identity,
            alignment_length: query_end.abs_diff(query_start),
            query_start,
            query_end,
        }
    }

    /// Span of the alignment on the query
    pub fn coverage(&self) -> usize {
        self.query_end.abs_diff(self.query_start)
    }
}

/// Common interface for sequence alignment tools
pub trait Aligner {
    /// Align every query against the reference set.
    ///
    /// Either all hits are returned or the call fails; there is no partial
    /// result.
    fn search(&mut self, query: &[Sequence], reference: &[Sequence]) -> Result<Vec<AlignmentHit>>;

    /// Verify that the tool is properly installed
    fn verify_installation(&self) -> Result<()>;

    /// Get the name of this aligner
    fn name(&self) -> &str;

    /// Self-alignment of a sequence set
    fn search_all_vs_all(&mut self, sequences: &[Sequence]) -> Result<Vec<AlignmentHit>> {
        self.search(sequences, sequences)
    }
}
