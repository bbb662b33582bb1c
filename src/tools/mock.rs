use crate::bio::sequence::Sequence;
use crate::tools::traits::{Aligner, AlignmentHit};
use crate::{DecomplexError, Result};

/// Aligner double that replays canned hits, or fails on demand
#[derive(Debug, Clone, Default)]
pub struct MockAligner {
    hits: Vec<AlignmentHit>,
    failure: Option<String>,
    calls: usize,
}

impl MockAligner {
    pub fn with_hits(hits: Vec<AlignmentHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    /// Every search fails with an `Aligner` error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of searches run so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Aligner for MockAligner {
    fn search(&mut self, _query: &[Sequence], _reference: &[Sequence]) -> Result<Vec<AlignmentHit>> {
        self.calls += 1;
        match &self.failure {
            Some(message) => Err(DecomplexError::Aligner(message.clone())),
            None => Ok(self.hits.clone()),
        }
    }

    fn verify_installation(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
