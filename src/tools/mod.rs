pub mod blast;
pub mod mock;
pub mod traits;

pub use blast::{BlastAligner, BlastOptions};
pub use mock::MockAligner;
pub use traits::{Aligner, AlignmentHit};
