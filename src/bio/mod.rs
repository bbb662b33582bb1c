pub mod fasta;
pub mod labels;
pub mod sequence;

pub use labels::ClassTable;
pub use sequence::Sequence;
