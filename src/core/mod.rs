pub mod clusterer;
pub mod complexes;
pub mod config;
pub mod evaluation;
pub mod graph;
pub mod pipeline;
pub mod similarity;

pub use config::Config;
pub use pipeline::{DecomplexOutcome, Decomplexer};
pub use similarity::{CachePolicy, SimilarityMatrix};
