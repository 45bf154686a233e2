pub mod alignment;
pub mod config;
pub mod confusion;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::AlignerConfig;
pub use confusion::{AggregatedConfusion, Confusion, ValueConfusion};
pub use error::AlignmentError;
pub use pipeline::builder::AlignerBuilder;
pub use pipeline::defaults::{
    BipartiteMatchingAligner, FullMatchingAligner, InvariantSegmentAligner, LevenshteinAligner,
    OverlapCandidateFinder, StartEndCandidateFinder,
};
pub use pipeline::traits::{Aligner, CandidateFinder, EventAligner};
pub use types::{EditKind, FlatSegment, Label, LabelPair, Segment, Side};
