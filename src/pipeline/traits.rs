use crate::alignment::candidates::Candidates;
use crate::error::AlignmentError;
use crate::types::{Label, LabelPair};

/// Aligns one utterance's reference labels with its hypothesis labels.
pub trait Aligner: Send + Sync {
    type Unit;

    fn align(
        &self,
        reference: &[Label],
        hypothesis: &[Label],
    ) -> Result<Vec<Self::Unit>, AlignmentError>;
}

pub trait CandidateFinder: Send + Sync {
    fn find(&self, reference: &[Label], hypothesis: &[Label]) -> Candidates;
}

/// Any aligner producing label pairs, chosen at construction time.
pub type EventAligner = Box<dyn Aligner<Unit = LabelPair>>;
