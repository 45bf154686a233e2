use crate::types::Label;

/// Seconds during which both labels are active.
///
/// An open end takes the other label's end. Two open-ended labels have no
/// comparable end and yield zero.
pub fn overlap_time(reference: &Label, hypothesis: &Label) -> f64 {
    let (ref_end, hyp_end) = match (reference.end, hypothesis.end) {
        (Some(r), Some(h)) => (r, h),
        (Some(r), None) => (r, r),
        (None, Some(h)) => (h, h),
        (None, None) => return 0.0,
    };

    let start_overlap = reference.start.max(hypothesis.start);
    let end_overlap = ref_end.min(hyp_end);

    (end_overlap - start_overlap).max(0.0)
}

/// Overlap relative to the reference label's duration, `0` when that duration is not positive.
pub fn overlap_percentage(reference: &Label, hypothesis: &Label) -> f64 {
    match reference.duration() {
        Some(duration) if duration > 0.0 => overlap_time(reference, hypothesis) / duration,
        _ => 0.0,
    }
}
