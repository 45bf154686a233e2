use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// Raw end time used by annotation sources to mark "until the end of the recording".
pub const OPEN_END_SENTINEL: f64 = -1.0;

/// A time-stamped annotation on one utterance. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub value: String,
    pub start: f64,
    /// `None` is an open end, resolved against the owning recording's closing time.
    pub end: Option<f64>,
}

impl Label {
    pub fn new(value: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            value: value.into(),
            start,
            end: Some(end),
        }
    }

    pub fn open(value: impl Into<String>, start: f64) -> Self {
        Self {
            value: value.into(),
            start,
            end: None,
        }
    }

    /// Builds a label from source data where an end of `-1` means open.
    pub fn from_raw(value: impl Into<String>, start: f64, end: f64) -> Self {
        if end == OPEN_END_SENTINEL {
            Self::open(value, start)
        } else {
            Self::new(value, start, end)
        }
    }

    /// A token without timing, for order-only alignment.
    pub fn untimed(value: impl Into<String>) -> Self {
        Self::new(value, 0.0, 0.0)
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn duration(&self) -> Option<f64> {
        self.end.map(|end| end - self.start)
    }

    /// Returns a copy with a concrete end, substituting `closing_time` for an open end.
    ///
    /// Fails when no end can be determined, either time is not finite, or the
    /// resolved end is not after the start.
    pub fn resolved(&self, closing_time: Option<f64>) -> Result<Label, AlignmentError> {
        let end = match self.end.or(closing_time) {
            Some(end) => end,
            None => return Err(AlignmentError::open_label_end(&self.value, self.start)),
        };
        if !self.start.is_finite() || !end.is_finite() || end <= self.start {
            return Err(AlignmentError::invalid_label(&self.value, self.start, end));
        }
        Ok(Label {
            value: self.value.clone(),
            start: self.start,
            end: Some(end),
        })
    }

    /// Orders by start, then end (open ends last), then value.
    pub fn cmp_by_time(&self, other: &Label) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| {
                let a = self.end.unwrap_or(f64::INFINITY);
                let b = other.end.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            })
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}[{}-{}]", self.value, self.start, end),
            None => write!(f, "{}[{}-open]", self.value, self.start),
        }
    }
}

/// Which annotation a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Reference,
    Hypothesis,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Reference => f.write_str("reference"),
            Side::Hypothesis => f.write_str("hypothesis"),
        }
    }
}

/// The error type an aligned pair represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Correct,
    Substitution,
    Insertion,
    Deletion,
}

/// One alignment decision. At most one side is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPair {
    pub reference: Option<Label>,
    pub hypothesis: Option<Label>,
}

impl LabelPair {
    pub fn new(reference: Option<Label>, hypothesis: Option<Label>) -> Self {
        Self {
            reference,
            hypothesis,
        }
    }

    pub fn matched(reference: Label, hypothesis: Label) -> Self {
        Self::new(Some(reference), Some(hypothesis))
    }

    pub fn deletion(reference: Label) -> Self {
        Self::new(Some(reference), None)
    }

    pub fn insertion(hypothesis: Label) -> Self {
        Self::new(None, Some(hypothesis))
    }

    /// `None` for a pair with both sides absent.
    pub fn kind(&self) -> Option<EditKind> {
        match (&self.reference, &self.hypothesis) {
            (Some(r), Some(h)) if r.value == h.value => Some(EditKind::Correct),
            (Some(_), Some(_)) => Some(EditKind::Substitution),
            (Some(_), None) => Some(EditKind::Deletion),
            (None, Some(_)) => Some(EditKind::Insertion),
            (None, None) => None,
        }
    }

    /// Length of the longer printed value; an absent side counts as `None`.
    pub fn max_length(&self) -> usize {
        let side_len = |label: &Option<Label>| {
            label
                .as_ref()
                .map(|l| l.value.chars().count())
                .unwrap_or("None".len())
        };
        side_len(&self.reference).max(side_len(&self.hypothesis))
    }

    pub fn padded_ref_value(&self) -> String {
        pad_value(self.reference.as_ref(), self.max_length())
    }

    pub fn padded_hyp_value(&self) -> String {
        pad_value(self.hypothesis.as_ref(), self.max_length())
    }

    /// Orders by the reference label, falling back to the hypothesis label when absent.
    pub fn cmp_order(&self, other: &LabelPair) -> Ordering {
        let a = self.reference.as_ref().or(self.hypothesis.as_ref());
        let b = other.reference.as_ref().or(other.hypothesis.as_ref());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp_by_time(b),
        }
    }
}

fn pad_value(label: Option<&Label>, width: usize) -> String {
    let value = label.map(|l| l.value.as_str()).unwrap_or("-");
    format!("{value:>width$}")
}

/// View over the labels a segment carries on one side.
pub trait ActiveLabels {
    fn labels(&self) -> &[Label];
}

impl ActiveLabels for Vec<Label> {
    fn labels(&self) -> &[Label] {
        self.as_slice()
    }
}

impl ActiveLabels for Option<Label> {
    fn labels(&self) -> &[Label] {
        self.as_slice()
    }
}

/// A time range `[start, end)` with a constant set of active labels per side.
///
/// The sweep produces `Segment<Vec<Label>>`; single-label consumers flatten
/// it into a [`FlatSegment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment<L = Vec<Label>> {
    pub start: f64,
    pub end: f64,
    pub reference: L,
    pub hypothesis: L,
}

pub type FlatSegment = Segment<Option<Label>>;

impl<L: ActiveLabels> Segment<L> {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn labels(&self, side: Side) -> &[Label] {
        match side {
            Side::Reference => self.reference.labels(),
            Side::Hypothesis => self.hypothesis.labels(),
        }
    }

    /// Orders by start, end, reference values, then hypothesis values (absent first).
    pub fn cmp_order(&self, other: &Segment<L>) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| self.end.total_cmp(&other.end))
            .then_with(|| cmp_values(self.reference.labels(), other.reference.labels()))
            .then_with(|| cmp_values(self.hypothesis.labels(), other.hypothesis.labels()))
    }
}

fn cmp_values(a: &[Label], b: &[Label]) -> Ordering {
    a.iter()
        .map(|l| l.value.as_str())
        .cmp(b.iter().map(|l| l.value.as_str()))
}

impl FlatSegment {
    pub fn kind(&self) -> Option<EditKind> {
        LabelPair::new(self.reference.clone(), self.hypothesis.clone()).kind()
    }
}
