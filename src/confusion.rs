//! Error counts per label value, folded from alignment output.
//!
//! Label pairs contribute one unit each; flat segments contribute their
//! duration in seconds.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{FlatSegment, Label, LabelPair};

/// Amounts of correct and erroneous output, with the metrics derived from them.
pub trait Confusion {
    fn correct(&self) -> f64;
    fn insertions(&self) -> f64;
    fn deletions(&self) -> f64;
    /// Amount where this value was expected and another one was output.
    fn substitutions(&self) -> f64;
    /// Amount where this value was output and another one was expected.
    fn substitutions_out(&self) -> f64;

    /// Amount expected by the reference.
    fn total(&self) -> f64 {
        self.correct() + self.deletions() + self.substitutions()
    }

    fn false_negatives(&self) -> f64 {
        self.deletions() + self.substitutions()
    }

    fn false_positives(&self) -> f64 {
        self.insertions() + self.substitutions_out()
    }

    fn true_positives(&self) -> f64 {
        self.correct()
    }

    /// `(substitutions + deletions + insertions) / total`, 0 without reference.
    fn error_rate(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        (self.substitutions() + self.deletions() + self.insertions()) / total
    }

    /// `correct / (total + insertions)`.
    fn accuracy(&self) -> f64 {
        let total = self.total() + self.insertions();
        if total <= 0.0 {
            return 0.0;
        }
        (self.correct() / total).max(0.0)
    }

    fn precision(&self) -> f64 {
        let total = self.true_positives() + self.false_positives();
        if total <= 0.0 {
            return 0.0;
        }
        self.true_positives() / total
    }

    fn recall(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        self.correct() / total
    }

    /// Weighted harmonic mean of precision and recall; 0 when both are 0.
    fn f_measure(&self, beta: f64) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let beta_sq = beta * beta;
        let denominator = beta_sq * precision + recall;
        if denominator <= 0.0 {
            return 0.0;
        }
        (1.0 + beta_sq) * precision * recall / denominator
    }
}

/// Confusion of a single label value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueConfusion {
    pub value: String,
    pub correct: f64,
    pub insertions: f64,
    pub deletions: f64,
    /// Keyed by the value that was output instead.
    pub substitutions: BTreeMap<String, f64>,
    /// Keyed by the value that was expected instead.
    pub substitutions_out: BTreeMap<String, f64>,
}

impl ValueConfusion {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Substituting values by amount, largest first, ties by value.
    pub fn substitutions_by_count(&self) -> Vec<(&str, f64)> {
        let mut subs: Vec<(&str, f64)> = self
            .substitutions
            .iter()
            .map(|(value, &amount)| (value.as_str(), amount))
            .collect();
        subs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        subs
    }
}

impl Confusion for ValueConfusion {
    fn correct(&self) -> f64 {
        self.correct
    }

    fn insertions(&self) -> f64 {
        self.insertions
    }

    fn deletions(&self) -> f64 {
        self.deletions
    }

    fn substitutions(&self) -> f64 {
        self.substitutions.values().sum()
    }

    fn substitutions_out(&self) -> f64 {
        self.substitutions_out.values().sum()
    }
}

/// Per-value confusions; the aggregate amounts are sums over all values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedConfusion {
    pub instances: BTreeMap<String, ValueConfusion>,
}

impl AggregatedConfusion {
    pub fn from_label_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a LabelPair>,
    {
        let mut confusion = Self::default();
        for pair in pairs {
            if !confusion.record(pair.reference.as_ref(), pair.hypothesis.as_ref(), 1.0) {
                tracing::warn!("confusion: label pair without reference and hypothesis ignored");
            }
        }
        confusion
    }

    /// Segments with neither side active are gaps and add nothing.
    pub fn from_segments<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a FlatSegment>,
    {
        let mut confusion = Self::default();
        for segment in segments {
            let recorded = confusion.record(
                segment.reference.as_ref(),
                segment.hypothesis.as_ref(),
                segment.duration(),
            );
            if !recorded {
                tracing::trace!(
                    start = segment.start,
                    end = segment.end,
                    "confusion: empty segment skipped"
                );
            }
        }
        confusion
    }

    /// Adds the contributions of `other` to this confusion.
    pub fn merge(&mut self, other: &AggregatedConfusion) {
        for (value, theirs) in &other.instances {
            let ours = self.instance_mut(value);
            ours.correct += theirs.correct;
            ours.insertions += theirs.insertions;
            ours.deletions += theirs.deletions;
            for (sub, amount) in &theirs.substitutions {
                *ours.substitutions.entry(sub.clone()).or_insert(0.0) += amount;
            }
            for (sub, amount) in &theirs.substitutions_out {
                *ours.substitutions_out.entry(sub.clone()).or_insert(0.0) += amount;
            }
        }
    }

    pub fn get(&self, value: &str) -> Option<&ValueConfusion> {
        self.instances.get(value)
    }

    fn instance_mut(&mut self, value: &str) -> &mut ValueConfusion {
        self.instances
            .entry(value.to_string())
            .or_insert_with(|| ValueConfusion::new(value))
    }

    /// Returns `false` when both sides are absent.
    fn record(&mut self, reference: Option<&Label>, hypothesis: Option<&Label>, amount: f64) -> bool {
        match (reference, hypothesis) {
            (None, None) => return false,
            (None, Some(h)) => self.instance_mut(&h.value).insertions += amount,
            (Some(r), None) => self.instance_mut(&r.value).deletions += amount,
            (Some(r), Some(h)) if r.value == h.value => {
                self.instance_mut(&r.value).correct += amount
            }
            (Some(r), Some(h)) => {
                *self
                    .instance_mut(&r.value)
                    .substitutions
                    .entry(h.value.clone())
                    .or_insert(0.0) += amount;
                *self
                    .instance_mut(&h.value)
                    .substitutions_out
                    .entry(r.value.clone())
                    .or_insert(0.0) += amount;
            }
        }
        true
    }
}

impl Confusion for AggregatedConfusion {
    fn correct(&self) -> f64 {
        self.instances.values().map(Confusion::correct).sum()
    }

    fn insertions(&self) -> f64 {
        self.instances.values().map(Confusion::insertions).sum()
    }

    fn deletions(&self) -> f64 {
        self.instances.values().map(Confusion::deletions).sum()
    }

    fn substitutions(&self) -> f64 {
        self.instances.values().map(Confusion::substitutions).sum()
    }

    fn substitutions_out(&self) -> f64 {
        self.instances.values().map(Confusion::substitutions_out).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(r: Option<&str>, h: Option<&str>) -> LabelPair {
        LabelPair::new(r.map(Label::untimed), h.map(Label::untimed))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn counts_label_pairs_per_value() {
        let pairs = vec![
            pair(Some("a"), Some("a")),
            pair(Some("a"), Some("b")),
            pair(Some("a"), None),
            pair(None, Some("b")),
            pair(Some("c"), Some("b")),
        ];
        let confusion = AggregatedConfusion::from_label_pairs(&pairs);

        let a = confusion.get("a").unwrap();
        assert_eq!((a.correct, a.deletions, a.substitutions()), (1.0, 1.0, 1.0));
        let b = confusion.get("b").unwrap();
        assert_eq!((b.insertions, b.substitutions_out()), (1.0, 2.0));

        // 1 correct + 1 deletion + 2 substitutions
        assert_eq!(confusion.total(), 4.0);
        assert_eq!(confusion.insertions(), 1.0);
        assert_eq!(confusion.false_positives(), 3.0);
        assert!(approx(confusion.error_rate(), 1.0));
        assert!(approx(confusion.accuracy(), 0.2));
    }

    #[test]
    fn both_absent_pairs_are_ignored() {
        let confusion = AggregatedConfusion::from_label_pairs(&[pair(None, None)]);
        assert!(confusion.instances.is_empty());
        assert_eq!(confusion.error_rate(), 0.0);
    }

    #[test]
    fn segments_contribute_durations() {
        let segments = vec![
            FlatSegment {
                start: 0.0,
                end: 2.0,
                reference: Some(Label::new("speech", 0.0, 3.0)),
                hypothesis: Some(Label::new("speech", 0.0, 2.0)),
            },
            FlatSegment {
                start: 2.0,
                end: 3.0,
                reference: Some(Label::new("speech", 0.0, 3.0)),
                hypothesis: None,
            },
            FlatSegment {
                start: 3.0,
                end: 4.0,
                reference: None,
                hypothesis: None,
            },
        ];
        let confusion = AggregatedConfusion::from_segments(&segments);
        let speech = confusion.get("speech").unwrap();
        assert_eq!(speech.correct, 2.0);
        assert_eq!(speech.deletions, 1.0);
        assert!(approx(confusion.recall(), 2.0 / 3.0));
        assert!(approx(confusion.precision(), 1.0));
    }

    #[test]
    fn f_measure_weights_recall() {
        let mut value = ValueConfusion::new("x");
        value.correct = 2.0;
        value.deletions = 2.0;
        // precision 1, recall 0.5
        assert!(approx(value.f_measure(1.0), 2.0 / 3.0));
        assert!(approx(value.f_measure(2.0), 5.0 * 0.5 / 4.5));
        assert_eq!(ValueConfusion::new("y").f_measure(1.0), 0.0);
    }

    #[test]
    fn substitutions_by_count_orders_largest_first() {
        let pairs = vec![
            pair(Some("a"), Some("c")),
            pair(Some("a"), Some("b")),
            pair(Some("a"), Some("c")),
            pair(Some("a"), Some("d")),
        ];
        let confusion = AggregatedConfusion::from_label_pairs(&pairs);
        assert_eq!(
            confusion.get("a").unwrap().substitutions_by_count(),
            vec![("c", 2.0), ("b", 1.0), ("d", 1.0)]
        );
    }

    #[test]
    fn merge_sums_amounts() {
        let mut total = AggregatedConfusion::from_label_pairs(&[pair(Some("a"), Some("a"))]);
        total.merge(&AggregatedConfusion::from_label_pairs(&[
            pair(Some("a"), Some("a")),
            pair(Some("a"), Some("b")),
        ]));
        assert_eq!(total.get("a").unwrap().correct, 2.0);
        assert_eq!(total.get("b").unwrap().substitutions_out(), 1.0);
        assert_eq!(total.total(), 3.0);
    }

    #[test]
    fn serializes_to_json() {
        let confusion = AggregatedConfusion::from_label_pairs(&[pair(Some("a"), None)]);
        let json = serde_json::to_value(&confusion).unwrap();
        assert_eq!(json["instances"]["a"]["deletions"], 1.0);
    }
}
