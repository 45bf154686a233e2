use evalign_rs::config::{LevenshteinCosts, MatchingPenalties, StartEndThresholds};
use evalign_rs::{
    Aligner, BipartiteMatchingAligner, InvariantSegmentAligner, Label, LevenshteinAligner,
};
use proptest::prelude::*;

const VALUES: [&str; 4] = ["a", "b", "c", "d"];

fn tokens() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(VALUES.to_vec()), 0..12)
        .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

// Times on a 0.5 s grid keep boundaries exact and away from the snap threshold.
fn label() -> impl Strategy<Value = Label> {
    (prop::sample::select(VALUES.to_vec()), 0u32..60, 1u32..12).prop_map(|(value, start, len)| {
        let start = f64::from(start) * 0.5;
        Label::new(value, start, start + f64::from(len) * 0.5)
    })
}

fn labels() -> impl Strategy<Value = Vec<Label>> {
    prop::collection::vec(label(), 0..10)
}

/// Length of the union of the labels' intervals.
fn covered_duration(labels: &[Label]) -> f64 {
    let mut spans: Vec<(f64, f64)> = labels
        .iter()
        .map(|l| (l.start, l.end.unwrap_or(l.start)))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut total = 0.0;
    let mut current: Option<(f64, f64)> = None;
    for (start, end) in spans {
        current = match current {
            Some((s, e)) if start <= e => Some((s, e.max(end))),
            Some((s, e)) => {
                total += e - s;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((s, e)) = current {
        total += e - s;
    }
    total
}

proptest! {
    #[test]
    fn edit_distance_to_itself_is_zero(
        seq in tokens(),
        del in 0.0f64..10.0,
        ins in 0.0f64..10.0,
        sub in 0.0f64..10.0
    ) {
        let aligner = LevenshteinAligner::<String>::new(LevenshteinCosts {
            deletion_cost: del,
            insertion_cost: ins,
            substitution_cost: sub,
        });
        prop_assert_eq!(aligner.calculate_edit_distance(&seq, &seq), 0.0);
    }

    #[test]
    fn edit_distance_is_symmetric_for_equal_gap_costs(
        a in tokens(),
        b in tokens(),
        gap in 0.0f64..10.0,
        sub in 0.0f64..10.0
    ) {
        let aligner = LevenshteinAligner::<String>::new(LevenshteinCosts {
            deletion_cost: gap,
            insertion_cost: gap,
            substitution_cost: sub,
        });
        let ab = aligner.calculate_edit_distance(&a, &b);
        let ba = aligner.calculate_edit_distance(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-9, "{} != {}", ab, ba);
    }

    #[test]
    fn alignment_preserves_both_sequences(a in tokens(), b in tokens()) {
        let aligner = LevenshteinAligner::<String>::default();
        let aligned = aligner.align_sequence(&a, &b);

        let refs: Vec<&String> = aligned.iter().filter_map(|(r, _)| *r).collect();
        let hyps: Vec<&String> = aligned.iter().filter_map(|(_, h)| *h).collect();
        prop_assert_eq!(refs, a.iter().collect::<Vec<_>>());
        prop_assert_eq!(hyps, b.iter().collect::<Vec<_>>());
        prop_assert!(aligned.iter().all(|(r, h)| r.is_some() || h.is_some()));
    }

    #[test]
    fn one_to_one_uses_every_label_once(reference in labels(), hypothesis in labels()) {
        let aligner = BipartiteMatchingAligner::one_to_one(
            StartEndThresholds::default(),
            MatchingPenalties::default(),
        );
        let pairs = aligner.align(&reference, &hypothesis).unwrap();

        prop_assert_eq!(pairs.iter().filter(|p| p.reference.is_some()).count(), reference.len());
        prop_assert_eq!(pairs.iter().filter(|p| p.hypothesis.is_some()).count(), hypothesis.len());
        prop_assert!(pairs.iter().all(|p| p.reference.is_some() || p.hypothesis.is_some()));
    }

    #[test]
    fn segments_partition_the_covered_timeline(reference in labels(), hypothesis in labels()) {
        let segments = InvariantSegmentAligner::default()
            .align(&reference, &hypothesis)
            .unwrap();

        for pair in segments.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        prop_assert!(segments.iter().all(|s| s.end > s.start));

        let all: Vec<&Label> = reference.iter().chain(hypothesis.iter()).collect();
        if let (Some(first), Some(last)) = (segments.first(), segments.last()) {
            let min = all.iter().map(|l| l.start).fold(f64::INFINITY, f64::min);
            let max = all
                .iter()
                .filter_map(|l| l.end)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(first.start, min);
            prop_assert_eq!(last.end, max);
        } else {
            prop_assert!(all.is_empty());
        }

        let ref_covered: f64 = segments
            .iter()
            .filter(|s| !s.reference.is_empty())
            .map(|s| s.duration())
            .sum();
        let hyp_covered: f64 = segments
            .iter()
            .filter(|s| !s.hypothesis.is_empty())
            .map(|s| s.duration())
            .sum();
        prop_assert!((ref_covered - covered_duration(&reference)).abs() < 1e-9);
        prop_assert!((hyp_covered - covered_duration(&hypothesis)).abs() < 1e-9);
    }
}
