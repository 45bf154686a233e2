use crate::config::SegmentConfig;
use crate::error::AlignmentError;
use crate::types::{FlatSegment, Label, Segment, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Start,
    End,
}

/// A label boundary. `label` indexes the sweep's label arena.
#[derive(Debug, Clone, Copy)]
struct Event {
    time: f64,
    kind: EventKind,
    side: Side,
    label: usize,
}

#[derive(Debug)]
struct EventGroup {
    time: f64,
    events: Vec<Event>,
}

/// Resolved labels of both sides; active sets refer to them by index, so
/// equal-valued labels active at the same time stay distinct.
struct LabelArena {
    labels: Vec<Label>,
}

impl LabelArena {
    fn resolve(
        reference: &[Label],
        hypothesis: &[Label],
        closing_time: Option<f64>,
    ) -> Result<(Self, Vec<Event>), AlignmentError> {
        let mut labels = Vec::with_capacity(reference.len() + hypothesis.len());
        let mut events = Vec::with_capacity(2 * labels.capacity());

        let sides = [(Side::Reference, reference), (Side::Hypothesis, hypothesis)];
        for (side, side_labels) in sides {
            for label in side_labels {
                let resolved = label.resolved(closing_time)?;
                let index = labels.len();
                // `resolved` guarantees a concrete end.
                let end = resolved.end.unwrap_or(resolved.start);
                events.push(Event {
                    time: resolved.start,
                    kind: EventKind::Start,
                    side,
                    label: index,
                });
                events.push(Event {
                    time: end,
                    kind: EventKind::End,
                    side,
                    label: index,
                });
                labels.push(resolved);
            }
        }

        Ok((Self { labels }, events))
    }

    fn snapshot(&self, active: &[usize]) -> Vec<Label> {
        active.iter().map(|&i| self.labels[i].clone()).collect()
    }
}

/// Sorts events by time and merges runs whose consecutive times differ by
/// less than `snap_threshold`; a group takes the time of its first event.
fn group_events(mut events: Vec<Event>, snap_threshold: f64) -> Vec<EventGroup> {
    events.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut groups: Vec<EventGroup> = Vec::new();
    let mut prev_time: Option<f64> = None;

    for event in events {
        let joins_current = prev_time.is_some_and(|prev| {
            let delta = event.time - prev;
            delta == 0.0 || delta < snap_threshold
        });
        prev_time = Some(event.time);

        match groups.last_mut() {
            Some(group) if joins_current => group.events.push(event),
            _ => groups.push(EventGroup {
                time: event.time,
                events: vec![event],
            }),
        }
    }

    groups
}

#[derive(Default)]
struct ActiveSets {
    reference: Vec<usize>,
    hypothesis: Vec<usize>,
}

impl ActiveSets {
    fn side_mut(&mut self, side: Side) -> &mut Vec<usize> {
        match side {
            Side::Reference => &mut self.reference,
            Side::Hypothesis => &mut self.hypothesis,
        }
    }

    fn apply(&mut self, events: &[Event]) {
        for event in events {
            let active = self.side_mut(event.side);
            match event.kind {
                EventKind::Start => active.push(event.label),
                EventKind::End => {
                    if let Some(pos) = active.iter().position(|&i| i == event.label) {
                        active.remove(pos);
                    }
                }
            }
        }
    }
}

/// Partitions the covered timeline into segments with constant active
/// labels per side.
///
/// Open ends are closed at `config.closing_time`. Segments are returned in
/// time order and span exactly the first to the last boundary.
pub fn sweep_segments(
    reference: &[Label],
    hypothesis: &[Label],
    config: &SegmentConfig,
) -> Result<Vec<Segment>, AlignmentError> {
    let (arena, events) = LabelArena::resolve(reference, hypothesis, config.closing_time)?;
    let n_events = events.len();
    let groups = group_events(events, config.snap_threshold);

    let mut active = ActiveSets::default();
    let mut segments = Vec::with_capacity(groups.len().saturating_sub(1));
    let mut groups_iter = groups.iter();

    let Some(first) = groups_iter.next() else {
        return Ok(segments);
    };
    active.apply(&first.events);
    let mut current_start = first.time;

    for group in groups_iter {
        segments.push(Segment {
            start: current_start,
            end: group.time,
            reference: arena.snapshot(&active.reference),
            hypothesis: arena.snapshot(&active.hypothesis),
        });
        active.apply(&group.events);
        current_start = group.time;
    }

    tracing::debug!(
        labels = arena.labels.len(),
        events = n_events,
        groups = groups.len(),
        segments = segments.len(),
        "segment: sweep finished"
    );
    Ok(segments)
}

/// Reduces each side to at most one label; fails on overlapping labels.
pub fn flatten_segments(segments: Vec<Segment>) -> Result<Vec<FlatSegment>, AlignmentError> {
    segments
        .into_iter()
        .map(|segment| {
            let (start, end) = (segment.start, segment.end);
            let reference = single_label(segment.reference, Side::Reference, start, end)?;
            let hypothesis = single_label(segment.hypothesis, Side::Hypothesis, start, end)?;
            Ok(FlatSegment {
                start: segment.start,
                end: segment.end,
                reference,
                hypothesis,
            })
        })
        .collect()
}

fn single_label(
    labels: Vec<Label>,
    side: Side,
    start: f64,
    end: f64,
) -> Result<Option<Label>, AlignmentError> {
    if labels.len() > 1 {
        return Err(AlignmentError::overlapping(side, start, end, labels.len()));
    }
    Ok(labels.into_iter().next())
}
