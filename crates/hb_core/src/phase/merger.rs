//! Phase Merger
//!
//! Single left-to-right pass over the raw phases. A phase shorter than the
//! minimum duration that ended on a direction change is folded into
//!
//! 1. the previously emitted phase, if it has the same direction, else
//! 2. the next raw phase, if it has the same direction, else
//! 3. nothing: it is kept as is.
//!
//! Short phases ending with an outer return or at the end of the data are
//! kept untouched; their boundary is meaningful on its own.

use crate::config::DEFAULT_MIN_PHASE_DURATION;
use crate::model::{EndReason, Phase};

#[derive(Debug, Clone, Copy)]
pub struct PhaseMerger {
    min_duration: u32,
}

impl Default for PhaseMerger {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PHASE_DURATION)
    }
}

/// Start frame and fragment count carried forward into the next phase.
#[derive(Debug, Clone, Copy)]
struct Carry {
    start_frame: u32,
    merged_count: usize,
}

impl PhaseMerger {
    pub fn new(min_duration: u32) -> Self {
        Self { min_duration }
    }

    fn is_mergeable(&self, phase: &Phase) -> bool {
        phase.end_reason == EndReason::DirectionChange && phase.duration() < self.min_duration
    }

    /// Merge `raw` (ordered, disjoint) into a new disjoint list.
    pub fn merge(&self, raw: Vec<Phase>) -> Vec<Phase> {
        let mut merged: Vec<Phase> = Vec::with_capacity(raw.len());
        let mut carry: Option<Carry> = None;
        let mut phases = raw.into_iter().peekable();

        while let Some(mut phase) = phases.next() {
            if let Some(c) = carry.take() {
                phase.start_frame = c.start_frame;
                phase.merged_count += c.merged_count;
            }

            if !self.is_mergeable(&phase) {
                merged.push(phase);
                continue;
            }

            if let Some(prev) = merged.last_mut().filter(|p| p.direction == phase.direction) {
                tracing::trace!(
                    start = phase.start_frame,
                    end = phase.end_frame,
                    into = prev.start_frame,
                    "short phase merged into previous"
                );
                prev.end_frame = phase.end_frame;
                prev.end_reason = phase.end_reason;
                prev.merged_count += phase.merged_count;
                continue;
            }

            if phases.peek().is_some_and(|next| next.direction == phase.direction) {
                tracing::trace!(
                    start = phase.start_frame,
                    end = phase.end_frame,
                    "short phase carried into next"
                );
                carry = Some(Carry {
                    start_frame: phase.start_frame,
                    merged_count: phase.merged_count,
                });
                continue;
            }

            merged.push(phase);
        }

        tracing::debug!(
            merged = merged.len(),
            min_duration = self.min_duration,
            "phase merge complete"
        );
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction::{Left, Right};
    use crate::model::{Direction, EndReason::*};
    use proptest::prelude::*;

    fn phase(start: u32, end: u32, direction: Direction, reason: EndReason) -> Phase {
        Phase::new(start, end, direction, reason)
    }

    #[test]
    fn test_short_phase_prepends_into_next() {
        // 10 frames then 200 frames, same direction
        let raw = vec![
            phase(0, 9, Right, DirectionChange),
            phase(10, 209, Right, EndOfData),
        ];
        let merged = PhaseMerger::new(50).merge(raw);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start_frame, 0);
        assert_eq!(merged[0].end_frame, 209);
        assert_eq!(merged[0].duration(), 210);
        assert_eq!(merged[0].merged_count, 2);
        assert_eq!(merged[0].end_reason, EndOfData);
    }

    #[test]
    fn test_previous_neighbour_wins_over_next() {
        let raw = vec![
            phase(0, 99, Right, OuterReturn),
            phase(150, 159, Right, DirectionChange),
            phase(160, 300, Right, EndOfData),
        ];
        let merged = PhaseMerger::new(50).merge(raw);

        assert_eq!(merged.len(), 2);
        assert_eq!((merged[0].start_frame, merged[0].end_frame), (0, 159));
        assert_eq!(merged[0].end_reason, DirectionChange);
        assert_eq!((merged[1].start_frame, merged[1].end_frame), (160, 300));
    }

    #[test]
    fn test_unmergeable_short_phase_is_retained() {
        let raw = vec![
            phase(0, 99, Left, DirectionChange),
            phase(100, 109, Right, DirectionChange),
            phase(110, 300, Left, EndOfData),
        ];
        let merged = PhaseMerger::new(50).merge(raw.clone());
        assert_eq!(merged, raw);
    }

    #[test]
    fn test_short_outer_return_is_retained() {
        let raw = vec![
            phase(0, 99, Right, DirectionChange),
            phase(100, 104, Right, OuterReturn),
            phase(110, 119, Right, EndOfData),
        ];
        let merged = PhaseMerger::new(50).merge(raw.clone());
        assert_eq!(merged, raw);
    }

    #[test]
    fn test_chain_of_fragments_collapses() {
        let raw = vec![
            phase(0, 9, Left, DirectionChange),
            phase(20, 29, Left, DirectionChange),
            phase(40, 49, Left, DirectionChange),
            phase(60, 69, Right, EndOfData),
        ];
        let merged = PhaseMerger::new(50).merge(raw);

        assert_eq!(merged.len(), 2);
        assert_eq!((merged[0].start_frame, merged[0].end_frame), (0, 49));
        assert_eq!(merged[0].merged_count, 3);
        assert_eq!(merged[1].direction, Right);
    }

    #[test]
    fn test_long_phases_pass_through() {
        let raw = vec![
            phase(0, 99, Right, DirectionChange),
            phase(100, 199, Left, DirectionChange),
        ];
        assert_eq!(PhaseMerger::default().merge(raw.clone()), raw);
        assert!(PhaseMerger::default().merge(Vec::new()).is_empty());
    }

    /// Ordered, disjoint raw phases with random lengths, gaps and reasons.
    fn raw_phases() -> impl Strategy<Value = Vec<Phase>> {
        prop::collection::vec((1u32..120, 0u32..5, any::<bool>(), 0u8..3), 0..30).prop_map(|specs| {
            let mut next_start = 0;
            specs
                .into_iter()
                .map(|(len, gap, right, reason)| {
                    let start = next_start + gap;
                    let end = start + len - 1;
                    next_start = end + 1;
                    let direction = if right { Right } else { Left };
                    let reason = match reason {
                        0 => DirectionChange,
                        1 => OuterReturn,
                        _ => EndOfData,
                    };
                    phase(start, end, direction, reason)
                })
                .collect()
        })
    }

    proptest! {
        /// Property: merged phases stay ordered and disjoint, nothing is lost
        #[test]
        fn prop_merge_keeps_phases_disjoint(raw in raw_phases(), min in 1u32..100) {
            let total_raw = raw.len();
            let merged = PhaseMerger::new(min).merge(raw);

            for p in &merged {
                prop_assert!(p.end_frame >= p.start_frame);
            }
            for pair in merged.windows(2) {
                prop_assert!(pair[0].end_frame < pair[1].start_frame);
            }
            let covered: usize = merged.iter().map(|p| p.merged_count).sum();
            prop_assert_eq!(covered, total_raw);
        }

        /// Property: a short direction-change phase survives only when no
        /// same-direction neighbour exists
        #[test]
        fn prop_short_phases_are_justified(raw in raw_phases(), min in 1u32..100) {
            let merged = PhaseMerger::new(min).merge(raw);

            for (i, p) in merged.iter().enumerate() {
                // only untouched raw phases; merged ones may end up short through
                // an absorbed outer-return phase
                if p.merged_count > 1 || p.duration() >= min || p.end_reason != DirectionChange {
                    continue;
                }
                let prev_same = i > 0 && merged[i - 1].direction == p.direction;
                let next_same = merged.get(i + 1).is_some_and(|n| n.direction == p.direction);
                prop_assert!(!prev_same, "short phase {:?} next to same-direction predecessor", p);
                prop_assert!(!next_same, "short phase {:?} next to same-direction successor", p);
            }
        }
    }
}
