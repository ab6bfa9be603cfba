//! Phase Aggregator
//!
//! Reduces the frame classifications inside each merged phase to one
//! representative label. Phases without any classified frame produce no row.

use std::collections::BTreeMap;

use crate::config::AggregationPolicy;
use crate::model::{Direction, DominantFormation, FrameClassification, Phase};

/// Per-label tally, kept in first-encountered order.
#[derive(Debug)]
struct LabelTally<'a> {
    label: &'a str,
    count: usize,
    confidence_sum: f64,
}

impl LabelTally<'_> {
    fn mean_confidence(&self) -> f64 {
        self.confidence_sum / self.count as f64
    }
}

/// Result of aggregating a list of phases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationOutcome {
    pub formations: Vec<DominantFormation>,
    /// Phases with no classified frame
    pub empty_phases: usize,
    /// Rows dropped by the minimum output duration
    pub short_rows: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseAggregator {
    policy: AggregationPolicy,
    min_output_duration: u32,
}

impl PhaseAggregator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self {
            policy,
            min_output_duration: 0,
        }
    }

    pub fn with_min_output_duration(mut self, frames: u32) -> Self {
        self.min_output_duration = frames;
        self
    }

    pub fn aggregate(&self, phases: &[Phase], classifications: &[FrameClassification]) -> AggregationOutcome {
        let mut right: Vec<&FrameClassification> = Vec::new();
        let mut left: Vec<&FrameClassification> = Vec::new();
        for c in classifications {
            match c.direction {
                Direction::Right => right.push(c),
                Direction::Left => left.push(c),
            }
        }
        right.sort_by_key(|c| c.frame_num);
        left.sort_by_key(|c| c.frame_num);

        let mut outcome = AggregationOutcome::default();
        for phase in phases {
            let lane = match phase.direction {
                Direction::Right => &right,
                Direction::Left => &left,
            };
            let from = lane.partition_point(|c| c.frame_num < phase.start_frame);
            let to = lane.partition_point(|c| c.frame_num <= phase.end_frame);

            match self.reduce(phase, lane[from..to].iter().copied()) {
                None => {
                    outcome.empty_phases += 1;
                    tracing::debug!(
                        start = phase.start_frame,
                        end = phase.end_frame,
                        "phase without classified frames dropped"
                    );
                }
                Some(_) if phase.duration() < self.min_output_duration => outcome.short_rows += 1,
                Some(row) => outcome.formations.push(row),
            }
        }
        outcome
    }

    /// Dominant formation of one phase from its classifications, which must
    /// be in ascending frame order. `None` when there are none.
    pub fn reduce<'a, I>(&self, phase: &Phase, classifications: I) -> Option<DominantFormation>
    where
        I: IntoIterator<Item = &'a FrameClassification>,
    {
        let mut tallies: Vec<LabelTally<'a>> = Vec::new();
        for c in classifications {
            match tallies.iter_mut().find(|t| t.label == c.formation_label) {
                Some(tally) => {
                    tally.count += 1;
                    tally.confidence_sum += c.confidence;
                }
                None => tallies.push(LabelTally {
                    label: &c.formation_label,
                    count: 1,
                    confidence_sum: c.confidence,
                }),
            }
        }

        let winner = self.pick(&tallies)?;
        let breakdown: BTreeMap<String, usize> =
            tallies.iter().map(|t| (t.label.to_string(), t.count)).collect();

        Some(DominantFormation {
            start_frame: phase.start_frame,
            end_frame: phase.end_frame,
            formation_label: winner.label.to_string(),
            direction: phase.direction,
            aggregate_confidence: winner.mean_confidence(),
            breakdown,
        })
    }

    fn pick<'t, 'a>(&self, tallies: &'t [LabelTally<'a>]) -> Option<&'t LabelTally<'a>> {
        let mut best: Option<&LabelTally> = None;
        for tally in tallies {
            // strict comparisons: the first-encountered label keeps a tie
            let better = match (best, self.policy) {
                (None, _) => true,
                (Some(b), AggregationPolicy::Plurality) => tally.count > b.count,
                (Some(b), AggregationPolicy::ConfidenceWeighted) => tally.mean_confidence() > b.mean_confidence(),
            };
            if better {
                best = Some(tally);
            }
        }
        best
    }
}
