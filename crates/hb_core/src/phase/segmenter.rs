//! Phase Segmenter
//!
//! Two-state machine over frames in ascending (frame number, direction)
//! order.
//!
//! ```text
//! SeekingStart --(frame with >= 6 defenders)--> InPhase
//! InPhase --(direction flips)-----------------> SeekingStart  [direction_change]
//! InPhase --(outside defender back in zone)---> SeekingStart  [outer_return]
//! InPhase --(input exhausted)-----------------> closed        [end_of_data]
//! ```
//!
//! A frame that flips the direction is examined again right away, so the next
//! phase may open on it. After an outer return the machine keeps scanning but
//! only opens once the direction has changed: the return ends the defence of
//! that attack.
//!
//! A phase whose outside set is empty can never see a return; it runs until
//! the direction flips or the data ends.

use rustc_hash::FxHashSet;

use crate::classifier::MIN_DEFENDERS;
use crate::config::DefenderAssignment;
use crate::frames::Frame;
use crate::model::{Direction, EndReason, Phase, PlayerId};
use crate::zone::InnerZone;

#[derive(Debug, Clone)]
struct OpenPhase {
    start_frame: u32,
    last_frame: u32,
    direction: Direction,
    /// Defenders outside the inner zone when the phase opened
    outside: FxHashSet<PlayerId>,
}

#[derive(Debug, Clone)]
enum SegmenterState {
    SeekingStart {
        /// Direction whose attack already ended with an outer return
        blocked: Option<Direction>,
    },
    InPhase(OpenPhase),
}

/// Incremental phase builder; feed frames with [`push`](Self::push), collect
/// with [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct PhaseSegmenter {
    zone: InnerZone,
    defenders: DefenderAssignment,
    state: SegmenterState,
    phases: Vec<Phase>,
    last_seen: Option<(u32, Direction)>,
}

impl PhaseSegmenter {
    pub fn new(zone: InnerZone, defenders: DefenderAssignment) -> Self {
        Self {
            zone,
            defenders,
            state: SegmenterState::SeekingStart { blocked: None },
            phases: Vec::new(),
            last_seen: None,
        }
    }

    /// Segment a complete, ordered frame sequence.
    pub fn segment(frames: &[Frame], zone: InnerZone, defenders: DefenderAssignment) -> Vec<Phase> {
        let mut segmenter = Self::new(zone, defenders);
        for frame in frames {
            segmenter.push(frame);
        }
        segmenter.finish()
    }

    /// Consume the next frame.
    ///
    /// Frames must arrive in non-decreasing (frame number, direction) order;
    /// out-of-order frames are ignored with a warning.
    pub fn push(&mut self, frame: &Frame) {
        let key = (frame.frame_num, frame.direction);
        if let Some(prev) = self.last_seen {
            if key <= prev {
                tracing::warn!(
                    frame = frame.frame_num,
                    direction = %frame.direction,
                    "out-of-order frame ignored by segmenter"
                );
                return;
            }
        }
        self.last_seen = Some(key);

        let state = std::mem::replace(&mut self.state, SegmenterState::SeekingStart { blocked: None });
        self.state = match state {
            SegmenterState::InPhase(mut open) => {
                if frame.direction != open.direction {
                    self.close(open, EndReason::DirectionChange);
                    self.seek(frame, None)
                } else if self.defender_returned(&open, frame) {
                    let direction = open.direction;
                    self.close(open, EndReason::OuterReturn);
                    SegmenterState::SeekingStart {
                        blocked: Some(direction),
                    }
                } else {
                    open.last_frame = frame.frame_num;
                    SegmenterState::InPhase(open)
                }
            }
            SegmenterState::SeekingStart { blocked } => self.seek(frame, blocked),
        };
    }

    /// Close any open phase as `end_of_data` and return all phases.
    pub fn finish(mut self) -> Vec<Phase> {
        let state = std::mem::replace(&mut self.state, SegmenterState::SeekingStart { blocked: None });
        if let SegmenterState::InPhase(open) = state {
            self.close(open, EndReason::EndOfData);
        }
        self.phases
    }

    fn seek(&self, frame: &Frame, blocked: Option<Direction>) -> SegmenterState {
        if blocked == Some(frame.direction) {
            return SegmenterState::SeekingStart { blocked };
        }

        let defenders = frame.defenders(self.defenders.defending_team(frame.direction));
        if defenders.len() < MIN_DEFENDERS {
            return SegmenterState::SeekingStart { blocked: None };
        }

        let outside: FxHashSet<PlayerId> = defenders
            .iter()
            .filter(|p| !self.zone.contains(p.x, p.y, frame.direction))
            .map(|p| p.player_id.clone())
            .collect();

        tracing::trace!(
            frame = frame.frame_num,
            direction = %frame.direction,
            outside = outside.len(),
            "phase opened"
        );

        SegmenterState::InPhase(OpenPhase {
            start_frame: frame.frame_num,
            last_frame: frame.frame_num,
            direction: frame.direction,
            outside,
        })
    }

    fn defender_returned(&self, open: &OpenPhase, frame: &Frame) -> bool {
        if open.outside.is_empty() {
            return false;
        }
        frame
            .defenders(self.defenders.defending_team(frame.direction))
            .iter()
            .any(|p| open.outside.contains(&p.player_id) && self.zone.contains(p.x, p.y, frame.direction))
    }

    fn close(&mut self, open: OpenPhase, reason: EndReason) {
        let phase = Phase::new(open.start_frame, open.last_frame, open.direction, reason);
        tracing::debug!(
            start = phase.start_frame,
            end = phase.end_frame,
            direction = %phase.direction,
            reason = %reason,
            "phase closed"
        );
        self.phases.push(phase);
    }
}
