//! Frame grouping
//!
//! Groups the flat observation stream into frames keyed by
//! (frame number, attack direction), ordered the way the segmenter consumes
//! them.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::model::{Direction, PlayerId, PlayerObservation, Team};

/// All observations sharing one frame number and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub frame_num: u32,
    pub direction: Direction,
    pub players: Vec<PlayerObservation>,
}

impl Frame {
    /// Observations of `team`, in feed order.
    pub fn defenders(&self, team: Team) -> Vec<&PlayerObservation> {
        self.players.iter().filter(|p| p.team == team).collect()
    }
}

/// Frames sorted ascending by (frame number, direction).
#[derive(Debug, Clone, Default)]
pub struct FrameIndex {
    frames: Vec<Frame>,
    observation_count: usize,
    duplicate_count: usize,
}

impl FrameIndex {
    /// Build the index. A repeated (frame_num, player_id) pair keeps the
    /// first observation; later ones are counted and discarded.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = PlayerObservation>,
    {
        let mut grouped: BTreeMap<(u32, Direction), Vec<PlayerObservation>> = BTreeMap::new();
        let mut seen: FxHashSet<(u32, PlayerId)> = FxHashSet::default();
        let mut observation_count = 0;
        let mut duplicate_count = 0;

        for obs in observations {
            if !seen.insert((obs.frame_num, obs.player_id.clone())) {
                duplicate_count += 1;
                tracing::warn!(
                    frame = obs.frame_num,
                    player = %obs.player_id,
                    "duplicate observation dropped"
                );
                continue;
            }
            observation_count += 1;
            grouped
                .entry((obs.frame_num, obs.direction))
                .or_default()
                .push(obs);
        }

        let frames = grouped
            .into_iter()
            .map(|((frame_num, direction), players)| Frame {
                frame_num,
                direction,
                players,
            })
            .collect();

        Self {
            frames,
            observation_count,
            duplicate_count,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Observations kept after duplicate removal.
    pub fn observation_count(&self) -> usize {
        self.observation_count
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }
}
