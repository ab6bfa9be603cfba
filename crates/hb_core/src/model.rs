//! Core data model
//!
//! Observations come in from the position feed, classifications and phases are
//! produced by the engine, `DominantFormation` rows are the terminal output.
//!
//! ## Coordinate System
//! - x: 0 = left goal line, 1 = right goal line
//! - y: 0 = one touchline, 1 = the other
//!
//! All geometry is mirrored by [`Direction`]: the defended goal is at x = 1
//! when the attack goes RIGHT and at x = 0 when it goes LEFT.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label emitted when no formation rule applies.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Attack direction of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Right, Direction::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Team identity as recorded by the feed (shirt colour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    White,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::White => "white",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Team::Red),
            "white" => Ok(Team::White),
            other => Err(format!("unknown team '{}'", other)),
        }
    }
}

/// Stable, opaque player identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One player at one frame, in normalized court coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerObservation {
    pub frame_num: u32,
    pub player_id: PlayerId,
    pub team: Team,
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
}

impl PlayerObservation {
    pub fn new(
        frame_num: u32,
        player_id: impl Into<String>,
        team: Team,
        x: f64,
        y: f64,
        direction: Direction,
    ) -> Self {
        Self {
            frame_num,
            player_id: PlayerId::new(player_id),
            team,
            x,
            y,
            direction,
        }
    }

    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Formation label assigned to a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameClassification {
    pub frame_num: u32,
    pub direction: Direction,
    pub formation_label: String,
    /// Goodness of fit in [0, 1]
    pub confidence: f64,
}

/// Why a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The attack direction flipped.
    DirectionChange,
    /// A defender that started outside the inner zone came back inside.
    OuterReturn,
    /// The recording ended while the phase was open.
    EndOfData,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::DirectionChange => "direction_change",
            EndReason::OuterReturn => "outer_return",
            EndReason::EndOfData => "end_of_data",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous defensive action for one attack direction.
///
/// `end_frame` is inclusive: it is the last frame observed before the
/// closing trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub start_frame: u32,
    pub end_frame: u32,
    pub direction: Direction,
    pub end_reason: EndReason,
    /// Number of raw phases folded into this one (1 for an unmerged phase)
    pub merged_count: usize,
}

impl Phase {
    pub fn new(start_frame: u32, end_frame: u32, direction: Direction, end_reason: EndReason) -> Self {
        Self {
            start_frame,
            end_frame,
            direction,
            end_reason,
            merged_count: 1,
        }
    }

    /// Number of frames spanned, both ends included.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end_frame.saturating_sub(self.start_frame) + 1
    }

    #[inline]
    pub fn contains(&self, frame_num: u32) -> bool {
        self.start_frame <= frame_num && frame_num <= self.end_frame
    }
}

/// One output row: the representative formation of a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantFormation {
    pub start_frame: u32,
    pub end_frame: u32,
    pub formation_label: String,
    pub direction: Direction,
    /// Mean confidence over the winning label's frames only
    pub aggregate_confidence: f64,
    /// Occurrences of every label seen inside the phase, keyed in label
    /// order so reruns over the same feed produce identical tables
    pub breakdown: BTreeMap<String, usize>,
}

impl DominantFormation {
    /// Breakdown rendered as `label: n, label: n`, sorted by label rather
    /// than by the frame a label first appeared in.
    pub fn breakdown_string(&self) -> String {
        self.breakdown
            .iter()
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn frame_count(&self) -> usize {
        self.breakdown.values().sum()
    }
}
