//! # Phase Module
//!
//! Turns the ordered frame stream into defensive phases.
//!
//! - `segmenter` - state machine emitting raw phases
//! - `merger` - folds undersized phases into same-direction neighbours
//! - `aggregator` - one dominant formation per merged phase

pub mod aggregator;
pub mod merger;
pub mod segmenter;

pub use aggregator::{AggregationOutcome, PhaseAggregator};
pub use merger::PhaseMerger;
pub use segmenter::PhaseSegmenter;
