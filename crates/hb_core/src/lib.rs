//! # hb_core - Handball Defensive Formation Engine
//!
//! Turns a tracked position feed into a timeline of defensive phases, each
//! labelled with its dominant formation (0-6, 1-5, 1-2-3, 3-3, 2-4).
//!
//! ## Pipeline
//! 1. [`frames`] groups observations by (frame, direction)
//! 2. [`classifier`] labels every frame with at least six defenders
//! 3. [`phase::segmenter`] cuts the frame stream into raw phases
//! 4. [`phase::merger`] folds undersized phases into their neighbours
//! 5. [`phase::aggregator`] reduces each phase to one dominant formation
//!
//! [`pipeline::Analyzer`] drives the whole chain.
//!
//! ```rust
//! use hb_core::{AnalysisConfig, Analyzer, Direction, PlayerObservation, Team};
//!
//! let observations: Vec<PlayerObservation> = (0..6)
//!     .map(|i| PlayerObservation::new(1, format!("r{i}"), Team::Red, 0.7, 0.3 + i as f64 * 0.08, Direction::Right))
//!     .collect();
//!
//! let analyzer = Analyzer::with_builtin_templates(AnalysisConfig::default()).unwrap();
//! let report = analyzer.analyze(observations);
//! assert_eq!(report.formations[0].formation_label, "0-6");
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod frames;
pub mod model;
pub mod phase;
pub mod pipeline;
pub mod templates;
pub mod zone;

pub use classifier::{FormationStrategy, FrameClassifier};
pub use config::{AggregationPolicy, AnalysisConfig, DefenderAssignment, DefenderSelection, StrategyKind};
pub use error::{AnalysisError, ConfigError, TemplateError};
pub use frames::{Frame, FrameIndex};
pub use model::{
    Direction, DominantFormation, EndReason, FrameClassification, Phase, PlayerId, PlayerObservation, Team,
    UNKNOWN_LABEL,
};
pub use pipeline::{AnalysisReport, Analyzer, ClassificationTimeline, Diagnostics};
pub use templates::{FormationTemplate, TemplateRegistry};
pub use zone::{Band, InnerZone};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
