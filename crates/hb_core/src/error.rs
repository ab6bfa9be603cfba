use thiserror::Error;

use crate::model::{Direction, Team};

/// Problems with the formation template table.
///
/// All of these are fatal and surface before any frame is processed.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to parse template table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Template table is empty")]
    Empty,

    #[error("Template '{label}' ({direction}) has {found} points, expected {expected}")]
    WrongPointCount {
        label: String,
        direction: Direction,
        found: usize,
        expected: usize,
    },

    #[error("Template '{label}' is missing its {direction} variant")]
    MissingDirection { label: String, direction: Direction },

    #[error("Template '{label}' ({direction}) point {index} ({x}, {y}) lies outside the unit square")]
    PointOutOfRange {
        label: String,
        direction: Direction,
        index: usize,
        x: f64,
        y: f64,
    },

    #[error("Duplicate template label: {label}")]
    DuplicateLabel { label: String },

    #[error("Template label must not be empty")]
    EmptyLabel,
}

/// Invalid analysis parameters.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid inner zone {axis} band: ({min}, {max})")]
    InvalidZone {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Minimum phase duration must be at least one frame")]
    ZeroMinDuration,

    #[error("Team {team} cannot defend in both directions")]
    SameDefenders { team: Team },
}

/// Startup failure of the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
