//! # Analysis Configuration
//!
//! All tunable parameters of the engine in one serde struct, loaded once at
//! startup and validated before any frame is touched.
//!
//! ## Usage
//! ```rust
//! use hb_core::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let geometric = AnalysisConfig::template_match();
//! assert!(config.validate().is_ok());
//! assert!(geometric.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Direction, Team};
use crate::zone::InnerZone;

/// Default minimum phase length in frames.
pub const DEFAULT_MIN_PHASE_DURATION: u32 = 50;

/// Per-frame classification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Count defenders inside the inner zone
    #[default]
    ZoneCount,
    /// Optimal assignment against the template table
    TemplateMatch,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::ZoneCount => "zone-count",
            StrategyKind::TemplateMatch => "template-match",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "zone-count" | "zone" => Ok(StrategyKind::ZoneCount),
            "template-match" | "template" => Ok(StrategyKind::TemplateMatch),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// How per-frame labels are reduced to one label per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationPolicy {
    /// Most frequent label; ties go to the label seen first
    #[default]
    Plurality,
    /// Highest mean confidence per label; ties go to the label seen first
    ConfidenceWeighted,
}

impl AggregationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationPolicy::Plurality => "plurality",
            AggregationPolicy::ConfidenceWeighted => "confidence-weighted",
        }
    }
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "plurality" | "vote" => Ok(AggregationPolicy::Plurality),
            "confidence-weighted" | "confidence" => Ok(AggregationPolicy::ConfidenceWeighted),
            other => Err(format!("unknown aggregation policy '{}'", other)),
        }
    }
}

/// Which six defenders template matching compares when more are on court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefenderSelection {
    /// The six nearest the defended goal
    #[default]
    GoalSide,
    /// The six that fit a template best; keeps a goalkeeper out of the shape
    BestFit,
}

impl DefenderSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefenderSelection::GoalSide => "goal-side",
            DefenderSelection::BestFit => "best-fit",
        }
    }
}

impl fmt::Display for DefenderSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefenderSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "goal-side" | "goal" => Ok(DefenderSelection::GoalSide),
            "best-fit" | "best" => Ok(DefenderSelection::BestFit),
            other => Err(format!("unknown defender selection '{}'", other)),
        }
    }
}

/// Which team defends for each attack direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenderAssignment {
    /// Defending team while the attack goes RIGHT
    pub right: Team,
    /// Defending team while the attack goes LEFT
    pub left: Team,
}

impl Default for DefenderAssignment {
    fn default() -> Self {
        Self {
            right: Team::Red,
            left: Team::White,
        }
    }
}

impl DefenderAssignment {
    #[inline]
    pub fn defending_team(&self, direction: Direction) -> Team {
        match direction {
            Direction::Right => self.right,
            Direction::Left => self.left,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Inner (9m) zone bounds
    pub inner_zone: InnerZone,
    /// Direction-change phases shorter than this are merged into a neighbour
    pub min_phase_duration: u32,
    pub strategy: StrategyKind,
    pub aggregation: AggregationPolicy,
    pub defenders: DefenderAssignment,
    /// Template matching only: subset used when more than six defenders are seen
    pub defender_selection: DefenderSelection,
    /// Classify frames on the rayon pool
    pub parallel: bool,
    /// Output rows spanning fewer frames are dropped (0 keeps all)
    pub min_output_duration: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            inner_zone: InnerZone::default(),
            min_phase_duration: DEFAULT_MIN_PHASE_DURATION,
            strategy: StrategyKind::ZoneCount,
            aggregation: AggregationPolicy::Plurality,
            defenders: DefenderAssignment::default(),
            defender_selection: DefenderSelection::GoalSide,
            parallel: true,
            min_output_duration: 0,
        }
    }
}

impl AnalysisConfig {
    /// Zone counting with plurality vote (default)
    pub fn zone_count() -> Self {
        Self::default()
    }

    /// Template matching, confidence-weighted aggregation
    pub fn template_match() -> Self {
        Self {
            strategy: StrategyKind::TemplateMatch,
            aggregation: AggregationPolicy::ConfidenceWeighted,
            ..Self::default()
        }
    }

    /// Single-threaded variant, useful for reproducing runs step by step
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Parse from YAML (JSON is accepted as a YAML subset) and validate.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.inner_zone.validate()?;
        if self.min_phase_duration == 0 {
            return Err(ConfigError::ZeroMinDuration);
        }
        if self.defenders.right == self.defenders.left {
            return Err(ConfigError::SameDefenders {
                team: self.defenders.right,
            });
        }
        Ok(())
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.min_phase_duration, 50);
        assert_eq!(cfg.strategy, StrategyKind::ZoneCount);
        assert_eq!(cfg.aggregation, AggregationPolicy::Plurality);
        assert_eq!(cfg.defenders.defending_team(Direction::Right), Team::Red);
        assert_eq!(cfg.defenders.defending_team(Direction::Left), Team::White);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_presets_differ() {
        let zone = AnalysisConfig::zone_count();
        let template = AnalysisConfig::template_match();
        assert_ne!(zone.strategy, template.strategy);
        assert_eq!(template.aggregation, AggregationPolicy::ConfidenceWeighted);
        assert!(!template.clone().sequential().parallel);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = AnalysisConfig::from_yaml_str(
            "strategy: template-match\nmin_phase_duration: 30\ninner_zone:\n  y: { min: 0.25, max: 0.75 }\n",
        )
        .unwrap();
        assert_eq!(cfg.strategy, StrategyKind::TemplateMatch);
        assert_eq!(cfg.min_phase_duration, 30);
        assert_eq!(cfg.inner_zone.y.min, 0.25);
        // untouched bands keep their defaults
        assert_eq!(cfg.inner_zone.right_x, InnerZone::default().right_x);
        assert_eq!(cfg.aggregation, AggregationPolicy::Plurality);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            AnalysisConfig::from_yaml_str("min_phase_duration: 0"),
            Err(ConfigError::ZeroMinDuration)
        ));
        assert!(matches!(
            AnalysisConfig::from_yaml_str("defenders: { right: red, left: red }"),
            Err(ConfigError::SameDefenders { team: Team::Red })
        ));
        assert!(matches!(
            AnalysisConfig::from_yaml_str("strategy: [1, 2]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_strategy_and_policy_from_str() {
        assert_eq!("template_match".parse::<StrategyKind>(), Ok(StrategyKind::TemplateMatch));
        assert_eq!("Zone-Count".parse::<StrategyKind>(), Ok(StrategyKind::ZoneCount));
        assert_eq!(
            "confidence".parse::<AggregationPolicy>(),
            Ok(AggregationPolicy::ConfidenceWeighted)
        );
        assert!("median".parse::<AggregationPolicy>().is_err());
        assert_eq!("best_fit".parse::<DefenderSelection>(), Ok(DefenderSelection::BestFit));
    }

    #[test]
    fn test_defender_selection_from_yaml() {
        assert_eq!(AnalysisConfig::default().defender_selection, DefenderSelection::GoalSide);
        let cfg = AnalysisConfig::from_yaml_str("strategy: template-match\ndefender_selection: best-fit\n").unwrap();
        assert_eq!(cfg.defender_selection, DefenderSelection::BestFit);
    }
}
