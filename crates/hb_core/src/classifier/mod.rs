//! # Frame Classifier
//!
//! Maps the defenders of one frame to a formation label and a confidence.
//!
//! ## Strategies
//! - `zone_count` - number of defenders inside the inner zone
//! - `template_match` - optimal assignment against the template registry
//!
//! Frames with fewer than [`MIN_DEFENDERS`] defenders are skipped: they
//! produce no classification at all, whatever the strategy.

pub mod template_match;
pub mod zone_count;

pub use template_match::{TemplateMatchStrategy, TemplateScore};
pub use zone_count::ZoneCountStrategy;

use crate::config::{AnalysisConfig, DefenderAssignment, StrategyKind};
use crate::frames::Frame;
use crate::model::{Direction, FrameClassification, PlayerObservation};
use crate::templates::TemplateRegistry;

/// Court defenders needed before a frame can be classified.
pub const MIN_DEFENDERS: usize = 6;

/// Label and confidence for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

/// A per-frame classification rule.
///
/// Implementations are pure: the result depends only on the defender
/// positions, the direction and immutable strategy state.
pub trait FormationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `defenders` holds at least [`MIN_DEFENDERS`] entries.
    fn classify(&self, defenders: &[&PlayerObservation], direction: Direction) -> Classification;
}

/// Applies a strategy to frames.
pub struct FrameClassifier {
    strategy: Box<dyn FormationStrategy>,
    defenders: DefenderAssignment,
}

impl FrameClassifier {
    pub fn new(strategy: Box<dyn FormationStrategy>, defenders: DefenderAssignment) -> Self {
        Self {
            strategy,
            defenders,
        }
    }

    /// Strategy selected by `config.strategy`.
    pub fn from_config(config: &AnalysisConfig, registry: &TemplateRegistry) -> Self {
        let strategy: Box<dyn FormationStrategy> = match config.strategy {
            StrategyKind::ZoneCount => Box::new(ZoneCountStrategy::new(config.inner_zone)),
            StrategyKind::TemplateMatch => {
                Box::new(TemplateMatchStrategy::new(registry).with_selection(config.defender_selection))
            }
        };
        Self::new(strategy, config.defenders)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// `None` when the frame has too few defenders.
    pub fn classify_frame(&self, frame: &Frame) -> Option<FrameClassification> {
        let defenders = frame.defenders(self.defenders.defending_team(frame.direction));
        if defenders.len() < MIN_DEFENDERS {
            return None;
        }

        let Classification { label, confidence } = self.strategy.classify(&defenders, frame.direction);
        Some(FrameClassification {
            frame_num: frame.frame_num,
            direction: frame.direction,
            formation_label: label,
            confidence,
        })
    }
}

impl std::fmt::Debug for FrameClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClassifier")
            .field("strategy", &self.strategy.name())
            .field("defenders", &self.defenders)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerObservation, Team};

    fn frame_with(red: usize, white: usize, direction: Direction) -> Frame {
        let mut players = Vec::new();
        for i in 0..red {
            players.push(PlayerObservation::new(10, format!("r{i}"), Team::Red, 0.7, 0.1 + i as f64 * 0.1, direction));
        }
        for i in 0..white {
            players.push(PlayerObservation::new(10, format!("w{i}"), Team::White, 0.3, 0.1 + i as f64 * 0.1, direction));
        }
        Frame {
            frame_num: 10,
            direction,
            players,
        }
    }

    #[test]
    fn test_insufficient_defenders_are_skipped() {
        let registry = TemplateRegistry::builtin().unwrap();
        for config in [AnalysisConfig::zone_count(), AnalysisConfig::template_match()] {
            let classifier = FrameClassifier::from_config(&config, &registry);
            // five red defenders while RIGHT is attacked, plenty of white attackers
            assert!(classifier.classify_frame(&frame_with(5, 7, Direction::Right)).is_none());
            assert!(classifier.classify_frame(&frame_with(6, 0, Direction::Right)).is_some());
        }
    }

    #[test]
    fn test_defending_team_follows_direction() {
        let registry = TemplateRegistry::builtin().unwrap();
        let classifier = FrameClassifier::from_config(&AnalysisConfig::default(), &registry);

        // LEFT: white defends
        assert!(classifier.classify_frame(&frame_with(6, 2, Direction::Left)).is_none());
        let result = classifier.classify_frame(&frame_with(2, 6, Direction::Left)).unwrap();
        assert_eq!(result.direction, Direction::Left);
        assert_eq!(result.frame_num, 10);
    }

    #[test]
    fn test_strategy_selected_by_config() {
        let registry = TemplateRegistry::builtin().unwrap();
        let zone = FrameClassifier::from_config(&AnalysisConfig::zone_count(), &registry);
        let template = FrameClassifier::from_config(&AnalysisConfig::template_match(), &registry);
        assert_eq!(zone.strategy_name(), "zone-count");
        assert_eq!(template.strategy_name(), "template-match");
    }
}
