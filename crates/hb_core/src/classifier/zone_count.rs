//! Zone-count strategy: the label is the number of defenders stepping up into
//! the inner zone. Always fully confident.

use super::{Classification, FormationStrategy};
use crate::model::{Direction, PlayerObservation, UNKNOWN_LABEL};
use crate::zone::InnerZone;

#[derive(Debug, Clone, Copy)]
pub struct ZoneCountStrategy {
    zone: InnerZone,
}

impl ZoneCountStrategy {
    pub fn new(zone: InnerZone) -> Self {
        Self { zone }
    }

    pub fn count_inside(&self, defenders: &[&PlayerObservation], direction: Direction) -> usize {
        defenders
            .iter()
            .filter(|p| self.zone.contains(p.x, p.y, direction))
            .count()
    }
}

/// Formation named by the number of advanced defenders.
pub fn label_for_count(count: usize) -> &'static str {
    match count {
        0 => "0-6",
        1 => "1-5",
        2 => "2-4",
        3 => "3-3",
        _ => UNKNOWN_LABEL,
    }
}

impl FormationStrategy for ZoneCountStrategy {
    fn name(&self) -> &'static str {
        "zone-count"
    }

    fn classify(&self, defenders: &[&PlayerObservation], direction: Direction) -> Classification {
        let inside = self.count_inside(defenders, direction);
        Classification {
            label: label_for_count(inside).to_string(),
            confidence: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Team;

    /// Six RIGHT-direction defenders, the first `inside` of them in the zone.
    fn defenders(inside: usize) -> Vec<PlayerObservation> {
        (0..6)
            .map(|i| {
                let x = if i < inside { 0.5 } else { 0.7 };
                PlayerObservation::new(1, format!("p{i}"), Team::Red, x, 0.25 + i as f64 * 0.1, Direction::Right)
            })
            .collect()
    }

    fn classify(players: &[PlayerObservation], direction: Direction) -> Classification {
        let refs: Vec<&PlayerObservation> = players.iter().collect();
        ZoneCountStrategy::new(InnerZone::default()).classify(&refs, direction)
    }

    #[test]
    fn test_nobody_inside_is_zero_six() {
        let result = classify(&defenders(0), Direction::Right);
        assert_eq!(result.label, "0-6");
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_count_table() {
        assert_eq!(classify(&defenders(1), Direction::Right).label, "1-5");
        assert_eq!(classify(&defenders(2), Direction::Right).label, "2-4");
        assert_eq!(classify(&defenders(3), Direction::Right).label, "3-3");
        assert_eq!(classify(&defenders(4), Direction::Right).label, UNKNOWN_LABEL);
        assert_eq!(classify(&defenders(6), Direction::Right).label, UNKNOWN_LABEL);
    }

    #[test]
    fn test_zone_is_mirrored_for_left() {
        // x = 0.58 is inside the LEFT band but not the RIGHT band
        let players: Vec<_> = (0..6)
            .map(|i| {
                let x = if i == 0 { 0.58 } else { 0.3 };
                PlayerObservation::new(1, format!("p{i}"), Team::White, x, 0.5, Direction::Left)
            })
            .collect();
        assert_eq!(classify(&players, Direction::Left).label, "1-5");
        assert_eq!(classify(&players, Direction::Right).label, "0-6");
    }

    #[test]
    fn test_extra_defenders_are_counted() {
        let mut players = defenders(2);
        players.push(PlayerObservation::new(1, "p6", Team::Red, 0.45, 0.5, Direction::Right));
        assert_eq!(classify(&players, Direction::Right).label, "3-3");
    }
}
