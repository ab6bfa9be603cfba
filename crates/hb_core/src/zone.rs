//! Inner Zone (9m area)
//!
//! Rectangle in normalized court coordinates in front of the defended goal.
//! Defenders standing inside it play a central, advanced role; counting them
//! drives the zone-count classifier and the outer-return phase boundary.
//!
//! The x band is mirrored per attack direction, the y band is shared.
//! Bounds are exclusive on both sides.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Direction;

/// Open interval `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min < value && value < self.max
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        let in_unit = (0.0..=1.0).contains(&self.min) && (0.0..=1.0).contains(&self.max);
        if !in_unit || self.min >= self.max {
            return Err(ConfigError::InvalidZone {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Direction-mirrored inner zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InnerZone {
    /// x band used while the attack goes RIGHT
    pub right_x: Band,
    /// x band used while the attack goes LEFT
    pub left_x: Band,
    /// y band, both directions
    pub y: Band,
}

impl Default for InnerZone {
    fn default() -> Self {
        Self {
            right_x: Band::new(0.4, 0.55),
            left_x: Band::new(0.45, 0.6),
            y: Band::new(0.2, 0.8),
        }
    }
}

impl InnerZone {
    pub fn x_band(&self, direction: Direction) -> Band {
        match direction {
            Direction::Right => self.right_x,
            Direction::Left => self.left_x,
        }
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64, direction: Direction) -> bool {
        self.x_band(direction).contains(x) && self.y.contains(y)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.right_x.validate("right x")?;
        self.left_x.validate("left x")?;
        self.y.validate("y")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zone_is_mirrored() {
        let zone = InnerZone::default();

        // 0.42 is inside the RIGHT band only, 0.58 inside the LEFT band only
        assert!(zone.contains(0.42, 0.5, Direction::Right));
        assert!(!zone.contains(0.42, 0.5, Direction::Left));
        assert!(zone.contains(0.58, 0.5, Direction::Left));
        assert!(!zone.contains(0.58, 0.5, Direction::Right));
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let zone = InnerZone::default();
        assert!(!zone.contains(0.4, 0.5, Direction::Right));
        assert!(!zone.contains(0.55, 0.5, Direction::Right));
        assert!(!zone.contains(0.5, 0.2, Direction::Right));
        assert!(!zone.contains(0.5, 0.8, Direction::Right));
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let zone = InnerZone {
            right_x: Band::new(0.6, 0.4),
            ..Default::default()
        };
        assert!(matches!(
            zone.validate(),
            Err(ConfigError::InvalidZone { axis: "right x", .. })
        ));
        assert!(InnerZone::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_band_outside_unit_range() {
        let zone = InnerZone {
            y: Band::new(-0.1, 0.8),
            ..Default::default()
        };
        assert!(zone.validate().is_err());
    }
}
