//! Discrete quarter-turn rotation state.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

/// Accumulated quarter turns applied to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageRotationType {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl ImageRotationType {
    /// Rotation angle in radians (clockwise on screen).
    pub fn radians(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Clockwise90 => FRAC_PI_2,
            Self::Clockwise180 => PI,
            Self::Clockwise270 => 3.0 * FRAC_PI_2,
        }
    }

    pub fn rotated_clockwise(self) -> Self {
        match self {
            Self::None => Self::Clockwise90,
            Self::Clockwise90 => Self::Clockwise180,
            Self::Clockwise180 => Self::Clockwise270,
            Self::Clockwise270 => Self::None,
        }
    }

    pub fn rotated_counterclockwise(self) -> Self {
        match self {
            Self::None => Self::Clockwise270,
            Self::Clockwise90 => Self::None,
            Self::Clockwise180 => Self::Clockwise90,
            Self::Clockwise270 => Self::Clockwise180,
        }
    }

    /// True for 0° and 180°, where the image keeps its width/height roles.
    pub fn is_rotated_by_multiple_180(self) -> bool {
        matches!(self, Self::None | Self::Clockwise180)
    }
}

/// Direction of a quarter-turn command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateDirection {
    Clockwise,
    Counterclockwise,
}

impl RotateDirection {
    pub fn radians(self) -> f64 {
        match self {
            Self::Clockwise => FRAC_PI_2,
            Self::Counterclockwise => -FRAC_PI_2,
        }
    }

    /// Direction of a signed quarter-turn angle.
    pub fn from_radians(angle: f64) -> Self {
        if angle < 0.0 {
            Self::Counterclockwise
        } else {
            Self::Clockwise
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_clockwise_turns_cycle() {
        let mut r = ImageRotationType::None;
        for _ in 0..4 {
            r = r.rotated_clockwise();
        }
        assert_eq!(r, ImageRotationType::None);
    }

    #[test]
    fn test_clockwise_then_counterclockwise_is_identity() {
        for r in [
            ImageRotationType::None,
            ImageRotationType::Clockwise90,
            ImageRotationType::Clockwise180,
            ImageRotationType::Clockwise270,
        ] {
            assert_eq!(r.rotated_clockwise().rotated_counterclockwise(), r);
        }
    }

    #[test]
    fn test_multiple_of_180() {
        assert!(ImageRotationType::None.is_rotated_by_multiple_180());
        assert!(!ImageRotationType::Clockwise90.is_rotated_by_multiple_180());
        assert!(ImageRotationType::Clockwise180.is_rotated_by_multiple_180());
        assert!(!ImageRotationType::Clockwise270.is_rotated_by_multiple_180());
    }

    #[test]
    fn test_direction_from_angle() {
        assert_eq!(RotateDirection::from_radians(-FRAC_PI_2), RotateDirection::Counterclockwise);
        assert_eq!(RotateDirection::from_radians(FRAC_PI_2), RotateDirection::Clockwise);
    }
}
