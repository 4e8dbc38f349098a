//! Measurement primitives shared across the workspace.

/// Maximum number of anchors a grid can carry.
///
/// Both inbound message layouts reserve space for exactly this many
/// anchors; grids with fewer anchors zero-fill the remaining slots.
pub const MAX_ANCHORS: usize = 9;

/// A 3D position in the grid frame, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Largest absolute component, used by the optional plausibility check.
    pub fn max_abs(&self) -> f32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

/// A GPS fix as reported by the module during the grid survey.
///
/// Latitude and longitude in degrees, altitude in meters. Precision is
/// whatever the module provides on the wire (single-precision floats); this
/// is a coarse reference for the grid, not a navigation-grade fix.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsPosition {
    pub lat: f32,
    pub lon: f32,
    pub alt: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_max_abs() {
        let p = Position {
            x: -3.0,
            y: 1.0,
            z: 2.0,
        };
        assert_eq!(p.max_abs(), 3.0);
    }

    #[test]
    fn position_default_is_origin() {
        let p = Position::default();
        assert_eq!(p, Position { x: 0.0, y: 0.0, z: 0.0 });
    }
}
