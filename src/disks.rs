//! The disk population: positions, velocities, and the shared radius that
//! makes the maze a hard-disk gas (spec.md S:3).

use crate::geometry::Vec2;

/// The mutable particle state the driver advances each tick. Disk indices
/// are stable for the lifetime of a run except when the shower appends a
/// new disk at the end.
#[derive(Clone, Debug, Default)]
pub struct DiskState {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

impl DiskState {
    pub fn new(positions: Vec<Vec2>, velocities: Vec<Vec2>) -> Self {
        assert_eq!(
            positions.len(),
            velocities.len(),
            "position and velocity counts must match"
        );
        DiskState {
            positions,
            velocities,
        }
    }

    pub fn n(&self) -> usize {
        self.positions.len()
    }

    pub fn push(&mut self, position: Vec2, velocity: Vec2) {
        self.positions.push(position);
        self.velocities.push(velocity);
    }
}

/// Checks the hard-disk invariant `r > 0`, `0 < 2r < 1` (spec.md S:3).
pub fn validate_radius(r: f64) -> bool {
    r > 0.0 && 2.0 * r < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_must_let_two_disks_share_a_cell() {
        assert!(validate_radius(0.1));
        assert!(!validate_radius(0.5));
        assert!(!validate_radius(0.0));
        assert!(!validate_radius(-0.1));
    }

    #[test]
    fn push_keeps_positions_and_velocities_aligned() {
        let mut state = DiskState::new(vec![Vec2::new(0.0, 0.0)], vec![Vec2::new(0.0, 0.0)]);
        state.push(Vec2::new(1.0, 1.0), Vec2::new(0.1, 0.1));
        assert_eq!(state.n(), 2);
    }
}
