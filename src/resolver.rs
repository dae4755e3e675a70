//! The collision resolver: velocity updates for wall rebounds and elastic
//! disk-disk collisions (spec.md S:4.3).

use crate::geometry::Vec2;
use crate::predictor::EventKind;

/// Applies the winning event's velocity update in place.
pub fn resolve(positions: &[Vec2], velocities: &mut [Vec2], event: EventKind) {
    match event {
        EventKind::Wall { disk, axis } => {
            velocities[disk][axis.index()] *= -1.0;
        }
        EventKind::Pair { a, b } => {
            let x_hat = (positions[b] - positions[a]).normalized();
            let beta = (velocities[b] - velocities[a]).dot(x_hat);
            velocities[a] += x_hat * beta;
            velocities[b] -= x_hat * beta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::Axis;

    #[test]
    fn wall_event_flips_one_axis() {
        let positions = [Vec2::new(0.5, 0.5)];
        let mut velocities = [Vec2::new(1.0, 0.0)];
        resolve(
            &positions,
            &mut velocities,
            EventKind::Wall {
                disk: 0,
                axis: Axis::X,
            },
        );
        assert_eq!(velocities[0], Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn s1_head_on_collision_reverses_velocities() {
        let positions = [Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5)];
        let mut velocities = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)];
        resolve(&positions, &mut velocities, EventKind::Pair { a: 0, b: 1 });
        assert!((velocities[0].x + 1.0).abs() < 1e-9);
        assert!((velocities[1].x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn elastic_collision_preserves_momentum() {
        let positions = [Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.6)];
        let before = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)];
        let mut velocities = before;
        resolve(&positions, &mut velocities, EventKind::Pair { a: 0, b: 1 });
        let momentum_before = before[0] + before[1];
        let momentum_after = velocities[0] + velocities[1];
        assert!((momentum_before.x - momentum_after.x).abs() < 1e-9);
        assert!((momentum_before.y - momentum_after.y).abs() < 1e-9);
    }
}
