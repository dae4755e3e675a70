//! Correction heuristics: defensive passes that repair the small overlaps
//! and stuck states accumulated floating-point round-off leaves behind
//! (spec.md S:4.4). These trade symplecticity for robustness, as the
//! specification allows.

use crate::geometry::{cell_of, Vec2};
use crate::predictor::Axis;
use crate::walls::{Point, WallSet};

/// Wall overlap repair (`fix_delta`): bounces a disk back if it's drifted
/// into a wall it didn't register a collision against, and unsticks disks
/// whose trajectory is exactly axis-aligned into a wall.
pub fn fix_delta(pos: &mut Vec2, vel: &mut Vec2, r: f64, axis: Axis, walls: &WallSet) {
    let (i, j) = cell_of(*pos);
    let (i, j) = (i as f64, j as f64);

    match axis {
        Axis::X => {
            if pos.x < i + 1.0 && i + 1.0 < pos.x + r && vel.x > 0.0 {
                if walls.contains(Point::new(i as i32 + 1, j as i32), Point::new(i as i32 + 1, j as i32 + 1)) {
                    vel.x *= -1.0;
                }
            } else if pos.x - r < i && i < pos.x && vel.x < 0.0 {
                if walls.contains(Point::new(i as i32, j as i32), Point::new(i as i32, j as i32 + 1)) {
                    vel.x *= -1.0;
                }
            }
            if pos.y < j + 1.0 && j + 1.0 < pos.y + r && vel.y == 0.0 {
                if walls.contains(Point::new(i as i32, j as i32 + 1), Point::new(i as i32 + 1, j as i32 + 1)) {
                    pos.y -= r;
                }
            } else if pos.y - r < j && j < pos.y && vel.y == 0.0 {
                if walls.contains(Point::new(i as i32, j as i32), Point::new(i as i32 + 1, j as i32)) {
                    pos.y += r;
                }
            }
        }
        Axis::Y => {
            if pos.y < j + 1.0 && j + 1.0 < pos.y + r && vel.y > 0.0 {
                if walls.contains(Point::new(i as i32, j as i32 + 1), Point::new(i as i32 + 1, j as i32 + 1)) {
                    vel.y *= -1.0;
                }
            } else if pos.y - r < j && j < pos.y && vel.y < 0.0 {
                if walls.contains(Point::new(i as i32, j as i32), Point::new(i as i32 + 1, j as i32)) {
                    vel.y *= -1.0;
                }
            }
            if pos.x < i + 1.0 && i + 1.0 < pos.x + r && vel.x == 0.0 {
                if walls.contains(Point::new(i as i32 + 1, j as i32), Point::new(i as i32 + 1, j as i32 + 1)) {
                    pos.x -= r;
                }
            } else if pos.x - r < i && i < pos.x && vel.x == 0.0 {
                if walls.contains(Point::new(i as i32, j as i32), Point::new(i as i32, j as i32 + 1)) {
                    pos.x += r;
                }
            }
        }
    }
}

/// Pair overlap repair (`pull_apart`): separates two disks along both axes
/// when the predictor reports a negative collision time for them. The
/// subsequent `next_event` call re-resolves correctly.
pub fn pull_apart(positions: &mut [Vec2], r: f64, a: usize, b: usize) {
    for axis in 0..2 {
        if positions[a][axis] > positions[b][axis] {
            positions[a][axis] += r;
            positions[b][axis] -= r;
        } else {
            positions[a][axis] -= r;
            positions[b][axis] += r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_delta_bounces_drifted_disk_back_off_right_wall() {
        let mut walls = WallSet::new();
        walls.insert(Point::new(1, 0), Point::new(1, 1));
        let mut pos = Vec2::new(0.95, 0.5);
        let mut vel = Vec2::new(1.0, 0.0);
        fix_delta(&mut pos, &mut vel, 0.1, Axis::X, &walls);
        assert_eq!(vel.x, -1.0);
    }

    #[test]
    fn fix_delta_leaves_velocity_alone_through_an_opening() {
        let walls = WallSet::new();
        let mut pos = Vec2::new(0.95, 0.5);
        let mut vel = Vec2::new(1.0, 0.0);
        fix_delta(&mut pos, &mut vel, 0.1, Axis::X, &walls);
        assert_eq!(vel.x, 1.0);
    }

    #[test]
    fn pull_apart_increases_separation_along_line_of_centres() {
        let mut positions = [Vec2::new(0.5, 0.5), Vec2::new(0.52, 0.5)];
        pull_apart(&mut positions, 0.1, 0, 1);
        let sep_after = (positions[1] - positions[0]).norm();
        assert!(sep_after > 0.02);
    }
}
