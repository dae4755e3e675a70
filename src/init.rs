//! Particle initialisation: random sequential deposition for position,
//! Maxwell-Boltzmann (normal) sampling for velocity. spec.md S:1 names this
//! an external collaborator invoked by the core; `original_source/initialize.py`
//! is small enough to carry faithfully as the default initialiser.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::geometry::Vec2;

/// Places `n` non-overlapping disks of radius `r` in the unit box `[r, 1-r]^2`
/// via random sequential deposition.
pub fn initial_positions(n: usize, r: f64, rng: &mut impl Rng) -> Vec<Vec2> {
    let mut positions: Vec<Vec2> = Vec::with_capacity(n);
    while positions.len() < n {
        let candidate = Vec2::new(rng.gen_range(r..(1.0 - r)), rng.gen_range(r..(1.0 - r)));
        let clear = positions
            .iter()
            .all(|p| (candidate - *p).norm() > 2.0 * r);
        if clear {
            positions.push(candidate);
        }
    }
    positions
}

/// Samples `n` velocities from a standard normal distribution per axis
/// (Maxwell-Boltzmann in 2D decomposes into independent normal components).
pub fn initial_velocities(n: usize, rng: &mut impl Rng) -> Vec<Vec2> {
    let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are always valid");
    (0..n)
        .map(|_| Vec2::new(normal.sample(rng), normal.sample(rng)))
        .collect()
}
