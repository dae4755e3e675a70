//! The particle shower: rate-controlled injection at the entry chamber,
//! used by the fan variant of the driver (spec.md S:4.6).

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::disks::DiskState;
use crate::geometry::Vec2;

/// Either injects a new disk at the entry chamber or pushes an existing
/// occupant further in, per spec.md S:4.6. Returns `true` if a new disk
/// was appended.
pub fn maybe_inject(state: &mut DiskState, r: f64, y_entry: i32, orig_n: usize, rng: &mut impl Rng) -> bool {
    let occupants: Vec<usize> = state
        .positions
        .iter()
        .enumerate()
        .filter(|(_, p)| p.y.floor() as i32 == y_entry)
        .map(|(k, _)| k)
        .collect();

    let n = state.n();
    let mut prob_new = rng.gen::<f64>() < 2.0 * (orig_n as f64 / n as f64 - 0.5);
    if occupants.is_empty() {
        prob_new = true;
    }

    if prob_new {
        let base = y_entry as f64;
        let margin = 1.05 * r;
        let new_pos = loop {
            let candidate = Vec2::new(
                rng.gen_range(margin..(1.0 - margin)),
                rng.gen_range((1.0 - 2.0 * margin)..(1.0 - margin)) + base,
            );
            let clear = state
                .positions
                .iter()
                .all(|p| (candidate - *p).norm() > 2.0 * r);
            if clear {
                break candidate;
            }
        };
        let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are always valid");
        let new_vel = Vec2::new(rng.gen_range(-0.1..0.1), -normal.sample(rng).abs());
        state.push(new_pos, new_vel);
        true
    } else {
        let pick = occupants[rng.gen_range(0..occupants.len())];
        state.velocities[pick].y -= rng.gen_range(0.0..1.0f64).abs();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn forces_injection_when_chamber_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut state = DiskState::new(vec![Vec2::new(0.5, 3.5)], vec![Vec2::new(0.0, -1.0)]);
        let before = state.n();
        let injected = maybe_inject(&mut state, 0.05, 10, before, &mut rng);
        assert!(injected);
        assert_eq!(state.n(), before + 1);
    }

    #[test]
    fn new_disk_clears_existing_occupants() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut state = DiskState::new(
            vec![Vec2::new(0.5, 10.5)],
            vec![Vec2::new(0.0, -0.2)],
        );
        maybe_inject(&mut state, 0.05, 10, 1, &mut rng);
        if state.n() == 2 {
            let sep = (state.positions[0] - state.positions[1]).norm();
            assert!(sep > 0.1);
        }
    }
}
