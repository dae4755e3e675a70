//! The simulation driver: the fixed-`dt` outer loop, event interleaving and
//! the exit-aperture termination check (spec.md S:4.5), plus the fan variant
//! that interleaves particle-shower injections (spec.md S:4.5's "Fan
//! variant" and S:4.6).

use log::debug;
use rand::Rng;

use crate::correction::{fix_delta, pull_apart};
use crate::disks::DiskState;
use crate::io::LogWriter;
use crate::predictor::{next_event, Axis, EventKind, NextEvent};
use crate::resolver::resolve;
use crate::shower::maybe_inject;
use crate::walls::WallSet;

/// The result of running the driver to completion: elapsed simulated time
/// and whether a disk reached the exit (spec.md S:6's exit code policy).
pub struct RunOutcome {
    pub elapsed: f64,
    pub escaped: bool,
}

/// Integrates one wall-clock slice `[t, t + dt]`, interleaving free flight
/// with wall/pair events as they fall due (spec.md S:4.5's `simulate_step`).
pub fn simulate_step(
    state: &mut DiskState,
    r: f64,
    walls: &WallSet,
    t: f64,
    mut next: NextEvent,
    dt: f64,
    stuck_escape_iters: usize,
) -> (f64, NextEvent) {
    let n = state.n();
    let next_t = t + dt;
    let mut t = t;
    let mut q = 0usize;
    let mut v_old = state.velocities.clone();

    while t + next.time <= next_t {
        let stuck = q > stuck_escape_iters
            && (0..n).all(|k| {
                (state.velocities[k].x.abs() - v_old[k].x.abs()).abs() < f64::EPSILON
                    && (state.velocities[k].y.abs() - v_old[k].y.abs()).abs() < f64::EPSILON
            });
        let step = if stuck {
            debug!("stuck-escape triggered after {q} inner iterations, taking the longer step");
            dt.max(next.time)
        } else {
            dt.min(next.time)
        };
        q += 1;
        t += step;

        for k in 0..n {
            for axis in [Axis::X, Axis::Y] {
                let (mut pos, mut vel) = (state.positions[k], state.velocities[k]);
                fix_delta(&mut pos, &mut vel, r, axis, walls);
                state.positions[k] = pos;
                state.velocities[k] = vel;
                state.positions[k][axis.index()] += state.velocities[k][axis.index()] * step;
            }
        }

        resolve(&state.positions, &mut state.velocities, next.kind(n));
        next = next_event(&state.positions, &state.velocities, r, walls);
        if next.time < 0.0 {
            if let EventKind::Pair { a, b } = next.kind(n) {
                pull_apart(&mut state.positions, r, a, b);
            }
        }
        v_old = state.velocities.clone();
    }

    let remain_t = next_t - t;
    for k in 0..n {
        for axis in [Axis::X, Axis::Y] {
            let (mut pos, mut vel) = (state.positions[k], state.velocities[k]);
            fix_delta(&mut pos, &mut vel, r, axis, walls);
            state.positions[k] = pos;
            state.velocities[k] = vel;
            state.positions[k][axis.index()] += state.velocities[k][axis.index()] * remain_t;
        }
    }
    t = next_t;
    next.time -= remain_t;

    (t, next)
}

/// Returns `true` if any disk has cleared the exit aperture below the
/// maze's rightmost column (spec.md S:4.5's exit check).
fn check_exit(state: &DiskState, r: f64, max_x: f64) -> bool {
    state
        .positions
        .iter()
        .any(|p| max_x - 2.0 < p.x && p.x < max_x + 1.0 && p.y + r < 0.0)
}

/// Runs the outer driver loop for up to `n_events` event steps, logging
/// every `stepsize` events, terminating early if any disk escapes.
pub fn run_simulation(
    state: &mut DiskState,
    r: f64,
    walls: &WallSet,
    max_x: f64,
    n_events: u64,
    dt: f64,
    stepsize: u64,
    stuck_escape_iters: usize,
    log: &mut LogWriter,
) -> std::io::Result<RunOutcome> {
    let mut t = 0.0;
    let mut next = next_event(&state.positions, &state.velocities, r, walls);
    log.write_record(t, 0, &state.positions, &state.velocities)?;

    let beacon = (stepsize / 10).max(1);
    for i in 0..n_events {
        let (new_t, new_next) = simulate_step(state, r, walls, t, next, dt, stuck_escape_iters);
        t = new_t;
        next = new_next;

        if stepsize > 0 && (i + 1) % stepsize == 0 {
            log.write_record(t, ((i + 1) / stepsize) as usize, &state.positions, &state.velocities)?;
        }
        if (i + 1) % beacon == 0 {
            debug!("simulating timestep {t:.5} s ({} events)", i + 1);
        }

        if check_exit(state, r, max_x) {
            debug!("timestep {t:.5}; a particle solved the maze! Halting");
            return Ok(RunOutcome {
                elapsed: t,
                escaped: true,
            });
        }
    }
    Ok(RunOutcome {
        elapsed: t,
        escaped: false,
    })
}

/// The fan variant: identical to `run_simulation`, except that on each log
/// boundary the shower may inject a new disk, with probability
/// `fan_speed / fan_probability_divisor` (spec.md S:4.5's "Fan variant").
#[allow(clippy::too_many_arguments)]
pub fn run_simulation_with_fan(
    state: &mut DiskState,
    r: f64,
    walls: &WallSet,
    max_x: f64,
    n_events: u64,
    dt: f64,
    stepsize: u64,
    stuck_escape_iters: usize,
    fan_speed: f64,
    fan_probability_divisor: f64,
    y_entry: i32,
    orig_n: usize,
    log: &mut LogWriter,
    rng: &mut impl Rng,
) -> std::io::Result<RunOutcome> {
    let mut t = 0.0;
    let mut next = next_event(&state.positions, &state.velocities, r, walls);
    log.write_record(t, 0, &state.positions, &state.velocities)?;

    let beacon = (stepsize / 10).max(1);
    for i in 0..n_events {
        let (new_t, new_next) = simulate_step(state, r, walls, t, next, dt, stuck_escape_iters);
        t = new_t;
        next = new_next;

        if stepsize > 0 && (i + 1) % stepsize == 0 {
            log.write_record(t, ((i + 1) / stepsize) as usize, &state.positions, &state.velocities)?;

            if rng.gen::<f64>() < fan_speed / fan_probability_divisor {
                maybe_inject(state, r, y_entry, orig_n, rng);
                next = next_event(&state.positions, &state.velocities, r, walls);
            }
        }
        if (i + 1) % beacon == 0 {
            debug!(
                "simulating timestep {t:.5} s ({} particles, {} events)",
                state.n(),
                i + 1
            );
        }

        if check_exit(state, r, max_x) {
            debug!("timestep {t:.5}; a particle solved the maze! Halting");
            return Ok(RunOutcome {
                elapsed: t,
                escaped: true,
            });
        }
    }
    Ok(RunOutcome {
        elapsed: t,
        escaped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::walls::Point;
    use tempfile::tempdir;

    fn unit_square_walls() -> WallSet {
        let mut walls = WallSet::new();
        walls.insert(Point::new(0, 0), Point::new(1, 0));
        walls.insert(Point::new(1, 0), Point::new(1, 1));
        walls.insert(Point::new(1, 1), Point::new(0, 1));
        walls.insert(Point::new(0, 1), Point::new(0, 0));
        walls
    }

    #[test]
    fn s3_single_disk_bounces_off_the_wall() {
        let walls = unit_square_walls();
        let mut state = DiskState::new(vec![Vec2::new(0.5, 0.5)], vec![Vec2::new(1.0, 0.0)]);
        let r = 0.1;
        let next = next_event(&state.positions, &state.velocities, r, &walls);
        assert!((next.time - 0.4).abs() < 1e-9);
        let (t, _) = simulate_step(&mut state, r, &walls, 0.0, next, 1.0, 100);
        assert!(t <= 1.0);
        assert!(state.velocities[0].x < 0.0);
    }

    #[test]
    fn pair_invariant_holds_after_collision_and_correction() {
        let walls = unit_square_walls();
        let mut state = DiskState::new(
            vec![Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5)],
            vec![Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)],
        );
        let r = 0.1;
        let mut t = 0.0;
        let mut next = next_event(&state.positions, &state.velocities, r, &walls);
        for _ in 0..20 {
            let (new_t, new_next) = simulate_step(&mut state, r, &walls, t, next, 0.05, 100);
            t = new_t;
            next = new_next;
        }
        let sep = (state.positions[1] - state.positions[0]).norm();
        assert!(sep >= 2.0 * r - 1e-6);
    }

    #[test]
    fn s5_disk_above_exit_escapes() {
        let mut walls = unit_square_walls();
        // open an exit at the bottom of the single cell.
        walls.remove(Point::new(0, 0), Point::new(1, 0));
        let mut state = DiskState::new(vec![Vec2::new(0.5, 0.3)], vec![Vec2::new(0.0, -1.0)]);
        let dir = tempdir().unwrap();
        let mut log = LogWriter::create(dir.path().join("s5.log")).unwrap();
        let outcome =
            run_simulation(&mut state, 0.1, &walls, 1.0, 10_000, 0.01, 50, 100, &mut log).unwrap();
        assert!(outcome.escaped);
        assert!(outcome.elapsed > 0.0);
    }

    #[test]
    fn s6_stuck_disks_still_advance_time() {
        // two disks whose wall-bounce velocities never change magnitude
        // (a perfect back-and-forth) should still have the driver advance
        // by at least one full dt once the stuck-escape threshold trips.
        let walls = unit_square_walls();
        let mut state = DiskState::new(
            vec![Vec2::new(0.11, 0.5), Vec2::new(0.89, 0.5)],
            vec![Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)],
        );
        let r = 0.01;
        let dt = 1.0;
        let next = next_event(&state.positions, &state.velocities, r, &walls);
        let (t, _) = simulate_step(&mut state, r, &walls, 0.0, next, dt, 5);
        assert!(t >= dt - 1e-9);
    }
}
