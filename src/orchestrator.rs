//! The orchestrator: owns the persistent `(positions, velocities, maze)`
//! state triple, wires the initialiser, driver and file-format exporters
//! together, and exposes the operations a front end drives (spec.md S:4.7).

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::disks::DiskState;
use crate::driver;
use crate::error::MazeError;
use crate::geometry::Vec2;
use crate::init;
use crate::io::{self, LogWriter, SnapshotSink};
use crate::maze::Maze;

pub struct Simulation {
    config: Config,
    state: DiskState,
    maze: Maze,
    radius: f64,
    orig_n: usize,
    indicator: bool,
    elapsed: f64,
    rng: ChaCha8Rng,
    log_initialized: bool,
}

impl Simulation {
    /// Builds a new simulation: generates (or imports) the maze, then
    /// generates (or imports) the particle population, per spec.md S:4.7.
    pub fn new(config: Config) -> Result<Self, MazeError> {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let radius = config.radius();

        let maze = match &config.maze {
            Some(path) => Maze::load(path, config.height, config.width)?,
            None => Maze::generate(config.height, config.width, &mut rng)?,
        };

        let mut n = config.n;

        let positions = match &config.pos {
            Some(path) => {
                let loaded = io::load_tuples(path)?;
                if n != 0 && n != loaded.len() {
                    return Err(MazeError::ParticleCountMismatch {
                        expected: n,
                        found: loaded.len(),
                    });
                }
                n = loaded.len();
                loaded
            }
            None => init::initial_positions(n, radius, &mut rng)
                .into_iter()
                .map(|p| Vec2::new(p.x, p.y + config.height as f64))
                .collect(),
        };

        let velocities = match &config.vel {
            Some(path) => {
                let loaded = io::load_tuples(path)?;
                if n != 0 && n != loaded.len() {
                    return Err(MazeError::ParticleCountMismatch {
                        expected: n,
                        found: loaded.len(),
                    });
                }
                loaded
            }
            None => init::initial_velocities(n, &mut rng),
        };

        if positions.len() != velocities.len() {
            return Err(MazeError::ParticleCountMismatch {
                expected: positions.len(),
                found: velocities.len(),
            });
        }

        let state = DiskState::new(positions, velocities);
        let orig_n = state.n();

        Ok(Simulation {
            config,
            state,
            maze,
            radius,
            orig_n,
            indicator: false,
            elapsed: 0.0,
            rng,
            log_initialized: false,
        })
    }

    /// Runs the driver (or its fan variant) to completion, per the
    /// configured event budget.
    pub fn run(&mut self) -> Result<(), MazeError> {
        let max_x = self.maze.max_x();
        let mut log = if self.log_initialized {
            LogWriter::append(&self.config.logfile)?
        } else {
            LogWriter::create(&self.config.logfile)?
        };

        let outcome = if self.config.is_fan_mode() {
            driver::run_simulation_with_fan(
                &mut self.state,
                self.radius,
                self.maze.walls(),
                max_x,
                self.config.duration,
                self.config.dt,
                self.config.stepsize,
                self.config.stuck_escape_iters,
                self.config.pressure_factor,
                self.config.fan_probability_divisor,
                self.config.height as i32,
                self.orig_n,
                &mut log,
                &mut self.rng,
            )?
        } else {
            driver::run_simulation(
                &mut self.state,
                self.radius,
                self.maze.walls(),
                max_x,
                self.config.duration,
                self.config.dt,
                self.config.stepsize,
                self.config.stuck_escape_iters,
                &mut log,
            )?
        };

        self.log_initialized = true;
        self.elapsed += outcome.elapsed;
        self.indicator = outcome.escaped;
        Ok(())
    }

    pub fn indicator(&self) -> bool {
        self.indicator
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn n(&self) -> usize {
        self.state.n()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn save_maze(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        self.maze.save(path)
    }

    pub fn save_positions(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        io::save_tuples(path, "Particle positions", &self.state.positions)
    }

    pub fn save_velocities(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        io::save_tuples(path, "Particle velocities", &self.state.velocities)
    }

    /// Identifies the disk with minimum `y` inside the exit column on the
    /// final log frame, and returns its position series across every
    /// frame (spec.md S:4.7). The actual plotting stays an external
    /// collaborator; this returns the path data for one.
    pub fn trace_path(&self) -> Result<Vec<Vec2>, MazeError> {
        if !self.indicator {
            return Err(MazeError::NoExitRecorded);
        }
        let frames = io::read_log(&self.config.logfile)?;
        if frames.len() <= 1 {
            return Err(MazeError::InsufficientLogData {
                frames: frames.len(),
            });
        }
        let max_x = self.maze.max_x();
        let last = frames.last().expect("checked non-empty above");
        let winner = last
            .positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.x > max_x - 2.0 && p.x < max_x)
            .min_by(|(_, a), (_, b)| a.y.partial_cmp(&b.y).unwrap())
            .map(|(idx, _)| idx)
            .ok_or(MazeError::NoExitRecorded)?;

        Ok(frames
            .iter()
            .filter_map(|f| f.positions.get(winner).copied())
            .collect())
    }

    /// Replays the on-disk log through a [`SnapshotSink`], one call per
    /// frame. A caller wanting to parallelise rendering fans this out
    /// itself across a worker pool (spec.md S:5); the simulator stays
    /// single-threaded throughout.
    pub fn replay_log(&self, sink: &mut dyn SnapshotSink) -> Result<(), MazeError> {
        for frame in io::read_log(&self.config.logfile)? {
            sink.on_frame(frame.index, &frame.positions, &frame.velocities);
        }
        Ok(())
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Simulation")?;
        writeln!(
            f,
            "    Maze size: {} x {}",
            self.config.height, self.config.width
        )?;
        if self.config.is_fan_mode() {
            writeln!(
                f,
                "    Contains {} particles (from {} input particles)",
                self.state.n(),
                self.orig_n
            )?;
            writeln!(
                f,
                "    Pressurized entry point: Yes (pressure factor: {})",
                self.config.pressure_factor
            )?;
        } else {
            writeln!(f, "    Contains {} particles", self.state.n())?;
            writeln!(f, "    Pressurized entry point: No")?;
        }
        writeln!(f, "    MD simulation has run for {:.5} seconds", self.elapsed)?;
        let rms = if self.state.n() == 0 {
            0.0
        } else {
            let sum_sq: f64 = self.state.velocities.iter().map(|v| v.norm_sq()).sum();
            (sum_sq / self.state.n() as f64).sqrt()
        };
        write!(f, "    RMS velocity of particles: {rms}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn mismatched_import_counts_report_an_error_instead_of_panicking() {
        let dir = tempdir().unwrap();
        let vel_path = dir.path().join("vel.txt");
        std::fs::write(&vel_path, "Particle velocities\n0.0 -1.0\n0.1 -0.9\n").unwrap();

        // n left at 0 (the CLI's unvalidated default) with only `vel`
        // imported: the guard that compares against `n` is vacuous here,
        // so positions stays empty while velocities has two entries.
        let config = Config {
            n: 0,
            height: 3,
            width: 3,
            logfile: dir.path().join("sim.log"),
            vel: Some(vel_path),
            seed: Some(4),
            ..Config::default()
        };
        let err = Simulation::new(config).unwrap_err();
        assert!(matches!(
            err,
            MazeError::ParticleCountMismatch {
                expected: 0,
                found: 2
            }
        ));
    }

    #[test]
    fn construction_generates_a_connected_maze_and_in_bounds_disks() {
        let dir = tempdir().unwrap();
        let config = Config {
            n: 5,
            height: 4,
            width: 4,
            logfile: dir.path().join("sim.log"),
            seed: Some(11),
            ..Config::default()
        };
        let sim = Simulation::new(config).unwrap();
        assert_eq!(sim.n(), 5);
        assert!(sim.radius() > 0.0);
    }

    #[test]
    fn run_produces_a_readable_log() {
        let dir = tempdir().unwrap();
        let config = Config {
            n: 3,
            height: 3,
            width: 3,
            duration: 50,
            stepsize: 5,
            dt: 1e-3,
            logfile: dir.path().join("sim.log"),
            seed: Some(99),
            ..Config::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.run().unwrap();
        let frames = io::read_log(dir.path().join("sim.log")).unwrap();
        assert!(!frames.is_empty());
    }

    #[test]
    fn trace_path_fails_gracefully_without_an_exit() {
        let dir = tempdir().unwrap();
        let config = Config {
            n: 2,
            height: 3,
            width: 3,
            duration: 5,
            stepsize: 1,
            logfile: dir.path().join("sim.log"),
            seed: Some(3),
            ..Config::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.run().unwrap();
        assert!(matches!(sim.trace_path(), Err(MazeError::NoExitRecorded)));
    }

    #[test]
    fn trace_path_returns_the_winning_disks_series_after_an_escape() {
        let dir = tempdir().unwrap();
        let maze_path = dir.path().join("maze.txt");
        let pos_path = dir.path().join("pos.txt");
        let vel_path = dir.path().join("vel.txt");
        // a single cell with only the bottom edge missing (the exit opening);
        // one disk sits just above it with downward velocity, as in S5.
        std::fs::write(
            &maze_path,
            "Maze wall coordinates\n(1 0) -> (1 1)\n(1 1) -> (0 1)\n(0 1) -> (0 0)\n",
        )
        .unwrap();
        std::fs::write(&pos_path, "Particle positions\n0.5 0.3\n").unwrap();
        std::fs::write(&vel_path, "Particle velocities\n0.0 -1.0\n").unwrap();

        let config = Config {
            n: 1,
            height: 1,
            width: 1,
            duration: 200,
            stepsize: 10,
            dt: 0.01,
            logfile: dir.path().join("sim.log"),
            pos: Some(pos_path),
            vel: Some(vel_path),
            maze: Some(maze_path),
            seed: Some(1),
            ..Config::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.run().unwrap();
        assert!(sim.indicator());

        let path = sim.trace_path().unwrap();
        assert!(path.len() > 1);
        assert!((path[0].x - 0.5).abs() < 1e-9);
        assert!(path.last().unwrap().y < path[0].y);
    }
}
