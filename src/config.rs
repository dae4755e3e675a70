//! The simulation's configuration surface (spec.md S:6). `Config` is what
//! the library actually consumes; `main.rs` only maps CLI flags onto it, so
//! the library stays CLI-agnostic the way the teacher's `mod maze_operations`
//! is consumed from a thin `main()`.

use std::path::PathBuf;

/// Radius-derivation constant for fan mode (`pressure_factor` is set).
const FAN_MODE_C: f64 = 0.2;
/// Radius-derivation constant otherwise.
const DEFAULT_MODE_C: f64 = 0.3;

#[derive(Clone, Debug)]
pub struct Config {
    pub n: usize,
    pub height: usize,
    pub width: usize,
    pub duration: u64,
    pub stepsize: u64,
    pub dt: f64,
    pub logfile: PathBuf,
    pub snapdir: PathBuf,
    pub with_arrows: bool,
    pub pos: Option<PathBuf>,
    pub vel: Option<PathBuf>,
    pub maze: Option<PathBuf>,
    /// Enables the fan variant when non-zero; also drives the shower rate.
    pub pressure_factor: f64,
    /// The `q > N` stuck-oscillation escape threshold (spec.md S:9 Open
    /// Question (b)); exposed rather than hard-coded.
    pub stuck_escape_iters: usize,
    /// The divisor in the fan's per-log-boundary injection probability
    /// (`fan_speed / divisor`); also an Open Question (b) tunable.
    pub fan_probability_divisor: f64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            n: 10,
            height: 10,
            width: 10,
            duration: 200_000,
            stepsize: 2_000,
            dt: 5e-5,
            logfile: PathBuf::from("simulation.log"),
            snapdir: PathBuf::from("simulation_snapshots"),
            with_arrows: false,
            pos: None,
            vel: None,
            maze: None,
            pressure_factor: 0.0,
            stuck_escape_iters: 100,
            fan_probability_divisor: 10.0,
            seed: None,
        }
    }
}

impl Config {
    pub fn is_fan_mode(&self) -> bool {
        self.pressure_factor > 0.0
    }

    /// `r = sqrt(c / (n * pi))`, `c = 0.2` under fan mode, `0.3` otherwise
    /// (spec.md S:6).
    pub fn radius(&self) -> f64 {
        let c = if self.is_fan_mode() {
            FAN_MODE_C
        } else {
            DEFAULT_MODE_C
        };
        (c / (self.n as f64 * std::f64::consts::PI)).sqrt()
    }
}
