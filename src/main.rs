//! CLI front end for the maze-diffusion EdMD simulator. This binary only
//! translates command-line flags into a `Config` and reports the result —
//! all of the actual work lives in the library (see `lib.rs`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use maze_diffusion::{logging, Config, Simulation};

/// Simulate hard-disk gas diffusion through a randomly generated maze.
#[derive(Parser, Debug)]
#[command(name = "maze-diffusion", version, about)]
struct Args {
    /// Number of disks.
    #[arg(short = 'n', long, default_value_t = 10)]
    particles: usize,

    /// Maze height, in cells.
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Maze width, in cells.
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Event budget for this run.
    #[arg(long, default_value_t = 200_000)]
    duration: u64,

    /// Log and progress stride, in events.
    #[arg(long, default_value_t = 2_000)]
    stepsize: u64,

    /// Outer wall-clock slice length.
    #[arg(long, default_value_t = 5e-5)]
    dt: f64,

    /// Path to the append-only simulation log.
    #[arg(long, default_value = "simulation.log")]
    logfile: PathBuf,

    /// Directory for rendered snapshots (consumed by an external renderer).
    #[arg(long, default_value = "simulation_snapshots")]
    snapdir: PathBuf,

    /// Draw velocity arrows in rendered snapshots.
    #[arg(long)]
    with_arrows: bool,

    /// Import initial positions from this file instead of sampling them.
    #[arg(long)]
    pos: Option<PathBuf>,

    /// Import initial velocities from this file instead of sampling them.
    #[arg(long)]
    vel: Option<PathBuf>,

    /// Import the maze wall coordinates from this file instead of generating one.
    #[arg(long)]
    maze: Option<PathBuf>,

    /// Enables the fan variant and sets the shower's injection rate.
    #[arg(long, default_value_t = 0.0)]
    pressure_factor: f64,

    /// Inner-loop count after which the stuck-escape heuristic kicks in.
    #[arg(long, default_value_t = 100)]
    stuck_escape_iters: usize,

    /// Divisor in the fan's per-log-boundary injection probability.
    #[arg(long, default_value_t = 10.0)]
    fan_probability_divisor: f64,

    /// Seed the random number generator for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            n: args.particles,
            height: args.height,
            width: args.width,
            duration: args.duration,
            stepsize: args.stepsize,
            dt: args.dt,
            logfile: args.logfile,
            snapdir: args.snapdir,
            with_arrows: args.with_arrows,
            pos: args.pos,
            vel: args.vel,
            maze: args.maze,
            pressure_factor: args.pressure_factor,
            stuck_escape_iters: args.stuck_escape_iters,
            fan_probability_divisor: args.fan_probability_divisor,
            seed: args.seed,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config: Config = args.into();
    let mut simulation = Simulation::new(config).context("failed to initialise simulation")?;
    simulation.run().context("simulation run failed")?;

    log::info!("{simulation}");

    // An escaped particle is reported with exit status 1, an exhausted
    // event budget with 0, per spec.md S:6.
    if simulation.indicator() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::from(0))
    }
}
