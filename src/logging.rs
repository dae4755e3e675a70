//! Logging setup. The teacher repo has no logging of its own; this is
//! grounded in the ambient stack of the broader maze-generation pack
//! (the `plof27-maze-generation` other_examples repo, which reaches for
//! `log`/`env_logger` rather than bare `println!`).

use log::LevelFilter;

/// Initialises the global logger at a level controlled by repeated `-v`
/// flags: none -> warn, one -> info, two -> debug, three or more -> trace.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}
