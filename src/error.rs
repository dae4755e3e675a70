//! The crate's error taxonomy (spec.md S:7). The simulation core itself
//! never raises a fatal error — every pathology it hits is handled in
//! place (internal maze-generation restarts, the stuck-escape heuristic,
//! `pull_apart`). `MazeError` exists for the genuinely fallible edges of
//! the system: importing externally-supplied state and reading/writing
//! the plain-text file formats.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("imported particle count mismatch: configured for {expected} but file has {found}")]
    ParticleCountMismatch { expected: usize, found: usize },

    #[error("maze generation exceeded its safety cap after {restarts} restarts")]
    MazeGenerationExceededSafetyCap { restarts: usize },

    #[error("malformed line {line:?}: {reason}")]
    ParseError { line: String, reason: String },

    #[error("no particle has exited the maze; nothing to trace")]
    NoExitRecorded,

    #[error("log only has {frames} frame(s); cannot trace a path across a run")]
    InsufficientLogData { frames: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
