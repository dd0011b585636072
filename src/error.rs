//! Failures surfaced while building a puzzle.
//!
//! Illegal player actions are not errors; see [`Rejection`](crate::session::Rejection).

use crate::location::Location;

/// A [`LevelConfig`](crate::level::LevelConfig) which cannot produce a playable puzzle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The mode set is empty.
    #[error("no puzzle mode is active")]
    NoModes,
    /// Width or height is zero, given as `(width, height)`.
    #[error("grid of {0}x{1} cells has no area")]
    ZeroArea(usize, usize),
    /// Lights out with a neighbourhood radius of zero.
    #[error("lights out needs a neighbourhood radius of at least 1")]
    ZeroRadius,
    /// Rhythm with a tempo or beat window that is not positive.
    #[error("rhythm needs a positive tempo and beat window, got {bpm} bpm and {threshold}s")]
    BadTempo {
        /// Beats per minute as configured.
        bpm: f32,
        /// Beat window in seconds as configured.
        threshold: f32,
    },
    /// No simple path on the grid could be as long as requested.
    #[error("pipe paths longer than {min_path_length} cannot fit on a {width}x{height} grid")]
    PathTooLong {
        /// The requested minimum, in cells.
        min_path_length: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// Pipemania with zero drains.
    #[error("pipemania needs at least one drain")]
    NoDrains,
    /// A sliding grid asked to pin every tile.
    #[error("{count} unmovable pieces leave no room on a {width}x{height} grid")]
    TooManyUnmovable {
        /// Tiles asked to be pinned.
        count: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
}

/// Failure while laying out or editing pipes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipeError {
    /// A drain ran out of search attempts without finding a long enough path.
    #[error("drain {drain} found no path of more than {min_path_length} cells after {attempts} attempts")]
    DrainUnreachable {
        /// Index of the drain being routed.
        drain: usize,
        /// Searches spent on it.
        attempts: usize,
        /// The length every accepted path must exceed.
        min_path_length: usize,
    },
    /// Every spot beside the grid feeds into the reserved cell.
    #[error("every edge cell is reserved, leaving nowhere to attach the pump")]
    NoPumpSpot,
    /// A pipe was placed where there is no tile.
    #[error("no cell at {0} to carry a pipe")]
    Vacant(Location),
}

/// Failure while preparing the grid after the pipes are laid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// Random draws for a pipe-free cell to remove all landed on pipes.
    #[error("no cell without a pipe is left to remove for the sliding gap")]
    NoGapAvailable,
}

/// Anything that stops a [`Session`](crate::session::Session) from starting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The level definition is unplayable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The pipe network could not be laid.
    #[error(transparent)]
    Pipe(#[from] PipeError),
    /// The sliding gap could not be opened.
    #[error(transparent)]
    Setup(#[from] SetupError),
}
