#![warn(missing_docs)]

//! # `tilework`
//!
//! The engine behind a grid puzzle game where several classic puzzles share one board:
//! sliding tiles, [Lights Out](https://en.wikipedia.org/wiki/Lights_Out_(game)), pipe connection in the style of
//! Pipe Mania, and a rhythm gate which only accepts moves made on the beat.
//!
//! Begin with a [`LevelConfig`], either written by hand, loaded from JSON as part of a [`Campaign`], or produced by
//! [`synthesize`](synth::synthesize). Hand it to [`Session::initialize`], which builds the grid and scrambles it,
//! then feed player actions through [`Session::attempt_move`] and friends. Fixed layouts for tests and tutorials
//! can be put together with a [`BoardBuilder`].
//!
//! Rendering, audio and input are left to the embedding game. The engine only needs the current time (a
//! [`Clock`](rhythm::Clock)), the music's playback position for the rhythm gate, and somewhere to store the
//! player's level ([`LevelStore`](synth::LevelStore)).
//!
//! # Internals
//! Every puzzle starts solved and is scrambled by a random walk of reversible steps, so it is always solvable and
//! the walk, reversed, is a solution. The walk never revisits a state, which keeps the solution free of loops.
//!
//! Pipe layouts are found on a copy of the grid padded with one ring of cells, where the pump and drains live.
//! A* (via `petgraph`) routes a path from the pump to each drain around randomly blocked cells, and each cell on the
//! union of those paths becomes the pipe piece whose openings face exactly its neighbours on the union.

pub use board::GridState;
pub use builder::BoardBuilder;
pub use level::LevelConfig;
pub use location::Location;
pub use mode::{Mode, Modes};
pub use session::{Outcome, Rejection, Session};
pub use step::SolutionStep;
pub use synth::Campaign;

pub mod board;
pub mod builder;
pub mod cell;
pub mod error;
pub mod flood;
pub mod image;
pub mod level;
pub mod location;
pub mod mode;
pub mod pipes;
pub mod rhythm;
pub mod rng;
pub mod session;
pub mod shape;
pub mod shuffle;
pub(crate) mod solver;
pub mod step;
pub mod synth;
mod tests;
