//! A single tile.

use crate::location::Location;
use crate::shape::{Openings, PipeShape};

/// Everything a single occupied grid slot knows about itself.
///
/// Each field only matters while its mode is active; the others ride along untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Cell {
    /// Where this cell sat in the solved layout.
    pub original_position: Location,
    /// Lit in the solved layout.
    pub light_on: bool,
    /// Pinned in place: never slides or turns.
    pub immovable: bool,
    /// Quarter turns applied by the player, in `0..4`.
    pub piece_rotation: u8,
    /// The pipe piece carried, if any.
    pub pipe: Option<PipeShape>,
    /// Quarter turns baked in when the pipe network was laid, in `0..4`.
    pub pipe_rotation: u8,
    /// Whether flow from the pump reaches this cell. Recomputed, never persisted.
    pub is_full: bool,
}

impl Cell {
    pub(crate) fn solved_at(location: Location) -> Self {
        Self {
            original_position: location,
            light_on: true,
            immovable: false,
            piece_rotation: 0,
            pipe: None,
            pipe_rotation: 0,
            is_full: false,
        }
    }

    /// Baked and player rotation combined, in `0..4`.
    pub fn total_rotation(&self) -> u8 {
        (self.pipe_rotation + self.piece_rotation) % 4
    }

    /// The openings of this cell's pipe as currently rotated, if it carries one.
    pub fn openings(&self) -> Option<Openings> {
        self.pipe.map(|shape| shape.openings().rotated(self.total_rotation()))
    }
}
