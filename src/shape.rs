//! Directions, pipe openings and the canonical pipe pieces.
//!
//! Openings are a four-bit mask: bit 0 faces `+x`, bit 1 `+y`, bit 2 `-x` and bit 3 `-y`. A quarter turn shifts
//! every opening to the next bit, wrapping from bit 3 back to bit 0.

use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use strum::VariantArray;

use crate::location::{BorderPoint, Location};

/// The four orthogonal steps, in the bit order used by [`Openings`].
///
/// Rotating by one quarter turn maps each direction to the next one in this list,
/// so `Right` becomes `Down`, `Down` becomes `Left` and so on.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Direction {
    /// `+x`.
    Right,
    /// `+y`.
    Down,
    /// `-x`.
    Left,
    /// `-y`.
    Up,
}

impl Direction {
    /// The `(dx, dy)` of one step.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
        }
    }

    /// The opposite direction.
    pub fn invert(&self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
        }
    }

    /// This direction's bit in an [`Openings`] mask.
    pub fn bit(&self) -> u8 {
        1 << (*self as u8)
    }

    /// The neighbouring location, which may be off the grid.
    pub fn attempt_from(&self, location: Location) -> Location {
        location.offset_by(self.delta())
    }

    /// The neighbouring point.
    pub fn step_from(&self, point: BorderPoint) -> BorderPoint {
        point.offset_by(self.delta())
    }
}

/// Which of the four sides of a cell a pipe opens onto.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Openings(u8);

impl Openings {
    /// A closed piece.
    pub const NONE: Self = Self(0);

    /// Openings from a mask of [`Direction::bit`]s. Bits above the fourth are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// A single opening.
    pub fn of(direction: Direction) -> Self {
        Self(direction.bit())
    }

    /// These openings plus `direction`.
    pub fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Whether the side facing `direction` is open.
    pub fn has(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Rotate by `quarter_turns`; each turn moves every opening to the next [`Direction`].
    pub fn rotated(self, quarter_turns: u8) -> Self {
        let mut bits = self.0;
        for _ in 0..quarter_turns % 4 {
            bits = ((bits & 0b0111) << 1) | ((bits & 0b1000) >> 3);
        }
        Self(bits)
    }

    /// The open sides, in [`Direction`] order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::VARIANTS.iter().copied().filter(move |dir| self.has(*dir))
    }
}

impl Debug for Openings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Openings({:#06b})", self.0)
    }
}

/// The canonical pipe pieces. Every other piece is one of these under rotation.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PipeShape {
    /// Opens right and up.
    Elbow,
    /// Opens right and left.
    Straight,
    /// Opens right, left and up.
    Tee,
    /// Opens on all four sides.
    Cross,
}

impl PipeShape {
    /// The openings at rotation 0.
    pub fn openings(&self) -> Openings {
        match self {
            Self::Elbow => Openings::from_bits(0b1001),
            Self::Straight => Openings::from_bits(0b0101),
            Self::Tee => Openings::from_bits(0b1101),
            Self::Cross => Openings::from_bits(0b1111),
        }
    }

    /// Find the shape and rotation which produce exactly `mask`.
    ///
    /// Returns [`None`] for masks with fewer than two openings, which no canonical piece covers.
    pub fn matching(mask: Openings) -> Option<(Self, u8)> {
        (0..4u8).find_map(|rotation| {
            Self::VARIANTS.iter()
                .find(|shape| shape.openings().rotated(rotation) == mask)
                .map(|shape| (*shape, rotation))
        })
    }

    pub(crate) fn glyph(&self, rotation: u8) -> char {
        let open = self.openings().rotated(rotation);
        match (open.has(Direction::Right), open.has(Direction::Down), open.has(Direction::Left), open.has(Direction::Up)) {
            (true, true, true, true) => '┼',
            (true, true, true, false) => '┬',
            (false, true, true, true) => '┤',
            (true, false, true, true) => '┴',
            (true, true, false, true) => '├',
            (true, false, true, false) => '─',
            (false, true, false, true) => '│',
            (true, true, false, false) => '┌',
            (false, true, true, false) => '┐',
            (false, false, true, true) => '┘',
            (true, false, false, true) => '└',
            _ => '?',
        }
    }
}

/// Direction of a quarter turn applied to a piece.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Spin {
    /// Adds one quarter turn. This is the player's rotate action.
    Counterclockwise,
    /// Removes one quarter turn.
    Clockwise,
}

impl Spin {
    /// The turn which undoes this one.
    pub fn invert(&self) -> Self {
        match self {
            Self::Counterclockwise => Self::Clockwise,
            Self::Clockwise => Self::Counterclockwise,
        }
    }

    pub(crate) fn apply(&self, rotation: u8) -> u8 {
        match self {
            Self::Counterclockwise => (rotation + 1) % 4,
            Self::Clockwise => (rotation + 3) % 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_cycles_through_directions() {
        let mut open = Openings::of(Direction::Right);
        for dir in [Direction::Down, Direction::Left, Direction::Up, Direction::Right] {
            open = open.rotated(1);
            assert_eq!(open, Openings::of(dir));
        }
    }

    #[test]
    fn every_two_plus_mask_has_a_piece() {
        for bits in 0..16u8 {
            let mask = Openings::from_bits(bits);
            let found = PipeShape::matching(mask);
            if bits.count_ones() >= 2 {
                let (shape, rotation) = found.unwrap();
                assert_eq!(shape.openings().rotated(rotation), mask);
            } else {
                assert!(found.is_none());
            }
        }
    }
}
