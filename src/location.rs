//! Coordinates on and around the grid.

use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Ix;
use serde::{Deserialize, Serialize};

/// One grid coordinate.
pub type Coord = usize;
/// A grid width or height, never zero.
pub type Dimension = NonZero<Coord>;

/// A cell coordinate on the grid, `(x, y)`.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// Index into a row-major [`ndarray::Array2`].
    pub(crate) fn as_index(&self) -> (Ix, Ix) {
        (self.1, self.0)
    }

    /// Shift by `rhs`. Stepping off the low edge wraps around to a location no grid contains.
    pub fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Whether this location lies on a grid of `dims`.
    pub fn within(&self, dims: (Dimension, Dimension)) -> bool {
        self.0 < dims.0.get() && self.1 < dims.1.get()
    }

    /// Steps between the two locations moving orthogonally.
    pub fn manhattan(&self, other: Location) -> usize {
        self.0.abs_diff(other.0) + self.1.abs_diff(other.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.0, self.1)
    }
}

/// A point which may lie one step outside the grid, as pumps and drains do.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct BorderPoint(pub isize, pub isize);

impl BorderPoint {
    /// Shift by `rhs`.
    pub fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1)
    }

    /// The grid location of this point, if it lies inside a grid of `dims`.
    pub fn inside(&self, dims: (Dimension, Dimension)) -> Option<Location> {
        let x = usize::try_from(self.0).ok()?;
        let y = usize::try_from(self.1).ok()?;
        Some(Location(x, y)).filter(|loc| loc.within(dims))
    }
}

impl From<Location> for BorderPoint {
    fn from(value: Location) -> Self {
        // grids never come close to isize::MAX cells wide
        Self(value.0 as isize, value.1 as isize)
    }
}
