//! The grid every mode plays on.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::PipeError;
use crate::location::{Dimension, Location};
use crate::mode::{Mode, Modes};
use crate::shape::{Direction, PipeShape, Spin};

/// Which cells around a toggled light flip along with it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum NeighborhoodShape {
    /// Cells within Manhattan distance `radius`.
    #[default]
    VonNeumann,
    /// Every cell of the `(2 * radius + 1)` square box.
    Moore,
    /// Cells of the box sharing a row or column with the toggled one.
    Cross,
}

/// The cells toggled along with a pressed light: a [`NeighborhoodShape`] of some radius.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Neighborhood {
    /// Which cells of the box count.
    pub shape: NeighborhoodShape,
    /// Distance from the pressed cell, at least 1 when lights out is active.
    pub radius: usize,
}

impl Default for Neighborhood {
    fn default() -> Self {
        Self { shape: NeighborhoodShape::VonNeumann, radius: 1 }
    }
}

impl Neighborhood {
    /// Whether toggling `center` also toggles `other`.
    pub fn covers(&self, center: Location, other: Location) -> bool {
        let (dx, dy) = (center.0.abs_diff(other.0), center.1.abs_diff(other.1));
        if dx > self.radius || dy > self.radius {
            return false;
        }

        match self.shape {
            NeighborhoodShape::VonNeumann => dx + dy <= self.radius,
            NeighborhoodShape::Moore => true,
            NeighborhoodShape::Cross => dx == 0 || dy == 0,
        }
    }
}

/// Constraints for [`GridState::random_cell`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CellFilter {
    /// Only cells with a gap beside them.
    pub require_empty_neighbour: bool,
    /// Accept pinned cells.
    pub allow_immovable: bool,
    /// Only cells carrying a pipe.
    pub require_pipe: bool,
    /// Samples drawn before giving up.
    pub attempts: usize,
}

impl Default for CellFilter {
    fn default() -> Self {
        Self {
            require_empty_neighbour: false,
            allow_immovable: true,
            require_pipe: false,
            attempts: 100,
        }
    }
}

impl CellFilter {
    /// A tile which can slide right now.
    pub fn slidable() -> Self {
        Self { require_empty_neighbour: true, allow_immovable: false, ..Default::default() }
    }

    /// Any present cell.
    pub fn any() -> Self {
        Self::default()
    }

    /// A movable tile carrying a pipe.
    pub fn rotatable() -> Self {
        Self { allow_immovable: false, require_pipe: true, ..Default::default() }
    }

    /// The same filter with a different sampling budget.
    pub fn with_attempts(self, attempts: usize) -> Self {
        Self { attempts, ..self }
    }
}

/// The complete mutable state of one puzzle: a dense grid of optional [`Cell`]s plus the mode configuration that
/// decides which of their fields matter.
///
/// All changes go through the mutators here. Absent cells model the sliding gap.
#[derive(Clone, Debug)]
pub struct GridState {
    pub(crate) cells: Array2<Option<Cell>>,
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) modes: Modes,
    pub(crate) has_image: bool,
    pub(crate) neighborhood: Neighborhood,
}

impl GridState {
    /// An empty grid; every coordinate is absent until [`Self::identity`] is called.
    pub fn new(dims: (Dimension, Dimension), modes: Modes, has_image: bool, neighborhood: Neighborhood) -> Self {
        Self {
            cells: Array2::from_elem((dims.1.get(), dims.0.get()), None),
            dims,
            modes,
            has_image,
            neighborhood,
        }
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Cells per row.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    /// The active modes.
    pub fn modes(&self) -> Modes {
        self.modes
    }

    /// Whether tiles show slices of a picture, which makes every tile's position matter.
    pub fn has_image(&self) -> bool {
        self.has_image
    }

    /// The neighbourhood used when toggling lights.
    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    /// Whether `mode` is one of the active modes.
    pub fn is_active(&self, mode: Mode) -> bool {
        self.modes.contains(mode)
    }

    /// Whether `at` lies on the grid, occupied or not.
    pub fn contains(&self, at: Location) -> bool {
        at.within(self.dims)
    }

    /// Fill every coordinate with a cell in its solved configuration.
    pub fn identity(&mut self) {
        for (index, slot) in self.cells.indexed_iter_mut() {
            *slot = Some(Cell::solved_at(Location::from(index)));
        }
    }

    /// The cell at `at`, unless it is off the grid or absent.
    pub fn cell(&self, at: Location) -> Option<&Cell> {
        self.cells.get(at.as_index()).and_then(Option::as_ref)
    }

    fn cell_mut(&mut self, at: Location) -> Option<&mut Cell> {
        self.cells.get_mut(at.as_index()).and_then(Option::as_mut)
    }

    /// Whether a cell occupies `at`.
    pub fn has_cell(&self, at: Location) -> bool {
        self.cell(at).is_some()
    }

    /// Present cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Location, &Cell)> + '_ {
        self.cells.indexed_iter()
            .filter_map(|(index, slot)| slot.as_ref().map(|cell| (Location::from(index), cell)))
    }

    /// Remove the cell at `at`, leaving a gap.
    pub fn clear(&mut self, at: Location) {
        if let Some(slot) = self.cells.get_mut(at.as_index()) {
            *slot = None;
        }
    }

    /// Exchange whatever occupies `a` and `b`, cells or gaps alike.
    pub fn swap(&mut self, a: Location, b: Location) {
        if self.contains(a) && self.contains(b) {
            self.cells.swap(a.as_index(), b.as_index());
        }
    }

    /// Turn the piece at `at` a quarter turn in `spin`.
    pub fn rotate(&mut self, at: Location, spin: Spin) {
        if let Some(cell) = self.cell_mut(at) {
            cell.piece_rotation = spin.apply(cell.piece_rotation);
        }
    }

    /// Flip the light at `at` and at every present cell in the configured neighbourhood.
    pub fn toggle_light(&mut self, at: Location) {
        if !self.contains(at) {
            return;
        }

        let radius = self.neighborhood.radius;
        let xs = at.0.saturating_sub(radius)..=at.0.saturating_add(radius).min(self.width() - 1);
        let ys = at.1.saturating_sub(radius)..=at.1.saturating_add(radius).min(self.height() - 1);

        for (y, x) in ys.cartesian_product(xs) {
            let other = Location(x, y);
            if !self.neighborhood.covers(at, other) {
                continue;
            }
            if let Some(cell) = self.cell_mut(other) {
                cell.light_on = !cell.light_on;
            }
        }
    }

    /// Pin or release the cell at `at`. Absent cells are ignored.
    pub fn set_immovable(&mut self, at: Location, immovable: bool) {
        if let Some(cell) = self.cell_mut(at) {
            cell.immovable = immovable;
        }
    }

    /// Mark whether flow reaches the cell at `at`.
    pub fn set_full(&mut self, at: Location, full: bool) {
        if let Some(cell) = self.cell_mut(at) {
            cell.is_full = full;
        }
    }

    pub(crate) fn drain_all(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.is_full = false;
        }
    }

    /// Put a pipe on the cell at `at`, with `rotation` taken mod 4.
    ///
    /// Fails with [`PipeError::Vacant`] when there is no cell to carry it.
    pub fn set_pipe(&mut self, at: Location, shape: PipeShape, rotation: u8) -> Result<(), PipeError> {
        let cell = self.cell_mut(at).ok_or(PipeError::Vacant(at))?;
        cell.pipe = Some(shape);
        cell.pipe_rotation = rotation % 4;
        Ok(())
    }

    /// The first absent orthogonal neighbour of `at`, checking left, right, up, then down.
    pub fn empty_neighbour(&self, at: Location) -> Option<Location> {
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down].into_iter()
            .map(|dir| dir.attempt_from(at))
            .find(|neighbour| self.contains(*neighbour) && !self.has_cell(*neighbour))
    }

    /// Rejection-sample a present cell satisfying `filter`, giving up after `filter.attempts` draws.
    pub fn random_cell(&self, rng: &mut impl Rng, filter: CellFilter) -> Option<Location> {
        (0..filter.attempts).find_map(|_| {
            let at = Location(rng.gen_range(0..self.width()), rng.gen_range(0..self.height()));
            let cell = self.cell(at)?;

            if !filter.allow_immovable && cell.immovable {
                return None;
            }
            if filter.require_pipe && cell.pipe.is_none() {
                return None;
            }
            if filter.require_empty_neighbour && self.empty_neighbour(at).is_none() {
                return None;
            }

            Some(at)
        })
    }

    /// Structural equality, comparing only the fields the active modes care about.
    pub fn is_same(&self, other: &GridState) -> bool {
        if self.modes != other.modes || self.dims != other.dims {
            return false;
        }

        let compare_origin = self.is_active(Mode::Sliding) && self.has_image;
        let compare_lights = self.is_active(Mode::LightsOut);
        let compare_pipes = self.is_active(Mode::Pipemania);

        self.cells.iter().zip(other.cells.iter()).all(|pair| match pair {
            (None, None) => true,
            (Some(a), Some(b)) => (!compare_origin || a.original_position == b.original_position)
                && (!compare_lights || a.light_on == b.light_on)
                && (!compare_pipes || (a.pipe, a.pipe_rotation, a.piece_rotation) == (b.pipe, b.pipe_rotation, b.piece_rotation)),
            _ => false,
        })
    }

    /// The slot that must end up empty in a sliding puzzle without a reference image.
    pub fn gap_location(&self) -> Location {
        let (w, h) = (self.width(), self.height());
        Location(
            if w % 2 != 0 { w / 2 } else { 0 },
            if h % 2 != 0 { h / 2 } else { h - 1 },
        )
    }

    /// Whether every active mode's goal is met at once.
    ///
    /// Sliding needs every tile home when a picture is shown, otherwise only the gap in its place. Lights out needs every
    /// light on. Pipemania needs every pipe full, and unturned when a picture is shown. Rhythm adds no goal.
    pub fn check_solution(&self) -> bool {
        if self.is_active(Mode::Sliding) {
            let home = if self.has_image {
                self.cells().all(|(at, cell)| cell.original_position == at)
            } else {
                !self.has_cell(self.gap_location())
            };
            if !home {
                return false;
            }
        }

        if self.is_active(Mode::LightsOut) && !self.cells().all(|(_, cell)| cell.light_on) {
            return false;
        }

        if self.is_active(Mode::Pipemania) {
            return self.cells()
                .filter(|(_, cell)| cell.pipe.is_some())
                .all(|(_, cell)| cell.is_full && !(self.has_image && cell.piece_rotation != 0));
        }

        true
    }
}

impl Display for GridState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut out = String::with_capacity(self.cells.nrows() * (self.cells.ncols() + 1));

        for row in self.cells.rows() {
            for slot in row {
                out.push(match slot {
                    None => '.',
                    Some(cell) if cell.immovable => '#',
                    Some(cell) => match cell.pipe {
                        Some(shape) => shape.glyph(cell.total_rotation()),
                        None if self.is_active(Mode::LightsOut) => if cell.light_on { 'o' } else { 'x' },
                        None => '+',
                    },
                });
            }
            out.push('\n');
        }

        write!(f, "{}", out)
    }
}
