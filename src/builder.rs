//! Hand-placed layouts, for fixed scenarios that should not depend on generation.

use std::collections::HashSet;

use crate::board::{GridState, Neighborhood};
use crate::location::{Dimension, Location};
use crate::mode::{Mode, Modes};
use crate::pipes::{Drain, Edge, PipeNetwork, Pump};
use crate::shape::PipeShape;

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// A feature was placed outside the bounds specified by `dims`, or past the end of an edge.
    FeatureOutOfBounds,
    /// A pipe was placed on a location which is also dropped.
    PipeOnDroppedLocation,
    /// Drains were added, or pipemania is active, without a pump.
    MissingPump,
    /// No mode was ever added.
    NoModes,
}

/// A hand-placed puzzle layout, as opposed to one generated from a [`LevelConfig`](crate::level::LevelConfig).
///
/// The builder starts from the solved identity layout. Every feature call returns `&mut Self` for chaining;
/// once the builder is invalid, further calls do nothing.
/// Builders can be [`Clone`]d to save their state at some point.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    // width, height
    dims: (Dimension, Dimension),
    modes: Modes,
    has_image: bool,
    neighborhood: Neighborhood,
    invalid_reasons: Vec<BuilderInvalidReason>,
    // gaps
    dropped: HashSet<Location>,
    pinned: HashSet<Location>,
    toggled: Vec<Location>,
    pipes: Vec<(Location, PipeShape, u8)>,
    pump: Option<Pump>,
    drains: Vec<Drain>,
}

impl BoardBuilder {
    /// Construct a new builder with the specified dimensions, specified in `(x, y)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            modes: Modes::EMPTY,
            has_image: false,
            neighborhood: Neighborhood::default(),
            invalid_reasons: Default::default(),
            dropped: Default::default(),
            pinned: Default::default(),
            toggled: Default::default(),
            pipes: Default::default(),
            pump: None,
            drains: Default::default(),
        }
    }

    fn in_bounds(&mut self, location: Location) -> bool {
        if location.within(self.dims) {
            true
        } else {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            false
        }
    }

    /// Activate `mode` on the built grid.
    pub fn add_mode(&mut self, mode: Mode) -> &mut Self {
        self.modes.insert(mode);
        self
    }

    /// Mark the board as showing a reference picture, which changes how it is judged solved.
    pub fn with_image(&mut self) -> &mut Self {
        self.has_image = true;
        self
    }

    /// Set the neighbourhood lights toggle with.
    pub fn neighborhood(&mut self, neighborhood: Neighborhood) -> &mut Self {
        self.neighborhood = neighborhood;
        self
    }

    /// Leave `location` without a tile.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state.
    pub fn drop_location(&mut self, location: Location) -> &mut Self {
        if self.invalid_reasons.is_empty() && self.in_bounds(location) {
            self.dropped.insert(location);
        }
        self
    }

    /// Pin the tile at `location` in place.
    pub fn pin(&mut self, location: Location) -> &mut Self {
        if self.invalid_reasons.is_empty() && self.in_bounds(location) {
            self.pinned.insert(location);
        }
        self
    }

    /// Toggle the light at `location` along with its neighbourhood, applied after every other feature.
    /// Toggling the same location twice cancels out.
    pub fn toggle(&mut self, location: Location) -> &mut Self {
        if self.invalid_reasons.is_empty() && self.in_bounds(location) {
            self.toggled.push(location);
        }
        self
    }

    /// Lay `shape` at `location`, turned `rotation` quarter turns. Later pipes on the same cell replace earlier ones.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state.
    pub fn add_pipe(&mut self, location: Location, shape: PipeShape, rotation: u8) -> &mut Self {
        if self.invalid_reasons.is_empty() && self.in_bounds(location) {
            self.pipes.push((location, shape, rotation));
        }
        self
    }

    /// Place the pump beside the `offset`-th cell of `edge`, facing into the board. A later call replaces it.
    pub fn pump(&mut self, edge: Edge, offset: usize) -> &mut Self {
        if self.invalid_reasons.is_empty() && self.on_edge(edge, offset) {
            self.pump = Some(Pump::on(edge, self.dims.0.get(), self.dims.1.get(), offset));
        }
        self
    }

    /// Add a drain beside the `offset`-th cell of `edge`.
    pub fn add_drain(&mut self, edge: Edge, offset: usize) -> &mut Self {
        if self.invalid_reasons.is_empty() && self.on_edge(edge, offset) {
            self.drains.push(Drain::on(edge, self.dims.0.get(), self.dims.1.get(), offset));
        }
        self
    }

    fn on_edge(&mut self, edge: Edge, offset: usize) -> bool {
        if offset < edge.span(self.dims.0.get(), self.dims.1.get()) {
            true
        } else {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            false
        }
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a grid, plus the pipe network when pipemania is active.
    /// Flow is already propagated through the network.
    ///
    /// Problems that only show once the features are combined are reported here rather than while building.
    pub fn build(&self) -> Result<(GridState, Option<PipeNetwork>), Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(self.invalid_reasons.clone());
        }

        let mut reasons = Vec::new();
        if self.modes.is_empty() {
            reasons.push(BuilderInvalidReason::NoModes);
        }
        if self.pump.is_none() && (self.modes.contains(Mode::Pipemania) || !self.drains.is_empty()) {
            reasons.push(BuilderInvalidReason::MissingPump);
        }
        if self.pipes.iter().any(|(location, ..)| self.dropped.contains(location)) {
            reasons.push(BuilderInvalidReason::PipeOnDroppedLocation);
        }
        if !reasons.is_empty() {
            return Err(reasons);
        }

        let mut state = GridState::new(self.dims, self.modes, self.has_image, self.neighborhood);
        state.identity();

        for (location, shape, rotation) in &self.pipes {
            state.set_pipe(*location, *shape, *rotation)
                .map_err(|_| vec![BuilderInvalidReason::PipeOnDroppedLocation])?;
        }
        for location in &self.pinned {
            state.set_immovable(*location, true);
        }
        for location in &self.dropped {
            state.clear(*location);
        }
        for location in &self.toggled {
            state.toggle_light(*location);
        }

        let network = self.pump.map(|pump| {
            let mut network = PipeNetwork::new(pump, self.drains.clone());
            network.propagate(&mut state);
            network
        });

        Ok((state, network))
    }
}
