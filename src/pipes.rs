//! Laying out a connected pipe network on a grid.
//!
//! The network has one pump and any number of drains, all sitting one step outside the grid. Paths between them are
//! found on a padded copy of the grid (one extra ring of cells on every side, which is where the pump and drains
//! live) and then converted into canonical [`PipeShape`]s with the rotation that reproduces each cell's openings.

use std::collections::HashSet;

use itertools::Itertools;
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::VariantArray;
use tracing::{debug, info};

use crate::board::GridState;
use crate::error::PipeError;
use crate::location::{BorderPoint, Location};
use crate::shape::{Direction, Openings, PipeShape};
use crate::solver::{find_path, Occupancy};

/// A side of the grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Edge {
    /// `y = -1`.
    Top,
    /// `x = -1`.
    Left,
    /// `y = height`.
    Bottom,
    /// `x = width`.
    Right,
}

impl Edge {
    /// The direction pointing from this edge into the grid.
    pub fn inward(&self) -> Direction {
        match self {
            Self::Top => Direction::Down,
            Self::Left => Direction::Right,
            Self::Bottom => Direction::Up,
            Self::Right => Direction::Left,
        }
    }

    /// The number of cells along this edge.
    pub fn span(&self, width: usize, height: usize) -> usize {
        match self {
            Self::Top | Self::Bottom => width,
            Self::Left | Self::Right => height,
        }
    }

    /// The point just outside the grid next to the `offset`-th cell along this edge.
    pub fn outside(&self, width: usize, height: usize, offset: usize) -> BorderPoint {
        let offset = offset as isize;
        match self {
            Self::Top => BorderPoint(offset, -1),
            Self::Left => BorderPoint(-1, offset),
            Self::Bottom => BorderPoint(offset, height as isize),
            Self::Right => BorderPoint(width as isize, offset),
        }
    }
}

/// The single flow source.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Pump {
    /// Where the pump sits, one step outside the grid.
    pub point: BorderPoint,
    /// Quarter turns from facing [`Direction::Right`].
    pub rotation: u8,
}

impl Pump {
    /// The pump beside the `offset`-th cell of `edge` on a `width` by `height` grid, facing into it.
    pub fn on(edge: Edge, width: usize, height: usize, offset: usize) -> Self {
        Self { point: edge.outside(width, height, offset), rotation: edge.inward() as u8 }
    }

    /// The single side the pump feeds.
    pub fn openings(&self) -> Openings {
        Openings::of(Direction::Right).rotated(self.rotation)
    }
}

/// A flow sink. `reached` is refreshed by every propagation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Drain {
    /// Where the drain sits, one step outside the grid.
    pub point: BorderPoint,
    /// Quarter turns from facing [`Direction::Right`]; drains face into the grid.
    pub rotation: u8,
    /// Whether flow arrived at the last propagation.
    #[serde(skip)]
    pub reached: bool,
}

impl Drain {
    /// The drain beside the `offset`-th cell of `edge` on a `width` by `height` grid.
    pub fn on(edge: Edge, width: usize, height: usize, offset: usize) -> Self {
        Self { point: edge.outside(width, height, offset), rotation: edge.inward() as u8, reached: false }
    }
}

/// Knobs for [`PipeNetwork::generate`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PipeParams {
    /// Number of drains, each with its own route from the pump.
    pub drains: usize,
    /// Accepted paths are strictly longer than this, counting the pump and drain ends.
    pub min_path_length: usize,
    /// Random blocked cells dropped on the padded grid before each search.
    pub block_tiles: usize,
    /// Searches per drain before giving up.
    #[serde(default = "PipeParams::default_attempts")]
    pub attempts: usize,
}

impl PipeParams {
    fn default_attempts() -> usize {
        50
    }
}

impl Default for PipeParams {
    fn default() -> Self {
        Self { drains: 2, min_path_length: 7, block_tiles: 10, attempts: Self::default_attempts() }
    }
}

/// The pump and drains of a level. The pipes themselves live on the grid's cells.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PipeNetwork {
    /// The flow source.
    pub pump: Pump,
    /// Every sink, in routing order.
    pub drains: Vec<Drain>,
}

fn padded(point: BorderPoint) -> Location {
    // points are never more than one step outside the grid
    Location((point.0 + 1) as usize, (point.1 + 1) as usize)
}

/// A place beside the grid where the pump or a drain may sit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Spot {
    edge: Edge,
    offset: usize,
    point: BorderPoint,
}

impl Spot {
    fn on(edge: Edge, width: usize, height: usize, offset: usize) -> Self {
        Self { edge, offset, point: edge.outside(width, height, offset) }
    }
}

/// Cells on the shortest unobstructed route between points beside two different edges, counting both ends.
fn reach(a: BorderPoint, b: BorderPoint) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1) + 1
}

/// Draw an edge uniformly among those holding one of `spots`, then one of its spots.
fn choose_spot(spots: &[Spot], rng: &mut impl Rng) -> Option<Spot> {
    let edges = spots.iter().map(|spot| spot.edge).unique().collect_vec();
    let edge = *edges.choose(rng)?;
    let along = spots.iter().filter(|spot| spot.edge == edge).collect_vec();
    along.choose(rng).map(|spot| **spot)
}

impl PipeNetwork {
    /// A network of hand-placed ends, as used by the [`BoardBuilder`](crate::builder::BoardBuilder).
    pub fn new(pump: Pump, drains: Vec<Drain>) -> Self {
        Self { pump, drains }
    }

    /// Pick a pump, route a path to each drain and lay the resulting pipes onto `state`.
    ///
    /// `reserved` is kept free of pipes, which is how the sliding gap stays clear.
    /// The pump goes beside an edge that has an exit on another edge more than `params.min_path_length` cells
    /// away, and drains are drawn from those exits, whenever the grid has any. Otherwise random blocks have to
    /// stretch the routes.
    /// Fails if any drain cannot be routed within `params.attempts` searches.
    pub fn generate(state: &mut GridState, params: &PipeParams, reserved: Option<Location>, rng: &mut impl Rng) -> Result<Self, PipeError> {
        let (width, height) = (state.width(), state.height());
        let dims = state.dims();

        // nothing may sit beside an edge cell feeding straight into the reserved cell
        let spots = Edge::VARIANTS.iter()
            .flat_map(|edge| (0..edge.span(width, height)).map(move |offset| Spot::on(*edge, width, height, offset)))
            .filter(|spot| spot.edge.inward().step_from(spot.point).inside(dims) != reserved)
            .collect_vec();
        let far_exits = |pump: &Spot| spots.iter()
            .filter(|exit| exit.edge != pump.edge && reach(pump.point, exit.point) > params.min_path_length)
            .copied()
            .collect_vec();

        let routable = spots.iter().filter(|pump| !far_exits(pump).is_empty()).copied().collect_vec();
        let pump_spot = choose_spot(if routable.is_empty() { &spots } else { &routable }, rng)
            .ok_or(PipeError::NoPumpSpot)?;
        let pump = Pump::on(pump_spot.edge, width, height, pump_spot.offset);
        let start = padded(pump.point);

        let exits = match far_exits(&pump_spot) {
            far if !far.is_empty() => far,
            _ => spots.iter().filter(|exit| exit.edge != pump_spot.edge).copied().collect_vec(),
        };

        let mut path_cells: HashSet<Location> = HashSet::new();
        let mut drains = Vec::with_capacity(params.drains);

        for drain_index in 0..params.drains {
            // exits are only shared once every one of them has a drain
            let fresh = exits.iter()
                .filter(|exit| drains.iter().all(|drain: &Drain| drain.point != exit.point))
                .copied()
                .collect_vec();
            let candidates = if fresh.is_empty() { &exits } else { &fresh };
            let mut routed = None;

            for attempt in 0..params.attempts {
                let mut grid = Array2::from_elem((height + 2, width + 2), Occupancy::Open);
                for ((y, x), slot) in grid.indexed_iter_mut() {
                    if x == 0 || y == 0 || x == width + 1 || y == height + 1 {
                        *slot = Occupancy::Blocked;
                    }
                }
                for _ in 0..params.block_tiles {
                    grid[(rng.gen_range(0..height + 2), rng.gen_range(0..width + 2))] = Occupancy::Blocked;
                }
                if let Some(reserved) = reserved {
                    grid[(reserved.1 + 1, reserved.0 + 1)] = Occupancy::Blocked;
                }

                let Some(exit) = choose_spot(candidates, rng) else { break };
                let drain = Drain::on(exit.edge, width, height, exit.offset);
                let goal = padded(drain.point);

                grid[start.as_index()] = Occupancy::Open;
                grid[goal.as_index()] = Occupancy::Open;

                match find_path(&grid, start, goal) {
                    Some(path) if path.len() > params.min_path_length => {
                        debug!(drain = drain_index, attempt, length = path.len(), "routed drain");
                        routed = Some((drain, path));
                        break;
                    }
                    _ => debug!(drain = drain_index, attempt, "drain route rejected"),
                }
            }

            let (drain, path) = routed.ok_or(PipeError::DrainUnreachable {
                drain: drain_index,
                attempts: params.attempts,
                min_path_length: params.min_path_length,
            })?;
            path_cells.extend(path);
            drains.push(drain);
        }

        let network = Self { pump, drains };
        let laid = network.lay(state, &path_cells)?;
        info!(drains = network.drains.len(), pipes = laid, pump_edge = ?pump_spot.edge, "pipe network laid");

        Ok(network)
    }

    /// Turn every padded path cell except the pump and drains into a pipe whose openings face exactly its
    /// neighbouring path cells. Returns the number of pipes laid.
    fn lay(&self, state: &mut GridState, path_cells: &HashSet<Location>) -> Result<usize, PipeError> {
        let ends = std::iter::once(self.pump.point)
            .chain(self.drains.iter().map(|drain| drain.point))
            .map(padded)
            .collect::<HashSet<_>>();

        let mut laid = 0;
        for cell in path_cells.iter().filter(|cell| !ends.contains(*cell)).sorted() {
            let mask = Direction::VARIANTS.iter()
                .filter(|dir| path_cells.contains(&dir.attempt_from(*cell)))
                .fold(Openings::NONE, |mask, dir| mask.with(*dir));

            if let Some((shape, rotation)) = PipeShape::matching(mask) {
                state.set_pipe(Location(cell.0 - 1, cell.1 - 1), shape, rotation)?;
                laid += 1;
            }
        }

        Ok(laid)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::*;
    use crate::board::Neighborhood;
    use crate::mode::{Mode, Modes};
    use crate::rng::seeded;

    fn pipe_grid(w: usize, h: usize) -> GridState {
        let mut state = GridState::new((NonZero::new(w).unwrap(), NonZero::new(h).unwrap()), Modes::from(Mode::Pipemania), false, Neighborhood::default());
        state.identity();
        state
    }

    #[test]
    fn edges_face_inward() {
        assert_eq!(Pump::on(Edge::Top, 4, 3, 2), Pump { point: BorderPoint(2, -1), rotation: 1 });
        assert_eq!(Pump::on(Edge::Left, 4, 3, 1), Pump { point: BorderPoint(-1, 1), rotation: 0 });
        assert_eq!(Pump::on(Edge::Bottom, 4, 3, 0), Pump { point: BorderPoint(0, 3), rotation: 3 });
        assert_eq!(Pump::on(Edge::Right, 4, 3, 2), Pump { point: BorderPoint(4, 2), rotation: 2 });
        assert_eq!(Pump::on(Edge::Top, 4, 3, 0).openings(), Openings::of(Direction::Down));
    }

    #[test]
    fn generated_openings_match_path_neighbours() {
        for seed in 0..20 {
            let mut state = pipe_grid(6, 6);
            let params = PipeParams { drains: 2, min_path_length: 5, block_tiles: 4, ..Default::default() };
            let network = PipeNetwork::generate(&mut state, &params, None, &mut seeded(seed)).unwrap();
            assert_eq!(network.drains.len(), 2);

            let mut ends = vec![network.pump.point];
            ends.extend(network.drains.iter().map(|drain| drain.point));

            for (at, cell) in state.cells() {
                let Some(openings) = cell.openings() else { continue };
                for dir in Direction::VARIANTS {
                    let next = dir.step_from(BorderPoint::from(at));
                    let on_path = match next.inside(state.dims()) {
                        Some(neighbour) => state.cell(neighbour).is_some_and(|other| other.pipe.is_some()),
                        None => ends.contains(&next),
                    };
                    assert_eq!(openings.has(*dir), on_path, "seed {seed} at {at} towards {dir:?}");
                }
            }
        }
    }

    #[test]
    fn reserved_cell_stays_dry() {
        for seed in 0..10 {
            let mut state = pipe_grid(5, 5);
            let params = PipeParams { drains: 3, min_path_length: 4, block_tiles: 2, ..Default::default() };
            PipeNetwork::generate(&mut state, &params, Some(Location(2, 2)), &mut seeded(seed)).unwrap();
            assert!(state.cell(Location(2, 2)).unwrap().pipe.is_none());
        }
    }

    #[test]
    fn impossible_length_is_reported() {
        let mut state = pipe_grid(3, 3);
        let params = PipeParams { drains: 1, min_path_length: 40, block_tiles: 0, attempts: 5 };
        let result = PipeNetwork::generate(&mut state, &params, None, &mut seeded(1));
        assert_eq!(result, Err(PipeError::DrainUnreachable { drain: 0, attempts: 5, min_path_length: 40 }));
    }

    #[test]
    fn long_routes_fit_narrow_grids() {
        // 8x4 with the sliding gap in the bottom left corner: only a few spot pairs are far enough apart
        let params = PipeParams { drains: 3, min_path_length: 12, block_tiles: 6, ..Default::default() };
        for seed in 0..200 {
            let mut state = pipe_grid(8, 4);
            let network = PipeNetwork::generate(&mut state, &params, Some(Location(0, 3)), &mut seeded(seed));
            let network = network.unwrap_or_else(|error| panic!("seed {seed}: {error}"));
            assert_eq!(network.drains.len(), 3);
            for drain in &network.drains {
                assert!(reach(network.pump.point, drain.point) > params.min_path_length, "seed {seed}");
            }
        }
    }

    #[test]
    fn drains_spread_over_exits_before_sharing() {
        let params = PipeParams { drains: 2, min_path_length: 12, block_tiles: 0, ..Default::default() };
        for seed in 0..20 {
            let mut state = pipe_grid(8, 4);
            let network = PipeNetwork::generate(&mut state, &params, None, &mut seeded(seed)).unwrap();
            assert_ne!(network.drains[0].point, network.drains[1].point, "seed {seed}");
        }
    }

    #[test]
    fn pump_edges_are_drawn_evenly() {
        let params = PipeParams { drains: 1, min_path_length: 3, block_tiles: 0, ..Default::default() };
        let mut counts = [0; 4];
        for seed in 0..400 {
            let mut state = pipe_grid(8, 2);
            let network = PipeNetwork::generate(&mut state, &params, None, &mut seeded(seed)).unwrap();
            let edge = Edge::VARIANTS.iter()
                .position(|edge| edge.inward() as u8 == network.pump.rotation)
                .unwrap();
            counts[edge] += 1;
        }
        // per-cell drawing would put the short left and right edges near 40 each
        assert!(counts.iter().all(|count| *count >= 60), "{counts:?}");
    }

    #[test]
    fn same_seed_same_network() {
        let params = PipeParams { drains: 2, min_path_length: 5, block_tiles: 3, ..Default::default() };
        let (mut a, mut b) = (pipe_grid(6, 5), pipe_grid(6, 5));
        let first = PipeNetwork::generate(&mut a, &params, None, &mut seeded(42)).unwrap();
        let second = PipeNetwork::generate(&mut b, &params, None, &mut seeded(42)).unwrap();
        assert_eq!(first, second);
        assert!(a.is_same(&b));
    }
}
