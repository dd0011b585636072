//! Following flow from the pump through facing pipe openings.

use crate::board::GridState;
use crate::location::BorderPoint;
use crate::pipes::PipeNetwork;
use crate::shape::Openings;

/// What a propagation pass found.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FlowReport {
    /// Cells flow reached.
    pub full_cells: usize,
    /// Drains flow reached.
    pub drains_reached: usize,
}

impl PipeNetwork {
    /// Recompute which pipes carry flow from the pump, and which drains it reaches.
    ///
    /// A cell is full exactly when a chain of facing openings connects it to the pump.
    /// Every cell is entered at most once, so loops in the network terminate.
    pub fn propagate(&mut self, state: &mut GridState) -> FlowReport {
        state.drain_all();
        for drain in self.drains.iter_mut() {
            drain.reached = false;
        }

        let dims = state.dims();
        let mut report = FlowReport::default();
        let mut pending: Vec<(BorderPoint, Openings)> = vec![(self.pump.point, self.pump.openings())];

        while let Some((from, openings)) = pending.pop() {
            for direction in openings.directions() {
                let next = direction.step_from(from);

                let Some(at) = next.inside(dims) else {
                    for drain in self.drains.iter_mut().filter(|drain| drain.point == next) {
                        if !drain.reached {
                            drain.reached = true;
                            report.drains_reached += 1;
                        }
                    }
                    continue;
                };

                let Some(cell) = state.cell(at) else { continue };
                if cell.is_full {
                    continue;
                }
                let Some(theirs) = cell.openings() else { continue };
                if !theirs.has(direction.invert()) {
                    continue;
                }

                state.set_full(at, true);
                report.full_cells += 1;
                pending.push((next, theirs));
            }
        }

        report
    }

    /// Whether the last propagation reached every drain.
    pub fn all_drains_reached(&self) -> bool {
        self.drains.iter().all(|drain| drain.reached)
    }
}
