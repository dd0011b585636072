//! Scrambling a solved grid by walking backwards from it.
//!
//! Every perturbation is the exact reverse of a legal [`SolutionStep`], so the recorded steps, reversed, always lead
//! back to the solved state. States already produced during the walk are never revisited.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::board::{CellFilter, GridState};
use crate::mode::Mode;
use crate::step::SolutionStep;

/// Retry budgets for [`shuffle`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShuffleLimits {
    /// Draws per [`GridState::random_cell`] call.
    pub random_cell_attempts: usize,
    /// Perturbations tried per shuffle step before the step is skipped.
    pub attempts_per_step: usize,
}

impl Default for ShuffleLimits {
    fn default() -> Self {
        Self { random_cell_attempts: 100, attempts_per_step: 10 }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Perturbation {
    Slide,
    Toggle,
    Turn,
}

/// The outcome of a [`shuffle`].
#[derive(Clone, Debug)]
pub struct Shuffle {
    /// Steps leading from the shuffled state back to the solved one, in play order.
    pub solution: Vec<SolutionStep>,
    /// Shuffle steps which exhausted their retries and changed nothing.
    pub skipped: usize,
    /// Every distinct state produced, starting with the solved one.
    pub snapshots: Vec<GridState>,
}

/// The kinds of perturbation the active modes allow.
///
/// Sliding moves already toggle lights when lights out is also active, so toggling on its own is only offered to
/// grids that cannot slide.
fn vocabulary(state: &GridState) -> Vec<Perturbation> {
    let mut kinds = Vec::with_capacity(2);
    if state.is_active(Mode::Sliding) {
        kinds.push(Perturbation::Slide);
    } else if state.is_active(Mode::LightsOut) {
        kinds.push(Perturbation::Toggle);
    }
    if state.is_active(Mode::Pipemania) {
        kinds.push(Perturbation::Turn);
    }
    kinds
}

/// Pick a step of the given kind whose reverse can be played on `state` right now.
fn candidate(state: &GridState, kind: Perturbation, limits: &ShuffleLimits, rng: &mut impl Rng) -> Option<SolutionStep> {
    match kind {
        Perturbation::Slide => {
            let at = state.random_cell(rng, CellFilter::slidable().with_attempts(limits.random_cell_attempts))?;
            let gap = state.empty_neighbour(at)?;
            Some(SolutionStep::Move { from: gap, to: at })
        }
        Perturbation::Toggle => {
            let at = state.random_cell(rng, CellFilter::any().with_attempts(limits.random_cell_attempts))?;
            Some(SolutionStep::ToggleLight { at })
        }
        Perturbation::Turn => {
            let at = state.random_cell(rng, CellFilter::rotatable().with_attempts(limits.random_cell_attempts))?;
            Some(SolutionStep::Rotate { at })
        }
    }
}

/// Apply up to `amount` random reversible perturbations to `state`, recording the solution.
pub fn shuffle(state: &mut GridState, amount: usize, limits: &ShuffleLimits, rng: &mut impl Rng) -> Shuffle {
    let kinds = vocabulary(state);
    let mut snapshots = vec![state.clone()];
    let mut recorded = Vec::with_capacity(amount);
    let mut skipped = 0;

    if kinds.is_empty() {
        return Shuffle { solution: recorded, skipped: amount, snapshots };
    }

    for iteration in 0..amount {
        let kind = kinds[rng.gen_range(0..kinds.len())];
        let mut accepted = None;

        for _ in 0..limits.attempts_per_step {
            let Some(step) = candidate(state, kind, limits, rng) else { continue };

            step.revert_on(state);
            if snapshots.iter().any(|seen| seen.is_same(state)) {
                step.apply_to(state);
                continue;
            }

            accepted = Some(step);
            break;
        }

        match accepted {
            Some(step) => {
                snapshots.push(state.clone());
                recorded.push(step);
            }
            None => {
                debug!(iteration, ?kind, "shuffle step found no new state");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(requested = amount, skipped, "shuffle ran out of fresh states");
    }
    info!(steps = recorded.len(), "grid shuffled");

    recorded.reverse();
    Shuffle { solution: recorded, skipped, snapshots }
}
