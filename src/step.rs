//! Player actions as recorded values, and how to play or take them back.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::board::GridState;
use crate::location::Location;
use crate::mode::Mode;
use crate::shape::Spin;

/// One player action, as recorded in solutions and undo buffers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SolutionStep {
    /// Slide the tile at `from` into the gap at `to`.
    Move {
        /// The tile's location before the slide.
        from: Location,
        /// The gap it slides into.
        to: Location,
    },
    /// Give the piece at `at` one counterclockwise quarter turn.
    Rotate {
        /// The piece being turned.
        at: Location,
    },
    /// Flip the light at `at` and its neighbourhood.
    ToggleLight {
        /// The pressed cell.
        at: Location,
    },
}

impl Display for SolutionStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Move { from, to } => write!(f, "Move from {from} to {to}"),
            Self::Rotate { at } => write!(f, "Rotate piece at {at}"),
            Self::ToggleLight { at } => write!(f, "Toggle light at {at}"),
        }
    }
}

/// One line per step, in the order they should be played.
pub fn describe(steps: &[SolutionStep]) -> String {
    steps.iter().map(|step| format!("{step}\n")).collect()
}

impl SolutionStep {
    /// Play this step forward on `state`. Flow is not recomputed.
    pub fn apply_to(&self, state: &mut GridState) {
        match *self {
            Self::Move { from, to } => {
                state.swap(from, to);
                if state.is_active(Mode::LightsOut) {
                    state.toggle_light(to);
                }
            }
            Self::Rotate { at } => state.rotate(at, Spin::Counterclockwise),
            Self::ToggleLight { at } => state.toggle_light(at),
        }
    }

    /// Take this step back on `state`, restoring whatever [`Self::apply_to`] changed.
    pub fn revert_on(&self, state: &mut GridState) {
        match *self {
            Self::Move { from, to } => {
                if state.is_active(Mode::LightsOut) {
                    state.toggle_light(to);
                }
                state.swap(to, from);
            }
            Self::Rotate { at } => state.rotate(at, Spin::Clockwise),
            Self::ToggleLight { at } => state.toggle_light(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::*;
    use crate::board::Neighborhood;
    use crate::mode::Modes;

    #[test]
    fn text_matches_play_order() {
        let steps = [
            SolutionStep::Move { from: Location(0, 3), to: Location(1, 3) },
            SolutionStep::ToggleLight { at: Location(2, 2) },
            SolutionStep::Rotate { at: Location(0, 1) },
        ];
        assert_eq!(describe(&steps), "Move from 0,3 to 1,3\nToggle light at 2,2\nRotate piece at 0,1\n");
    }

    #[test]
    fn revert_undoes_combined_move() {
        let modes = Modes::from(Mode::Sliding).with(Mode::LightsOut);
        let mut state = GridState::new((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()), modes, true, Neighborhood::default());
        state.identity();
        state.clear(Location(2, 2));
        let before = state.clone();

        let step = SolutionStep::Move { from: Location(1, 2), to: Location(2, 2) };
        step.apply_to(&mut state);
        assert!(!state.has_cell(Location(1, 2)));
        assert!(!state.cell(Location(2, 2)).unwrap().light_on);
        step.revert_on(&mut state);
        assert!(state.is_same(&before));
    }
}
