//! The puzzle archetypes and sets of them.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::VariantArray;

/// One puzzle archetype. Several may be active on the same grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Mode {
    /// Tiles slide into a single gap.
    Sliding,
    /// Pressing a tile flips the lights around it.
    LightsOut,
    /// Turning pipe pieces to carry flow from the pump to every drain.
    Pipemania,
    /// Actions only count on the beat of the music.
    Rhythm,
}

impl Mode {
    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// A set of [`Mode`]s.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(from = "Vec<Mode>", into = "Vec<Mode>")]
pub struct Modes(u8);

impl Modes {
    /// No modes at all, which is never a valid level.
    pub const EMPTY: Self = Self(0);

    /// Whether `mode` is a member.
    pub fn contains(&self, mode: Mode) -> bool {
        self.0 & mode.bit() != 0
    }

    /// Add `mode`.
    pub fn insert(&mut self, mode: Mode) {
        self.0 |= mode.bit();
    }

    /// This set with `mode` added.
    pub fn with(mut self, mode: Mode) -> Self {
        self.insert(mode);
        self
    }

    /// Whether no mode is a member.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The members, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        Mode::VARIANTS.iter().copied().filter(move |mode| self.contains(*mode))
    }
}

impl From<Mode> for Modes {
    fn from(value: Mode) -> Self {
        Self(value.bit())
    }
}

impl FromIterator<Mode> for Modes {
    fn from_iter<T: IntoIterator<Item = Mode>>(iter: T) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<Vec<Mode>> for Modes {
    fn from(value: Vec<Mode>) -> Self {
        value.into_iter().collect()
    }
}

impl From<Modes> for Vec<Mode> {
    fn from(value: Modes) -> Self {
        value.iter().collect()
    }
}

impl Display for Modes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.iter().map(|mode| format!("{mode:?}")).join("+"))
    }
}
