//! Everything needed to build one puzzle.

use std::num::NonZero;

use serde::{Deserialize, Serialize};

use crate::board::Neighborhood;
use crate::error::ConfigError;
use crate::image::{AssetId, ReferenceImage};
use crate::location::Dimension;
use crate::mode::{Mode, Modes};
use crate::pipes::PipeParams;
use crate::rng::clock_seed;
use crate::shuffle::ShuffleLimits;

/// Where the random source of a level starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seed {
    /// Same layout every time.
    Fixed(u64),
    /// A fresh layout per play, seeded from the wall clock.
    Clock,
}

impl Default for Seed {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

impl Seed {
    /// The concrete seed to build with. Clock seeds differ on every call.
    pub fn resolve(&self) -> u64 {
        match self {
            Self::Fixed(seed) => *seed,
            Self::Clock => clock_seed(),
        }
    }
}

/// Tempo and timing window of the rhythm gate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmParams {
    /// Tempo of the level's track.
    pub bpm: f32,
    /// Seconds either side of a beat within which a move counts.
    pub beat_threshold: f32,
    /// Take back the player's last move when they miss the beat.
    pub undo_on_beat_fail: bool,
}

impl Default for RhythmParams {
    fn default() -> Self {
        Self { bpm: 120.0, beat_threshold: 0.25, undo_on_beat_fail: false }
    }
}

/// A level definition, either authored or synthesized.
///
/// Parameters for inactive modes are carried along but ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// The puzzle archetypes combined on this grid.
    pub modes: Modes,
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Perturbations applied to the solved grid; 0 leaves it solved.
    pub shuffle: usize,
    /// Seed of the layout and the scramble.
    pub seed: Seed,
    /// Tiles pinned in place on sliding grids.
    pub unmovable_pieces: usize,
    /// Lights toggled by one press.
    pub neighborhood: Neighborhood,
    /// Pipe network generation.
    pub pipes: PipeParams,
    /// Tempo and beat window.
    pub rhythm: RhythmParams,
    /// The track played, whose tempo is `rhythm.bpm`.
    pub music_track: Option<AssetId>,
    /// A picture spread across the tiles. Changes how sliding and pipemania are judged solved.
    pub image: Option<ReferenceImage>,
    /// Retry budgets for scrambling.
    pub limits: ShuffleLimits,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            modes: Modes::from(Mode::Sliding),
            width: 2,
            height: 2,
            shuffle: 3,
            seed: Seed::default(),
            unmovable_pieces: 0,
            neighborhood: Neighborhood::default(),
            pipes: PipeParams::default(),
            rhythm: RhythmParams::default(),
            music_track: None,
            image: None,
            limits: ShuffleLimits::default(),
        }
    }
}

impl LevelConfig {
    /// Whether `mode` is one of [`Self::modes`].
    pub fn is_active(&self, mode: Mode) -> bool {
        self.modes.contains(mode)
    }

    /// Check that this configuration can produce a puzzle, returning its grid dimensions.
    pub fn validate(&self) -> Result<(Dimension, Dimension), ConfigError> {
        if self.modes.is_empty() {
            return Err(ConfigError::NoModes);
        }

        let (Some(width), Some(height)) = (NonZero::new(self.width), NonZero::new(self.height)) else {
            return Err(ConfigError::ZeroArea(self.width, self.height));
        };
        let area = self.width * self.height;

        if self.is_active(Mode::Sliding) && self.unmovable_pieces >= area {
            return Err(ConfigError::TooManyUnmovable { count: self.unmovable_pieces, width: self.width, height: self.height });
        }

        if self.is_active(Mode::LightsOut) && self.neighborhood.radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }

        if self.is_active(Mode::Pipemania) {
            if self.pipes.drains == 0 {
                return Err(ConfigError::NoDrains);
            }
            // a path visits every cell at most once, plus the pump and drain outside the grid
            if self.pipes.min_path_length >= area + 2 {
                return Err(ConfigError::PathTooLong {
                    min_path_length: self.pipes.min_path_length,
                    width: self.width,
                    height: self.height,
                });
            }
        }

        if self.is_active(Mode::Rhythm) {
            let RhythmParams { bpm, beat_threshold, .. } = self.rhythm;
            if !(bpm > 0.0 && beat_threshold > 0.0) {
                return Err(ConfigError::BadTempo { bpm, threshold: beat_threshold });
            }
        }

        Ok((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_a_small_sliding_puzzle() {
        let config = LevelConfig::default();
        assert_eq!(config.modes, Modes::from(Mode::Sliding));
        assert_eq!((config.width, config.height, config.shuffle), (2, 2, 3));
        assert_eq!(config.pipes, PipeParams { drains: 2, min_path_length: 7, block_tiles: 10, attempts: 50 });
        assert_eq!(config.rhythm, RhythmParams { bpm: 120.0, beat_threshold: 0.25, undo_on_beat_fail: false });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unplayable_configs() {
        let base = LevelConfig::default();

        assert_eq!(LevelConfig { modes: Modes::EMPTY, ..base.clone() }.validate(), Err(ConfigError::NoModes));
        assert_eq!(LevelConfig { width: 0, ..base.clone() }.validate(), Err(ConfigError::ZeroArea(0, 2)));
        assert_eq!(
            LevelConfig { unmovable_pieces: 4, ..base.clone() }.validate(),
            Err(ConfigError::TooManyUnmovable { count: 4, width: 2, height: 2 }),
        );

        let lights = LevelConfig {
            modes: Modes::from(Mode::LightsOut),
            neighborhood: Neighborhood { radius: 0, ..Default::default() },
            ..base.clone()
        };
        assert_eq!(lights.validate(), Err(ConfigError::ZeroRadius));

        let pipes = LevelConfig { modes: Modes::from(Mode::Pipemania), width: 3, height: 3, ..base.clone() };
        assert!(pipes.validate().is_ok());
        let mut long = pipes.clone();
        long.pipes.min_path_length = 11;
        assert!(matches!(long.validate(), Err(ConfigError::PathTooLong { .. })));
        let mut dry = pipes;
        dry.pipes.drains = 0;
        assert_eq!(dry.validate(), Err(ConfigError::NoDrains));

        let mut rhythm = LevelConfig { modes: Modes::from(Mode::Rhythm), ..base };
        rhythm.rhythm.bpm = 0.0;
        assert!(matches!(rhythm.validate(), Err(ConfigError::BadTempo { .. })));
    }

    #[test]
    fn inactive_mode_params_are_ignored() {
        let config = LevelConfig {
            neighborhood: Neighborhood { radius: 0, ..Default::default() },
            pipes: PipeParams { drains: 0, ..Default::default() },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_sparse_json() {
        let config: LevelConfig = serde_json::from_str(
            r#"{ "modes": ["Pipemania", "Rhythm"], "width": 5, "height": 4, "seed": { "fixed": 9 }, "pipes": { "drains": 1, "min_path_length": 6, "block_tiles": 3 } }"#,
        ).unwrap();
        assert!(config.is_active(Mode::Pipemania) && config.is_active(Mode::Rhythm));
        assert_eq!(config.seed, Seed::Fixed(9));
        assert_eq!(config.pipes.attempts, 50);
        assert_eq!(config.rhythm.bpm, 120.0);
        assert_eq!(config.shuffle, 3);
    }
}
