//! Levels past the authored ones are made up on the spot.
//!
//! A synthesized level depends only on its index and on how many levels were authored, so the same campaign always
//! plays the same way. Difficulty is driven by `base_level`, the number of levels since the authored set ran out.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::image::{AssetId, ReferenceImage};
use crate::level::{LevelConfig, Seed};
use crate::mode::{Mode, Modes};
use crate::pipes::PipeParams;
use crate::rng::{draw, seeded};

/// Content synthesized levels may pick from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPool {
    /// Tracks for rhythm levels.
    pub songs: Vec<AssetId>,
    /// Pictures spread across tiles.
    pub images: Vec<ReferenceImage>,
}

/// Modes a synthesized level is built around. Rhythm is only ever added on top.
const BASE_MODES: [Mode; 3] = [Mode::Sliding, Mode::LightsOut, Mode::Pipemania];

fn level_seed(index: usize) -> u64 {
    let index = index as u64;
    index.wrapping_mul(12345).wrapping_add(index.wrapping_mul(123)).wrapping_add(index)
}

fn pick_mode(rng: &mut impl Rng) -> Mode {
    BASE_MODES[draw(rng, 0, BASE_MODES.len())]
}

/// Derive the configuration of level `index` for a campaign with `authored_count` hand-made levels.
pub fn synthesize(index: usize, authored_count: usize, assets: &AssetPool) -> LevelConfig {
    let base_level = index.saturating_sub(authored_count) + 1;
    let mut rng = seeded(level_seed(index));

    let mut modes = Modes::from(pick_mode(&mut rng));
    if draw(&mut rng, 0, 100) < base_level {
        modes.insert(pick_mode(&mut rng));
        if draw(&mut rng, 0, 100) < base_level {
            modes.insert(pick_mode(&mut rng));
        }
    }

    // larger base levels widen the draw past the upper bound
    let width = draw(&mut rng, 0, base_level / 8).clamp(4, 8);
    let height = draw(&mut rng, 0, base_level / 8).clamp(4, 8);
    let (longest, shortest) = (width.max(height), width.min(height));
    let area = width * height;

    let shuffle = longest * 3 / 2 + draw(&mut rng, 1, base_level / 4);
    let seed = Seed::Fixed(rng.gen());

    let mut config = LevelConfig { modes, width, height, shuffle, seed, ..Default::default() };

    if modes.contains(Mode::Sliding) {
        let pinned = draw(&mut rng, 0, shortest / 3) + draw(&mut rng, 0, base_level / 5);
        // keep at least two thirds of the tiles free to slide
        config.unmovable_pieces = pinned.min(area / 3);
    }

    if modes.contains(Mode::Pipemania) {
        config.pipes = PipeParams {
            drains: (draw(&mut rng, 0, base_level / 20) + 2).clamp(1, longest / 2),
            min_path_length: longest * 3 / 2,
            block_tiles: area / 5,
            ..Default::default()
        };
    }

    if draw(&mut rng, 0, 200) < base_level {
        config.modes.insert(Mode::Rhythm);
        config.music_track = assets.songs.choose(&mut rng).cloned();
    }

    config.image = assets.images.choose(&mut rng).cloned();

    debug!(index, base_level, modes = %config.modes, width, height, shuffle, "synthesized level");
    config
}

/// Persistence of the player's progress, owned by whoever embeds the engine.
pub trait LevelStore {
    /// Index of the level the player is on.
    fn current_level(&self) -> usize;
    /// Record that the player is now on `level`.
    fn set_current_level(&mut self, level: usize);
}

/// A [`LevelStore`] which forgets everything when dropped.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryLevelStore {
    level: usize,
}

impl LevelStore for MemoryLevelStore {
    fn current_level(&self) -> usize {
        self.level
    }

    fn set_current_level(&mut self, level: usize) {
        self.level = level;
    }
}

/// The authored levels of a game, continued indefinitely by [`synthesize`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Campaign {
    /// Hand-made levels, played first.
    pub levels: Vec<LevelConfig>,
    /// Content synthesized levels draw from.
    pub assets: AssetPool,
}

impl Campaign {
    /// Load a campaign from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The authored level at `index`, or a synthesized one past the end of them.
    pub fn level(&self, index: usize) -> LevelConfig {
        match self.levels.get(index) {
            Some(authored) => authored.clone(),
            None => synthesize(index, self.levels.len(), &self.assets),
        }
    }

    /// The level the player is on.
    pub fn current(&self, store: &impl LevelStore) -> LevelConfig {
        self.level(store.current_level())
    }

    /// Move the player on to the next level, saving their progress.
    pub fn advance(&self, store: &mut impl LevelStore) -> LevelConfig {
        let next = store.current_level() + 1;
        store.set_current_level(next);
        self.level(next)
    }

    /// Send the player back to the first level.
    pub fn restart(&self, store: &mut impl LevelStore) -> LevelConfig {
        store.set_current_level(0);
        self.level(0)
    }
}
