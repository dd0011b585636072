//! The reseedable random source shared by generation, shuffling and level synthesis.
//!
//! Everything random in a puzzle is drawn from one [`PuzzleRng`], so a seed reproduces a level exactly.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The generator every random draw goes through.
pub type PuzzleRng = StdRng;

/// A generator positioned at the start of `seed`'s stream.
pub fn seeded(seed: u64) -> PuzzleRng {
    StdRng::seed_from_u64(seed)
}

/// A seed taken from the wall clock, for levels which ask for a fresh layout each time.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// A draw from `lo..hi`, or `lo` when the window is empty.
pub fn draw(rng: &mut impl Rng, lo: usize, hi: usize) -> usize {
    if hi <= lo {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}
