//! One puzzle being played.
//!
//! A [`Session`] owns the grid, the pipe network and the recorded solution, and is the only place player actions
//! enter. Actions are checked against the active modes before anything changes; the rhythm gate is checked last.

use itertools::Itertools;
use rand::Rng;
use strum::VariantArray;
use tracing::{debug, info};

use crate::board::GridState;
use crate::cell::Cell;
use crate::error::{SessionError, SetupError};
use crate::image::{ReferenceImage, SpriteRect};
use crate::level::LevelConfig;
use crate::location::Location;
use crate::mode::Mode;
use crate::pipes::PipeNetwork;
use crate::rhythm::{is_on_beat, BeatTracker, Clock, SystemClock};
use crate::rng::{seeded, PuzzleRng};
use crate::shape::Direction;
use crate::shuffle::shuffle;
use crate::step::SolutionStep;

/// Draws spent looking for a pipe-free cell to remove when a picture is shown.
const GAP_ATTEMPTS: usize = 100;

/// Why an action was refused. Nothing changed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Rejection {
    /// The puzzle is already solved.
    Completed,
    /// The mode this action belongs to is not active.
    ModeInactive,
    /// The target lies off the grid.
    OutOfBounds,
    /// There is no tile at the target.
    Vacant,
    /// The tile is pinned.
    Immovable,
    /// The tile has no gap next to it to slide into.
    NoEmptyNeighbour,
    /// The tile carries no pipe to rotate.
    NoPipe,
}

/// What became of an attempted action.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// The step was played.
    Applied(SolutionStep),
    /// The action was legal but missed the beat, so it was dropped.
    OffBeat {
        /// The earlier action taken back as a penalty, if the level asks for one.
        reverted: Option<SolutionStep>,
    },
    /// The action was illegal.
    Rejected(Rejection),
}

impl Outcome {
    /// Whether the action changed the grid as asked.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Everything produced when a level is built.
struct Layout {
    state: GridState,
    network: Option<PipeNetwork>,
    solution: Vec<SolutionStep>,
    seed: u64,
}

/// Lay pipes, pin tiles, open the gap and shuffle, in that order.
fn build(config: &LevelConfig) -> Result<Layout, SessionError> {
    let dims = config.validate()?;
    let seed = config.seed.resolve();
    let mut rng = seeded(seed);

    let mut state = GridState::new(dims, config.modes, config.image.is_some(), config.neighborhood);
    state.identity();

    let sliding = config.is_active(Mode::Sliding);
    let reserved = (sliding && config.image.is_none()).then(|| state.gap_location());

    let network = if config.is_active(Mode::Pipemania) {
        Some(PipeNetwork::generate(&mut state, &config.pipes, reserved, &mut rng)?)
    } else {
        None
    };

    if sliding {
        for _ in 0..config.unmovable_pieces {
            let at = random_location(&state, &mut rng);
            if state.cell(at).is_some_and(|cell| cell.pipe.is_none()) {
                state.set_immovable(at, true);
            }
        }

        let gap = match reserved {
            Some(gap) => gap,
            None => (0..GAP_ATTEMPTS)
                .map(|_| random_location(&state, &mut rng))
                .find(|at| state.cell(*at).is_some_and(|cell| cell.pipe.is_none()))
                .ok_or(SetupError::NoGapAvailable)?,
        };
        state.clear(gap);
        free_a_neighbour(&mut state, gap);
    }

    let shuffled = shuffle(&mut state, config.shuffle, &config.limits, &mut rng);

    Ok(Layout { state, network, solution: shuffled.solution, seed })
}

/// Unpin the first tile beside `gap` when every tile around it is pinned, so the shuffle has a first slide.
fn free_a_neighbour(state: &mut GridState, gap: Location) {
    let beside = Direction::VARIANTS.iter()
        .map(|dir| dir.attempt_from(gap))
        .filter(|at| state.has_cell(*at))
        .collect_vec();
    if !beside.iter().all(|at| state.cell(*at).is_some_and(|cell| cell.immovable)) {
        return;
    }
    if let Some(at) = beside.first() {
        debug!(%at, "released the pin beside the gap");
        state.set_immovable(*at, false);
    }
}

fn random_location(state: &GridState, rng: &mut PuzzleRng) -> Location {
    Location(rng.gen_range(0..state.width()), rng.gen_range(0..state.height()))
}

/// A level being played: the grid, its pipes, the recorded solution and the rhythm state.
///
/// `C` supplies the time for the rhythm gate; tests drive it with a [`ManualClock`](crate::rhythm::ManualClock).
pub struct Session<C: Clock = SystemClock> {
    config: LevelConfig,
    state: GridState,
    network: Option<PipeNetwork>,
    solution: Vec<SolutionStep>,
    undo_buffer: Vec<SolutionStep>,
    tracker: BeatTracker,
    clock: C,
    seed: u64,
    moves: usize,
    completed: bool,
}

impl<C: Clock> Session<C> {
    /// Build and shuffle the level described by `config`.
    pub fn initialize(config: LevelConfig, clock: C) -> Result<Self, SessionError> {
        let Layout { state, network, solution, seed } = build(&config)?;
        info!(modes = %config.modes, width = config.width, height = config.height, seed, steps = solution.len(), "level ready");

        let mut session = Self {
            tracker: BeatTracker::new(config.rhythm.bpm),
            config,
            state,
            network,
            solution,
            undo_buffer: Vec::new(),
            clock,
            seed,
            moves: 0,
            completed: false,
        };
        session.reflow();
        session.check_solution();

        Ok(session)
    }

    /// Rebuild the level from scratch. Levels seeded from the clock get a new layout.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        let Layout { state, network, solution, seed } = build(&self.config)?;
        info!(seed, "level restarted");

        self.state = state;
        self.network = network;
        self.solution = solution;
        self.seed = seed;
        self.undo_buffer.clear();
        self.tracker.reset();
        self.moves = 0;
        self.reflow();
        self.check_solution();

        Ok(())
    }

    /// The level definition this session was built from.
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// The grid as it stands.
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// The pump and drains, when pipemania is active.
    pub fn network(&self) -> Option<&PipeNetwork> {
        self.network.as_ref()
    }

    /// Steps which take the freshly shuffled grid back to solved.
    pub fn solution(&self) -> &[SolutionStep] {
        &self.solution
    }

    /// The seed the layout was built from, useful to reproduce clock-seeded levels.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Player actions applied so far.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Whether the grid was solved when last checked. Every change is checked.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// The picture spread across the tiles, if any.
    pub fn image(&self) -> Option<&ReferenceImage> {
        self.config.image.as_ref()
    }

    /// The part of the reference picture drawn on the tile currently at `at`.
    pub fn sprite_rect(&self, at: Location) -> Option<SpriteRect> {
        let image = self.config.image.as_ref()?;
        let cell = self.state.cell(at)?;
        Some(image.sprite_rect(cell.original_position, self.state.dims()))
    }

    /// Report the music's playback position, in seconds. Returns `true` on a new beat.
    pub fn observe_playback(&mut self, position: f64) -> bool {
        self.tracker.observe(position, self.clock.now())
    }

    /// Wall time of the latest observed beat.
    pub fn beat_time(&self) -> f64 {
        self.tracker.beat_time()
    }

    /// Whether an action made now would count. Always true without the rhythm mode.
    pub fn is_on_beat(&self) -> bool {
        if !self.config.is_active(Mode::Rhythm) {
            return true;
        }
        let rhythm = &self.config.rhythm;
        is_on_beat(self.clock.now(), self.tracker.beat_time(), rhythm.bpm, rhythm.beat_threshold)
    }

    /// Slide the tile at `from` into the gap beside it.
    pub fn attempt_move(&mut self, from: Location) -> Outcome {
        let to = match self.target(from, Mode::Sliding) {
            Err(rejection) => return Outcome::Rejected(rejection),
            Ok(cell) if cell.immovable => return Outcome::Rejected(Rejection::Immovable),
            Ok(_) => match self.state.empty_neighbour(from) {
                Some(to) => to,
                None => return Outcome::Rejected(Rejection::NoEmptyNeighbour),
            },
        };
        self.play(SolutionStep::Move { from, to })
    }

    /// Flip the light at `at` and its neighbourhood. Sliding grids change their lights through moves instead.
    pub fn attempt_toggle(&mut self, at: Location) -> Outcome {
        if self.config.is_active(Mode::Sliding) {
            return Outcome::Rejected(Rejection::ModeInactive);
        }
        if let Err(rejection) = self.target(at, Mode::LightsOut) {
            return Outcome::Rejected(rejection);
        }
        self.play(SolutionStep::ToggleLight { at })
    }

    /// Give the pipe piece at `at` a counterclockwise quarter turn.
    pub fn attempt_rotate(&mut self, at: Location) -> Outcome {
        match self.target(at, Mode::Pipemania) {
            Err(rejection) => return Outcome::Rejected(rejection),
            Ok(cell) if cell.pipe.is_none() => return Outcome::Rejected(Rejection::NoPipe),
            Ok(cell) if cell.immovable => return Outcome::Rejected(Rejection::Immovable),
            Ok(_) => {}
        }
        self.play(SolutionStep::Rotate { at })
    }

    /// Checks shared by every action: not finished, mode active, a tile at `at`.
    fn target(&self, at: Location, mode: Mode) -> Result<&Cell, Rejection> {
        if self.completed {
            return Err(Rejection::Completed);
        }
        if !self.config.is_active(mode) {
            return Err(Rejection::ModeInactive);
        }
        if !self.state.contains(at) {
            return Err(Rejection::OutOfBounds);
        }
        self.state.cell(at).ok_or(Rejection::Vacant)
    }

    fn play(&mut self, step: SolutionStep) -> Outcome {
        let keep_history = self.config.is_active(Mode::Rhythm) && self.config.rhythm.undo_on_beat_fail;

        if !self.is_on_beat() {
            let reverted = if keep_history { self.undo_buffer.pop() } else { None };
            if let Some(previous) = reverted {
                self.undo(previous);
            }
            debug!(%step, ?reverted, "off beat");
            return Outcome::OffBeat { reverted };
        }

        self.apply(step);
        self.moves += 1;
        if keep_history {
            self.undo_buffer.push(step);
        }
        debug!(%step, moves = self.moves, completed = self.completed, "applied");

        Outcome::Applied(step)
    }

    /// Perform `step` without any legality or timing checks, e.g. to replay a solution.
    pub fn apply(&mut self, step: SolutionStep) {
        step.apply_to(&mut self.state);
        self.reflow();
        self.check_solution();
    }

    /// Take back `step`, which must have been the last change made to the grid.
    pub fn undo(&mut self, step: SolutionStep) {
        step.revert_on(&mut self.state);
        self.reflow();
        self.check_solution();
    }

    /// Re-evaluate whether the puzzle is solved, remembering the answer.
    pub fn check_solution(&mut self) -> bool {
        self.completed = self.state.check_solution();
        self.completed
    }

    fn reflow(&mut self) {
        if let Some(network) = self.network.as_mut() {
            let report = network.propagate(&mut self.state);
            debug!(full = report.full_cells, drains = report.drains_reached, "pipes reflowed");
        }
    }
}
