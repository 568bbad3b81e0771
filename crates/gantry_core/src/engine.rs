//! # Engine Handle
//!
//! The single entry point a host drives. Owns the grid, the crane chain, the
//! phase machine and the scheduler, and hands out read-only views of them.
//!
//! ```text
//! host frame ─> Engine::advance(delta)
//!                 └─ FixedStepScheduler ─> N x PhaseMachine::tick(step)
//!                                            ├─ KinematicChain::set
//!                                            └─ handoff / GridModel::complete_swap
//! host render ─> axis_value / block_world_position / block_parent_space
//! ```
//!
//! ## Lifecycle
//!
//! `init` builds everything once. `pause`/`resume` follow page visibility.
//! `stop` is final: no further ticks run and every host hook is released
//! exactly once, however many times `stop` is called.

use std::time::Duration;

use gantry_shared::Vec3;

use crate::chain::{Axis, KinematicChain};
use crate::error::LayoutResult;
use crate::grid::{BlockId, GridModel, ParentSpace};
use crate::handoff;
use crate::layout::{Layout, MAX_FRAME_DELTA_CEILING};
use crate::phase::{Move, Phase, PhaseMachine};
use crate::picker::{BlockPicker, SeededPicker};
use crate::scheduler::{FixedStepScheduler, SchedulerStats};

/// A host-owned resource tied to the engine's lifetime (frame callback,
/// visibility listener, render loop).
pub trait HostHook {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Detaches the hook from the host. Called once, on `Engine::stop`.
    fn release(&mut self);
}

/// Running totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Simulation ticks executed.
    pub ticks: u64,
    /// Phase transitions observed.
    pub phase_changes: u64,
    /// Full six-phase cycles completed.
    pub cycles: u64,
    /// Frames discarded while paused or stopped.
    pub dropped_frames: u64,
    /// Scheduler counters.
    pub scheduler: SchedulerStats,
}

/// The crane motion engine.
pub struct Engine {
    grid: GridModel,
    chain: KinematicChain,
    machine: PhaseMachine,
    scheduler: FixedStepScheduler,
    picker: Box<dyn BlockPicker>,
    hooks: Vec<Box<dyn HostHook>>,
    phase_changes: u64,
    dropped_frames: u64,
    paused: bool,
    stopped: bool,
}

impl Engine {
    /// Builds an engine whose block choices come from `layout.seed`.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::LayoutError`] the layout violates.
    pub fn init(layout: &Layout) -> LayoutResult<Self> {
        Self::with_picker(layout, Box::new(SeededPicker::new(layout.seed)))
    }

    /// Builds an engine with an explicit source of block choices.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::LayoutError`] the layout violates.
    pub fn with_picker(layout: &Layout, mut picker: Box<dyn BlockPicker>) -> LayoutResult<Self> {
        layout.validate()?;

        let grid = GridModel::new(&layout.grid)?;
        let chain = KinematicChain::new(&layout.rig);
        let machine =
            PhaseMachine::new(layout.speeds, layout.easing, &grid, &chain, &mut *picker);
        let max_frame_delta = Duration::try_from_secs_f32(layout.timing.max_frame_delta)
            .unwrap_or(Duration::from_secs_f32(MAX_FRAME_DELTA_CEILING));
        let scheduler = FixedStepScheduler::new(layout.timing.tick_rate, max_frame_delta);

        tracing::info!(
            "Crane engine ready: {} Hz, empty cell {}, cycle {:.2}s",
            layout.timing.tick_rate,
            grid.empty_cell(),
            layout.speeds.cycle_seconds()
        );

        Ok(Self {
            grid,
            chain,
            machine,
            scheduler,
            picker,
            hooks: Vec::new(),
            phase_changes: 0,
            dropped_frames: 0,
            paused: false,
            stopped: false,
        })
    }

    /// Feeds one host frame. Returns the number of fixed steps run.
    ///
    /// Does nothing while paused or after `stop`.
    pub fn advance(&mut self, frame_delta_secs: f32) -> u32 {
        if self.stopped || self.paused {
            self.dropped_frames += 1;
            return 0;
        }

        let dt = self.scheduler.step_secs();
        let Self {
            grid,
            chain,
            machine,
            scheduler,
            picker,
            phase_changes,
            ..
        } = self;

        scheduler.advance(frame_delta_secs, || {
            if machine.tick(dt, grid, chain, &mut **picker).is_some() {
                *phase_changes += 1;
            }
        })
    }

    /// Current value of one actuator.
    #[must_use]
    pub fn axis_value(&self, axis: Axis) -> f32 {
        self.chain.get(axis)
    }

    /// World position of a block, or `None` for an unknown id.
    #[must_use]
    pub fn block_world_position(&self, id: BlockId) -> Option<Vec3> {
        self.grid
            .block(id)
            .map(|block| handoff::block_world_position(block, &self.chain))
    }

    /// Frame a block is currently expressed in, or `None` for an unknown id.
    #[must_use]
    pub fn block_parent_space(&self, id: BlockId) -> Option<ParentSpace> {
        self.grid.block(id).map(|block| block.parent())
    }

    /// Registers a host resource to release on `stop`.
    ///
    /// A hook added after `stop` is released immediately.
    pub fn add_host_hook(&mut self, mut hook: Box<dyn HostHook>) {
        if self.stopped {
            tracing::debug!("Engine already stopped, releasing {} now", hook.name());
            hook.release();
            return;
        }
        self.hooks.push(hook);
    }

    /// Halts the engine and releases every host hook. Idempotent.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        for mut hook in self.hooks.drain(..) {
            tracing::debug!("Releasing host hook {}", hook.name());
            hook.release();
        }

        tracing::info!(
            "Crane engine stopped after {} ticks, {} cycles",
            self.machine.ticks(),
            self.machine.cycles_completed()
        );
    }

    /// True once `stop` has been called.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Suspends ticking (the page went hidden).
    pub fn pause(&mut self) {
        if self.stopped || self.paused {
            return;
        }
        self.paused = true;
        tracing::info!("Crane engine paused");
    }

    /// Resumes ticking without catching up on the time spent paused.
    pub fn resume(&mut self) {
        if self.stopped || !self.paused {
            return;
        }
        self.paused = false;
        self.scheduler.reset_accumulator();
        tracing::info!("Crane engine resumed");
    }

    /// True while paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Progress through the current phase, in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.machine.progress()
    }

    /// Move being executed.
    #[must_use]
    pub const fn current_move(&self) -> Move {
        self.machine.current_move()
    }

    /// Read-only grid.
    #[must_use]
    pub const fn grid(&self) -> &GridModel {
        &self.grid
    }

    /// Read-only crane chain.
    #[must_use]
    pub const fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    /// Fixed step size in seconds.
    #[must_use]
    pub fn step_secs(&self) -> f32 {
        self.scheduler.step_secs()
    }

    /// Snapshot of the running totals.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            ticks: self.machine.ticks(),
            phase_changes: self.phase_changes,
            cycles: self.machine.cycles_completed(),
            dropped_frames: self.dropped_frames,
            scheduler: *self.scheduler.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    use super::*;
    use crate::grid::Cell;
    use crate::picker::FixedPicker;
    use crate::LayoutError;

    struct CountingHook {
        releases: Rc<Counter<u32>>,
    }

    impl HostHook for CountingHook {
        fn name(&self) -> &str {
            "counting"
        }

        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    fn engine() -> Engine {
        Engine::with_picker(&Layout::default(), Box::new(FixedPicker::new(0))).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine();

        assert_eq!(engine.phase(), Phase::MoveToPick);
        assert_eq!(engine.progress(), 0.0);
        assert!(!engine.is_stopped());
        assert!(!engine.is_paused());
        for axis in Axis::ALL {
            assert_eq!(engine.axis_value(axis), 0.0);
        }
        assert_eq!(engine.stats(), EngineStats::default());
    }

    #[test]
    fn test_init_rejects_bad_grid() {
        let mut layout = Layout::default();
        layout.grid.cols = 4;
        layout.grid.rows = 4;

        assert!(matches!(
            Engine::init(&layout),
            Err(LayoutError::GridSize { cols: 4, rows: 4, .. })
        ));
    }

    #[test]
    fn test_init_rejects_unbounded_catch_up() {
        let mut layout = Layout::default();
        layout.timing.max_frame_delta = 1e20;

        assert!(matches!(
            Engine::init(&layout),
            Err(LayoutError::FrameDeltaCeiling { .. })
        ));
    }

    #[test]
    fn test_catch_up_is_capped_per_frame() {
        let mut layout = Layout::default();
        layout.timing.max_frame_delta = 1.0;
        let mut engine = Engine::with_picker(&layout, Box::new(FixedPicker::new(0))).unwrap();

        assert_eq!(engine.advance(100_000.0), 60);
        assert_eq!(engine.stats().scheduler.clamped_frames, 1);
    }

    #[test]
    fn test_block_queries() {
        let engine = engine();

        assert_eq!(engine.block_parent_space(BlockId(3)), Some(ParentSpace::Grid));
        assert_eq!(
            engine.block_world_position(BlockId(0)),
            Some(engine.grid().rest_position(Cell::new(0, 0)))
        );
        assert_eq!(engine.block_world_position(BlockId(8)), None);
        assert_eq!(engine.block_parent_space(BlockId(200)), None);
    }

    #[test]
    fn test_advance_moves_the_crane() {
        let mut engine = engine();

        let ticks = engine.advance(0.1);

        assert_eq!(ticks, 6);
        assert_eq!(engine.stats().ticks, 6);
        assert!(engine.progress() > 0.0);
        // Block 0 sits at (0, 0), so the rails head negative
        assert!(engine.axis_value(Axis::Trolley) < 0.0);
        assert!(engine.axis_value(Axis::Bridge) < 0.0);
    }

    #[test]
    fn test_stop_is_idempotent_and_releases_hooks_once() {
        let releases = Rc::new(Counter::new(0));
        let mut engine = engine();
        engine.add_host_hook(Box::new(CountingHook {
            releases: Rc::clone(&releases),
        }));
        engine.add_host_hook(Box::new(CountingHook {
            releases: Rc::clone(&releases),
        }));

        engine.stop();
        engine.stop();

        assert!(engine.is_stopped());
        assert_eq!(releases.get(), 2);

        // Late hooks are released straight away
        engine.add_host_hook(Box::new(CountingHook {
            releases: Rc::clone(&releases),
        }));
        assert_eq!(releases.get(), 3);
    }

    #[test]
    fn test_advance_after_stop_is_a_no_op() {
        let mut engine = engine();
        engine.advance(0.2);
        let bridge = engine.axis_value(Axis::Bridge);
        let ticks = engine.stats().ticks;

        engine.stop();

        assert_eq!(engine.advance(1.0), 0);
        assert_eq!(engine.axis_value(Axis::Bridge), bridge);
        assert_eq!(engine.stats().ticks, ticks);
        assert_eq!(engine.stats().dropped_frames, 1);
    }

    #[test]
    fn test_pause_discards_hidden_time() {
        let mut engine = engine();
        engine.advance(0.010);
        assert!(engine.scheduler.accumulator() > Duration::ZERO);

        engine.pause();
        assert!(engine.is_paused());
        assert_eq!(engine.advance(30.0), 0);

        engine.resume();
        assert!(!engine.is_paused());
        assert_eq!(engine.scheduler.accumulator(), Duration::ZERO);

        // The 10 ms carried before the pause is gone too
        assert_eq!(engine.advance(0.010), 0);
        assert_eq!(engine.stats().ticks, 0);
    }

    #[test]
    fn test_pause_after_stop_is_ignored() {
        let mut engine = engine();
        engine.stop();
        engine.pause();
        assert!(!engine.is_paused());
    }
}
