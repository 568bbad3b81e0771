//! # Motion Phase Machine
//!
//! The crane runs one six-phase cycle per move, forever:
//!
//! ```text
//! MoveToPick ─> LowerToPick ─> RaiseWithBlock ─> MoveToPlace ─> LowerToPlace ─> RaiseAfterDrop
//!     ^          (attach)                                        (detach+swap)        │
//!     └───────────────────────────── pick next block ─────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Given the same picker output and the same tick sequence, every actuator
//! value is bit-identical between runs. The picker is consulted once per
//! cycle, on entry to `MoveToPick`.

use std::fmt;

use gantry_shared::lerp;

use crate::chain::{Axis, KinematicChain};
use crate::easing::Easing;
use crate::grid::{BlockId, Cell, GridModel};
use crate::handoff;
use crate::layout::PhaseSpeeds;
use crate::picker::BlockPicker;

/// One stage of the crane cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Bridge and trolley travel over the picked block.
    MoveToPick,
    /// Hook lowers onto the block.
    LowerToPick,
    /// Hook rises carrying the block.
    RaiseWithBlock,
    /// Bridge and trolley travel over the empty cell.
    MoveToPlace,
    /// Hook lowers the block into the empty cell.
    LowerToPlace,
    /// Hook rises empty.
    RaiseAfterDrop,
}

impl Phase {
    /// Phases in cycle order.
    pub const ALL: [Phase; 6] = [
        Phase::MoveToPick,
        Phase::LowerToPick,
        Phase::RaiseWithBlock,
        Phase::MoveToPlace,
        Phase::LowerToPlace,
        Phase::RaiseAfterDrop,
    ];

    /// The phase entered when this one completes.
    #[must_use]
    pub const fn next(self) -> Phase {
        match self {
            Self::MoveToPick => Self::LowerToPick,
            Self::LowerToPick => Self::RaiseWithBlock,
            Self::RaiseWithBlock => Self::MoveToPlace,
            Self::MoveToPlace => Self::LowerToPlace,
            Self::LowerToPlace => Self::RaiseAfterDrop,
            Self::RaiseAfterDrop => Self::MoveToPick,
        }
    }

    /// True for the bridge/trolley travel phases.
    #[must_use]
    pub const fn drives_rails(self) -> bool {
        matches!(self, Self::MoveToPick | Self::MoveToPlace)
    }

    /// Axes interpolated during this phase.
    #[must_use]
    pub const fn driven_axes(self) -> &'static [Axis] {
        if self.drives_rails() {
            &[Axis::Bridge, Axis::Trolley]
        } else {
            &[Axis::Hook]
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MoveToPick => "MoveToPick",
            Self::LowerToPick => "LowerToPick",
            Self::RaiseWithBlock => "RaiseWithBlock",
            Self::MoveToPlace => "MoveToPlace",
            Self::LowerToPlace => "LowerToPlace",
            Self::RaiseAfterDrop => "RaiseAfterDrop",
        };
        f.write_str(name)
    }
}

/// Start and target of one actuator for the current phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    /// Value captured on phase entry.
    pub start: f32,
    /// Value reached when progress hits 1.
    pub target: f32,
}

impl Tween {
    fn at(self, eased: f32) -> f32 {
        lerp(self.start, self.target, eased)
    }
}

/// Phase-specific payload: which actuators move and where to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Drive {
    /// Travel phases.
    Rails {
        /// Bridge (Z) tween.
        bridge: Tween,
        /// Trolley (X) tween.
        trolley: Tween,
    },
    /// Lower/raise phases.
    Hook(Tween),
}

impl Drive {
    fn apply(self, chain: &mut KinematicChain, eased: f32) {
        match self {
            Self::Rails { bridge, trolley } => {
                chain.set(Axis::Bridge, bridge.at(eased));
                chain.set(Axis::Trolley, trolley.at(eased));
            }
            Self::Hook(hook) => chain.set(Axis::Hook, hook.at(eased)),
        }
    }

    fn finish(self, chain: &mut KinematicChain) {
        match self {
            Self::Rails { bridge, trolley } => {
                chain.set(Axis::Bridge, bridge.target);
                chain.set(Axis::Trolley, trolley.target);
            }
            Self::Hook(hook) => chain.set(Axis::Hook, hook.target),
        }
    }
}

/// One block relocation, valid for a full cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    /// Cell the block is lifted from.
    pub from: Cell,
    /// Cell the block is set down in (the hole at selection time).
    pub to: Cell,
    /// Block being moved.
    pub block: BlockId,
}

/// Reported when a phase completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    /// Phase that completed.
    pub from: Phase,
    /// Phase entered.
    pub to: Phase,
    /// Tick on which the change happened (1-based).
    pub tick: u64,
}

/// The crane's sequencing brain.
#[derive(Clone, Debug)]
pub struct PhaseMachine {
    /// Current phase.
    phase: Phase,
    /// Normalised progress through the phase.
    progress: f32,
    /// Move being executed.
    current_move: Move,
    /// Start/target for the driven axes.
    drive: Drive,
    /// Progress per second, per phase.
    speeds: PhaseSpeeds,
    /// Curve applied to progress.
    easing: Easing,
    /// Ticks executed.
    ticks: u64,
    /// Full cycles completed.
    cycles: u64,
}

impl PhaseMachine {
    /// Starts in `MoveToPick` with a freshly selected move.
    pub fn new(
        speeds: PhaseSpeeds,
        easing: Easing,
        grid: &GridModel,
        chain: &KinematicChain,
        picker: &mut dyn BlockPicker,
    ) -> Self {
        let current_move = select_move(grid, picker);
        let drive = plan(Phase::MoveToPick, &current_move, grid, chain);

        Self {
            phase: Phase::MoveToPick,
            progress: 0.0,
            current_move,
            drive,
            speeds,
            easing,
            ticks: 0,
            cycles: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Progress through the current phase, in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Move being executed.
    #[must_use]
    pub const fn current_move(&self) -> Move {
        self.current_move
    }

    /// Start/target payload of the current phase.
    #[must_use]
    pub const fn drive(&self) -> Drive {
        self.drive
    }

    /// Ticks executed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Completed six-phase cycles.
    #[must_use]
    pub const fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    /// Advances one fixed step of `dt` seconds.
    ///
    /// Returns the transition if the current phase completed on this tick.
    pub fn tick(
        &mut self,
        dt: f32,
        grid: &mut GridModel,
        chain: &mut KinematicChain,
        picker: &mut dyn BlockPicker,
    ) -> Option<PhaseChange> {
        self.ticks += 1;

        let speed = self.speeds.for_phase(self.phase);
        let progress = (self.progress + dt * speed).clamp(0.0, 1.0);
        debug_assert!(progress >= self.progress, "progress went backwards");
        self.progress = progress;

        if progress < 1.0 {
            self.drive.apply(chain, self.easing.apply(progress));
            return None;
        }

        self.drive.finish(chain);
        self.complete(grid, chain);

        let from = self.phase;
        let to = from.next();
        if to == Phase::MoveToPick {
            self.cycles += 1;
            self.current_move = select_move(grid, picker);
        }
        self.enter(to, grid, chain);

        tracing::debug!("Crane phase {} -> {} at tick {}", from, to, self.ticks);
        Some(PhaseChange {
            from,
            to,
            tick: self.ticks,
        })
    }

    /// Completion side effects of the phase just finished.
    fn complete(&self, grid: &mut GridModel, chain: &KinematicChain) {
        let Move { block, to, .. } = self.current_move;
        match self.phase {
            Phase::LowerToPick => handoff::attach(grid, chain, block),
            Phase::LowerToPlace => {
                handoff::detach(grid, chain, block, to);
                grid.complete_swap(block, to);
            }
            _ => {}
        }
    }

    fn enter(&mut self, phase: Phase, grid: &GridModel, chain: &KinematicChain) {
        self.phase = phase;
        self.progress = 0.0;
        self.drive = plan(phase, &self.current_move, grid, chain);
    }
}

fn select_move(grid: &GridModel, picker: &mut dyn BlockPicker) -> Move {
    let block = grid.pick_random_occupied_block(picker);
    let from = grid.block(block).map_or(grid.empty_cell(), |b| b.cell());
    let to = grid.empty_cell();

    tracing::info!("Crane picking {} from {} for {}", block, from, to);
    Move { from, to, block }
}

/// Captures current actuator values and computes the phase's targets.
fn plan(phase: Phase, current_move: &Move, grid: &GridModel, chain: &KinematicChain) -> Drive {
    let hook_to = |target: f32| {
        Drive::Hook(Tween {
            start: chain.get(Axis::Hook),
            target,
        })
    };

    match phase {
        Phase::MoveToPick => rails_to(current_move.from, grid, chain),
        Phase::MoveToPlace => {
            debug_assert_eq!(grid.empty_cell(), current_move.to);
            rails_to(grid.empty_cell(), grid, chain)
        }
        Phase::LowerToPick | Phase::LowerToPlace => hook_to(chain.lowered()),
        Phase::RaiseWithBlock | Phase::RaiseAfterDrop => hook_to(KinematicChain::RAISED),
    }
}

fn rails_to(cell: Cell, grid: &GridModel, chain: &KinematicChain) -> Drive {
    let (x, z) = grid.cell_to_world(cell);
    Drive::Rails {
        bridge: Tween {
            start: chain.get(Axis::Bridge),
            target: chain.clamp_to_rail(z),
        },
        trolley: Tween {
            start: chain.get(Axis::Trolley),
            target: chain.clamp_to_rail(x),
        },
    }
}
