//! # Gantry Core
//!
//! Deterministic motion engine for a gantry crane that endlessly rearranges
//! eight blocks on a 3x3 grid with one hole.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          Engine                            │
//! │                                                            │
//! │  FixedStepScheduler ──> PhaseMachine ──> KinematicChain    │
//! │        (60 Hz)              │             bridge/trolley/  │
//! │                             │             hook             │
//! │                             ├──> handoff (attach/detach)   │
//! │                             └──> GridModel (8 blocks)      │
//! │                                                            │
//! │  BlockPicker (seeded) ── consulted once per cycle          │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Single-threaded**: the host's frame callback drives everything
//! 2. **Fixed step**: motion never depends on the host's frame rate
//! 3. **Deterministic**: a seed (or a fixed picker) reproduces a run bit for bit
//! 4. **No I/O at runtime**: layouts are read once, before `Engine::init`

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod chain;
pub mod easing;
pub mod engine;
pub mod error;
pub mod grid;
pub mod handoff;
pub mod layout;
pub mod phase;
pub mod picker;
pub mod scheduler;

pub use chain::{Axis, KinematicChain};
pub use easing::{ease_in_out_cubic, Easing};
pub use engine::{Engine, EngineStats, HostHook};
pub use error::{ConfigError, ConfigResult, LayoutError, LayoutResult};
pub use grid::{Block, BlockId, Cell, GridModel, ParentSpace};
pub use handoff::block_world_position;
pub use layout::{
    GridLayout, Layout, PhaseSpeeds, RigLayout, TimingLayout, MAX_FRAME_DELTA_CEILING,
};
pub use phase::{Drive, Move, Phase, PhaseChange, PhaseMachine, Tween};
pub use picker::{BlockPicker, FixedPicker, SeededPicker};
pub use scheduler::{FixedStepScheduler, SchedulerStats};
