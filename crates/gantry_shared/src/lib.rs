//! # Gantry Shared
//!
//! Common types used by the motion engine and its host.
//!
//! ## Rule
//!
//! This crate must never depend on a renderer, window or GPU crate.
//! Scene-graph adapters live in the host, not here.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{BLOCK_COUNT, DEFAULT_PALETTE, GRID_CELLS, GRID_COLS, GRID_ROWS, TICK_RATE};
pub use math::{lerp, Vec3};
