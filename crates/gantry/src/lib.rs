//! # Gantry
//!
//! Host side of the gantry diorama: a crane rearranging blocks under a sky
//! of drifting birds.
//!
//! ## Modules
//!
//! - `diorama`: engine + sky, advanced once per host frame
//! - `sky`: bird flight paths and haze drift
//!
//! The motion engine itself lives in `gantry_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod diorama;
pub mod sky;

// Re-export the engine
pub use gantry_core as core;

pub use diorama::{BlockSnapshot, Diorama, DioramaConfig, FrameSnapshot};
pub use sky::{haze_offset, Bird, BirdPose, Sky, SkyConfig};
