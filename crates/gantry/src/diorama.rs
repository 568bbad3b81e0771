//! # Diorama
//!
//! One object per canvas: the crane engine plus the sky, advanced once per
//! host frame and read back as a [`FrameSnapshot`] the renderer draws.
//!
//! Reduced motion freezes everything in its initial pose. Hiding the page
//! pauses the engine and stops the sky clock, so nothing catches up when it
//! becomes visible again.

use std::fs;
use std::path::Path;

use gantry_core::{
    Axis, BlockId, ConfigError, ConfigResult, Engine, HostHook, Layout, LayoutResult,
    ParentSpace, Phase,
};
use gantry_shared::Vec3;
use serde::Deserialize;

use crate::sky::{BirdPose, Sky, SkyConfig};

/// Everything the host reads at startup.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DioramaConfig {
    /// Engine layout.
    pub crane: Layout,
    /// Birds and haze.
    pub sky: SkyConfig,
    /// Freeze all motion (the user prefers reduced motion).
    pub reduced_motion: bool,
}

impl DioramaConfig {
    /// Parses a config from TOML text and validates the crane layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.crane.validate()?;
        Ok(config)
    }

    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`DioramaConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Render state of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSnapshot {
    /// Block id.
    pub id: BlockId,
    /// Frame the block is expressed in.
    pub parent: ParentSpace,
    /// World position.
    pub position: Vec3,
    /// Colour as `0xRRGGBB`.
    pub color: u32,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Fixed steps run for this frame.
    pub ticks: u32,
    /// Crane phase after the frame.
    pub phase: Phase,
    /// Bridge world position.
    pub bridge: Vec3,
    /// Trolley world position.
    pub trolley: Vec3,
    /// Hook world position.
    pub hook: Vec3,
    /// All eight blocks.
    pub blocks: Vec<BlockSnapshot>,
    /// Bird poses.
    pub birds: Vec<BirdPose>,
    /// Horizontal haze drift.
    pub haze_offset: f32,
}

/// Crane plus sky, driven by the host's frame callback.
pub struct Diorama {
    engine: Engine,
    sky: Sky,
    reduced_motion: bool,
    visible: bool,
}

impl Diorama {
    /// Builds the engine and the sky.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`gantry_core::LayoutError`] for a bad layout.
    pub fn new(config: &DioramaConfig) -> LayoutResult<Self> {
        let engine = Engine::init(&config.crane)?;
        if config.reduced_motion {
            tracing::info!("Reduced motion: diorama frozen in its initial pose");
        }

        Ok(Self {
            engine,
            sky: Sky::new(&config.sky),
            reduced_motion: config.reduced_motion,
            visible: true,
        })
    }

    /// Registers a host resource to release on shutdown.
    pub fn add_host_hook(&mut self, hook: Box<dyn HostHook>) {
        self.engine.add_host_hook(hook);
    }

    /// Advances one host frame and returns what to draw.
    pub fn frame(&mut self, delta_secs: f32) -> FrameSnapshot {
        let animate = !self.reduced_motion && self.visible && !self.engine.is_stopped();
        let ticks = if animate {
            self.sky.advance(delta_secs);
            self.engine.advance(delta_secs)
        } else {
            0
        };
        self.snapshot(ticks)
    }

    /// Follows page visibility.
    pub fn set_visible(&mut self, visible: bool) {
        if self.reduced_motion || self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.engine.resume();
        } else {
            self.engine.pause();
        }
    }

    /// True unless the page is hidden.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// True when motion is disabled.
    #[must_use]
    pub const fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Stops the engine and releases host hooks. Idempotent.
    pub fn shutdown(&mut self) {
        self.engine.stop();
    }

    /// The underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The sky layer.
    #[must_use]
    pub const fn sky(&self) -> &Sky {
        &self.sky
    }

    fn snapshot(&self, ticks: u32) -> FrameSnapshot {
        let chain = self.engine.chain();
        let blocks = self
            .engine
            .grid()
            .blocks()
            .iter()
            .map(|block| BlockSnapshot {
                id: block.id(),
                parent: block.parent(),
                position: gantry_core::block_world_position(block, chain),
                color: block.color(),
            })
            .collect();

        FrameSnapshot {
            ticks,
            phase: self.engine.phase(),
            bridge: chain.world_position(Axis::Bridge),
            trolley: chain.world_position(Axis::Trolley),
            hook: chain.world_position(Axis::Hook),
            blocks,
            birds: self.sky.poses(),
            haze_offset: self.sky.haze_offset(),
        }
    }
}
