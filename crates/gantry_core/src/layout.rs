//! # Layout Configuration
//!
//! Static constants the engine consumes at `init`: grid shape and spacing,
//! rig geometry, per-phase speeds and the scheduler's timing.
//!
//! Layouts are loaded once at startup, usually from TOML:
//!
//! ```toml
//! seed = 7
//! easing = "cubic-in-out"
//!
//! [grid]
//! spacing = 1.1
//! empty_cell = { col = 1, row = 1 }
//!
//! [speeds]
//! move_to_pick = 2.4
//! ```
//!
//! Every section is optional; missing fields fall back to the shipped
//! diorama.

use std::fs;
use std::path::Path;

use gantry_shared::{Vec3, BLOCK_COUNT, DEFAULT_PALETTE, GRID_COLS, GRID_ROWS, TICK_RATE};
use serde::Deserialize;

use crate::easing::Easing;
use crate::error::{ConfigError, ConfigResult, LayoutError, LayoutResult};
use crate::grid::Cell;
use crate::phase::Phase;

/// Grid shape, spacing and block appearance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Columns (must be 3).
    pub cols: u8,
    /// Rows (must be 3).
    pub rows: u8,
    /// Distance between neighbouring cell centres.
    pub spacing: f32,
    /// Z offset of the middle row.
    pub z0: f32,
    /// Cell left empty at start.
    pub empty_cell: Cell,
    /// Height of a resting block's centre above the grid plane.
    pub block_rest_height: f32,
    /// One colour per block, in placement order.
    pub palette: Vec<u32>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            spacing: 1.1,
            z0: 0.0,
            empty_cell: Cell::new(1, 1),
            block_rest_height: 0.25,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl GridLayout {
    /// Checks the grid shape, empty cell, palette and spacing.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] found.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.cols != GRID_COLS || self.rows != GRID_ROWS {
            return Err(LayoutError::GridSize {
                cols: self.cols,
                rows: self.rows,
                expected_cols: GRID_COLS,
                expected_rows: GRID_ROWS,
            });
        }
        if !self.empty_cell.in_bounds() {
            return Err(LayoutError::EmptyCellOutOfRange {
                col: self.empty_cell.col,
                row: self.empty_cell.row,
            });
        }
        if self.palette.len() != BLOCK_COUNT {
            return Err(LayoutError::PaletteLength {
                expected: BLOCK_COUNT,
                found: self.palette.len(),
            });
        }
        positive("grid.spacing", self.spacing)
    }
}

/// Crane geometry, all in grid-local units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RigLayout {
    /// Grid frame origin in world space.
    pub origin: Vec3,
    /// Height of the bridge above the grid plane.
    pub bridge_height: f32,
    /// Vertical offset of the raised hook below the trolley.
    pub hook_mount: f32,
    /// Hook value when fully lowered (negative).
    pub drop_depth: f32,
    /// Half-length of the bridge and trolley rails.
    pub rail_extent: f32,
}

impl Default for RigLayout {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            bridge_height: 2.0,
            hook_mount: -0.35,
            drop_depth: -1.15,
            rail_extent: 1.3,
        }
    }
}

/// Progress per simulated second for each phase.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhaseSpeeds {
    /// Travel to the picked block.
    pub move_to_pick: f32,
    /// Hook down onto the block.
    pub lower_to_pick: f32,
    /// Hook up with the block.
    pub raise_with_block: f32,
    /// Travel to the empty cell.
    pub move_to_place: f32,
    /// Hook down into the empty cell.
    pub lower_to_place: f32,
    /// Hook up after release.
    pub raise_after_drop: f32,
}

impl PhaseSpeeds {
    /// Speed for one phase.
    #[must_use]
    pub const fn for_phase(&self, phase: Phase) -> f32 {
        match phase {
            Phase::MoveToPick => self.move_to_pick,
            Phase::LowerToPick => self.lower_to_pick,
            Phase::RaiseWithBlock => self.raise_with_block,
            Phase::MoveToPlace => self.move_to_place,
            Phase::LowerToPlace => self.lower_to_place,
            Phase::RaiseAfterDrop => self.raise_after_drop,
        }
    }

    /// Simulated seconds for one full six-phase cycle.
    #[must_use]
    pub fn cycle_seconds(&self) -> f32 {
        Phase::ALL.iter().map(|&phase| 1.0 / self.for_phase(phase)).sum()
    }
}

impl Default for PhaseSpeeds {
    fn default() -> Self {
        // Travel is slower than the hook: ~1.5 s per cycle
        Self {
            move_to_pick: 2.4,
            lower_to_pick: 6.0,
            raise_with_block: 6.0,
            move_to_place: 2.4,
            lower_to_place: 6.0,
            raise_after_drop: 6.0,
        }
    }
}

/// Longest `timing.max_frame_delta` accepted, in seconds.
pub const MAX_FRAME_DELTA_CEILING: f32 = 3_600.0;

/// Fixed-step scheduler timing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingLayout {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Longest frame delta honoured by one `advance` (seconds, at most
    /// [`MAX_FRAME_DELTA_CEILING`]).
    pub max_frame_delta: f32,
}

impl Default for TimingLayout {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            max_frame_delta: 10.0,
        }
    }
}

/// Everything the engine needs at construction.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Seed for block selection.
    pub seed: u64,
    /// Curve applied to every phase.
    pub easing: Easing,
    /// Grid section.
    pub grid: GridLayout,
    /// Rig section.
    pub rig: RigLayout,
    /// Per-phase speeds.
    pub speeds: PhaseSpeeds,
    /// Scheduler timing.
    pub timing: TimingLayout,
}

impl Layout {
    /// Parses and validates a layout from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for a layout that fails validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let layout: Self = toml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Reads, parses and validates a layout file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Layout::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks every rule the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] found.
    pub fn validate(&self) -> LayoutResult<()> {
        self.grid.validate()?;
        positive("rig.rail_extent", self.rig.rail_extent)?;
        positive("timing.max_frame_delta", self.timing.max_frame_delta)?;
        if self.timing.max_frame_delta > MAX_FRAME_DELTA_CEILING {
            return Err(LayoutError::FrameDeltaCeiling {
                value: self.timing.max_frame_delta,
                ceiling: MAX_FRAME_DELTA_CEILING,
            });
        }

        let drop_depth = self.rig.drop_depth;
        if !drop_depth.is_finite() || drop_depth >= 0.0 {
            return Err(LayoutError::DropDepth(drop_depth));
        }

        for phase in Phase::ALL {
            let value = self.speeds.for_phase(phase);
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::PhaseSpeed { phase, value });
            }
        }

        if self.timing.tick_rate == 0 {
            return Err(LayoutError::TickRate);
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> LayoutResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = Layout::default();
        assert_eq!(layout.validate(), Ok(()));

        let cycle = layout.speeds.cycle_seconds();
        assert!((1.0..=2.0).contains(&cycle), "cycle takes {cycle}s");
    }

    #[test]
    fn test_rejects_wrong_grid_size() {
        let mut layout = Layout::default();
        layout.grid.cols = 4;
        layout.grid.rows = 4;

        assert_eq!(
            layout.validate(),
            Err(LayoutError::GridSize {
                cols: 4,
                rows: 4,
                expected_cols: 3,
                expected_rows: 3,
            })
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut layout = Layout::default();
        layout.rig.drop_depth = 0.5;
        assert_eq!(layout.validate(), Err(LayoutError::DropDepth(0.5)));

        let mut layout = Layout::default();
        layout.speeds.lower_to_place = 0.0;
        assert_eq!(
            layout.validate(),
            Err(LayoutError::PhaseSpeed {
                phase: Phase::LowerToPlace,
                value: 0.0,
            })
        );

        let mut layout = Layout::default();
        layout.grid.empty_cell = Cell::new(3, 0);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::EmptyCellOutOfRange { col: 3, row: 0 })
        ));

        let mut layout = Layout::default();
        layout.grid.palette.pop();
        assert!(matches!(layout.validate(), Err(LayoutError::PaletteLength { .. })));

        let mut layout = Layout::default();
        layout.timing.tick_rate = 0;
        assert_eq!(layout.validate(), Err(LayoutError::TickRate));
    }

    #[test]
    fn test_rejects_unbounded_catch_up() {
        let mut layout = Layout::default();
        layout.timing.max_frame_delta = MAX_FRAME_DELTA_CEILING;
        assert_eq!(layout.validate(), Ok(()));

        for value in [3_601.0, 1e20, f32::MAX] {
            layout.timing.max_frame_delta = value;
            assert_eq!(
                layout.validate(),
                Err(LayoutError::FrameDeltaCeiling {
                    value,
                    ceiling: MAX_FRAME_DELTA_CEILING,
                })
            );
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let layout = Layout::from_toml_str(
            r#"
            seed = 42
            easing = "linear"

            [grid]
            spacing = 2.0
            empty_cell = { col = 0, row = 2 }

            [speeds]
            move_to_pick = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(layout.seed, 42);
        assert_eq!(layout.easing, Easing::Linear);
        assert_eq!(layout.grid.spacing, 2.0);
        assert_eq!(layout.grid.empty_cell, Cell::new(0, 2));
        assert_eq!(layout.grid.palette.len(), BLOCK_COUNT);
        assert_eq!(layout.speeds.move_to_pick, 1.5);
        assert_eq!(layout.speeds.lower_to_pick, PhaseSpeeds::default().lower_to_pick);
        assert_eq!(layout.rig, RigLayout::default());
    }

    #[test]
    fn test_toml_errors_are_reported() {
        assert!(matches!(
            Layout::from_toml_str("seed = \"not a number\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Layout::from_toml_str("[grid]\ncols = 2"),
            Err(ConfigError::Invalid(LayoutError::GridSize { .. }))
        ));
        assert!(matches!(
            Layout::load("/nonexistent/gantry/layout.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
