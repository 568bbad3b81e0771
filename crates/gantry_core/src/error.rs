//! # Engine Error Types
//!
//! The motion engine does no I/O while running. The only failures are a
//! malformed layout at construction and, for hosts that read layouts from
//! disk, the file itself.

use std::path::PathBuf;

use thiserror::Error;

use crate::phase::Phase;

/// A layout that the engine refuses to build.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The grid is not the fixed 3x3 shape.
    #[error("grid must be {expected_cols}x{expected_rows}, got {cols}x{rows}")]
    GridSize {
        /// Columns in the layout.
        cols: u8,
        /// Rows in the layout.
        rows: u8,
        /// Required columns.
        expected_cols: u8,
        /// Required rows.
        expected_rows: u8,
    },

    /// The initial empty cell lies outside the grid.
    #[error("empty cell ({col}, {row}) is outside the grid")]
    EmptyCellOutOfRange {
        /// Column of the empty cell.
        col: u8,
        /// Row of the empty cell.
        row: u8,
    },

    /// Palette does not have one colour per block.
    #[error("palette needs {expected} colours, got {found}")]
    PaletteLength {
        /// Required number of colours.
        expected: usize,
        /// Number of colours supplied.
        found: usize,
    },

    /// A length that must be strictly positive is not.
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive {
        /// Layout field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// The hook must drop below the trolley.
    #[error("drop depth must be negative and finite, got {0}")]
    DropDepth(f32),

    /// A phase would never finish.
    #[error("speed for phase {phase} must be positive and finite, got {value}")]
    PhaseSpeed {
        /// Phase with the bad speed.
        phase: Phase,
        /// Offending value.
        value: f32,
    },

    /// The catch-up cap is longer than the scheduler honours.
    #[error("max frame delta must be at most {ceiling} s, got {value}")]
    FrameDeltaCeiling {
        /// Offending value.
        value: f32,
        /// Largest accepted value.
        ceiling: f32,
    },

    /// The scheduler cannot run at zero ticks per second.
    #[error("tick rate must be at least 1")]
    TickRate,
}

/// Failure to read a layout file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read layout file {}: {source}", .path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// File is not valid TOML for a layout.
    #[error("failed to parse layout: {0}")]
    Parse(#[from] toml::de::Error),

    /// File parsed but describes an unusable layout.
    #[error("invalid layout: {0}")]
    Invalid(#[from] LayoutError),
}

/// Result type for layout validation and engine construction.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Result type for layout file loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
