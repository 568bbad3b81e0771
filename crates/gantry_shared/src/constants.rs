//! # Layout Constants
//!
//! Fixed shape of the diorama. Layout files may tune spacing and speeds,
//! but the grid is always 3x3 with one hole.

// =============================================================================
// GRID
// =============================================================================

/// Columns in the block grid.
pub const GRID_COLS: u8 = 3;

/// Rows in the block grid.
pub const GRID_ROWS: u8 = 3;

/// Total number of cells.
pub const GRID_CELLS: usize = (GRID_COLS as usize) * (GRID_ROWS as usize);

/// Number of blocks (every cell but one is occupied).
pub const BLOCK_COUNT: usize = GRID_CELLS - 1;

/// Block colours in placement order (row-major, skipping the empty cell).
pub const DEFAULT_PALETTE: [u32; BLOCK_COUNT] = [
    0xff_6b_6b, 0xff_d9_3d, 0x6b_cb_77, 0x4d_96_ff, 0xc7_7d_ff, 0xff_9f_45, 0x2e_c4_b6, 0xf1_5b_b5,
];

// =============================================================================
// TIMING
// =============================================================================

/// Simulation tick rate (fixed steps per second).
pub const TICK_RATE: u32 = 60;
