//! # Grid Occupancy Model
//!
//! Eight blocks and one hole on a 3x3 grid.
//!
//! ## Invariant
//!
//! The eight recorded block cells plus `empty_cell` are pairwise distinct and
//! cover all nine cells. A carried block keeps its origin cell until
//! [`GridModel::complete_swap`] runs, so the invariant holds at every tick,
//! not only between moves.

use std::fmt;

use gantry_shared::{Vec3, BLOCK_COUNT, GRID_CELLS, GRID_COLS, GRID_ROWS};
use serde::Deserialize;

use crate::layout::GridLayout;
use crate::picker::BlockPicker;

/// A position in the 3x3 grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Cell {
    /// Column, 0..=2.
    pub col: u8,
    /// Row, 0..=2.
    pub row: u8,
}

impl Cell {
    /// Creates a cell.
    #[must_use]
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// True if the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        self.col < GRID_COLS && self.row < GRID_ROWS
    }

    /// Row-major index, 0..9.
    #[must_use]
    pub const fn index(self) -> usize {
        self.row as usize * GRID_COLS as usize + self.col as usize
    }

    /// All cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..GRID_ROWS).flat_map(|row| (0..GRID_COLS).map(move |col| Cell::new(col, row)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Identity of one block, stable for the life of the animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u8);

impl BlockId {
    /// Index into the block table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

/// Which transform a block's local position is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentSpace {
    /// Resting on the grid.
    Grid,
    /// Hanging from the hook.
    Hook,
}

/// One block on the grid or on the hook.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    id: BlockId,
    cell: Cell,
    carried: bool,
    color: u32,
    parent: ParentSpace,
    local_position: Vec3,
}

impl Block {
    /// Block identity.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Resting cell (the origin cell while carried).
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// True between attach and detach.
    #[must_use]
    pub const fn is_carried(&self) -> bool {
        self.carried
    }

    /// Cosmetic colour (0xRRGGBB).
    #[must_use]
    pub const fn color(&self) -> u32 {
        self.color
    }

    /// Current parent transform.
    #[must_use]
    pub const fn parent(&self) -> ParentSpace {
        self.parent
    }

    /// Position in the parent's frame.
    #[must_use]
    pub const fn local_position(&self) -> Vec3 {
        self.local_position
    }

    pub(crate) fn reparent(&mut self, parent: ParentSpace, local_position: Vec3) {
        self.parent = parent;
        self.carried = parent == ParentSpace::Hook;
        self.local_position = local_position;
    }
}

/// Occupancy of the 3x3 grid.
#[derive(Clone, Debug)]
pub struct GridModel {
    blocks: Vec<Block>,
    empty_cell: Cell,
    spacing: f32,
    z0: f32,
    rest_height: f32,
}

impl GridModel {
    /// Places eight blocks row-major around the layout's empty cell.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`](crate::LayoutError) if the grid section is
    /// malformed.
    pub fn new(layout: &GridLayout) -> crate::LayoutResult<Self> {
        layout.validate()?;

        let mut grid = Self {
            blocks: Vec::with_capacity(BLOCK_COUNT),
            empty_cell: layout.empty_cell,
            spacing: layout.spacing,
            z0: layout.z0,
            rest_height: layout.block_rest_height,
        };

        let cells: Vec<Cell> = Cell::all().filter(|&cell| cell != layout.empty_cell).collect();
        for (index, (cell, &color)) in cells.into_iter().zip(&layout.palette).enumerate() {
            let id = BlockId(u8::try_from(index).unwrap_or(u8::MAX));
            let local_position = grid.rest_position(cell);
            grid.blocks.push(Block {
                id,
                cell,
                carried: false,
                color,
                parent: ParentSpace::Grid,
                local_position,
            });
        }

        debug_assert!(grid.occupancy_is_consistent());
        Ok(grid)
    }

    /// Grid-local `(x, z)` of a cell centre.
    #[must_use]
    pub fn cell_to_world(&self, cell: Cell) -> (f32, f32) {
        let x = (f32::from(cell.col) - 1.0) * self.spacing;
        let z = (f32::from(cell.row) - 1.0) * self.spacing + self.z0;
        (x, z)
    }

    /// Grid-local centre of a block resting in `cell`.
    #[must_use]
    pub fn rest_position(&self, cell: Cell) -> Vec3 {
        let (x, z) = self.cell_to_world(cell);
        Vec3::new(x, self.rest_height, z)
    }

    /// The vacant cell.
    #[must_use]
    pub const fn empty_cell(&self) -> Cell {
        self.empty_cell
    }

    /// All blocks, ordered by id.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Looks up a block.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id.index())
    }

    /// Blocks currently on the ground.
    pub fn resting_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|block| !block.carried)
    }

    /// Resting block occupying `cell`, if any.
    #[must_use]
    pub fn block_at(&self, cell: Cell) -> Option<BlockId> {
        self.resting_blocks()
            .find(|block| block.cell == cell)
            .map(Block::id)
    }

    /// Uniform choice among resting blocks. Carried blocks are never
    /// candidates.
    pub fn pick_random_occupied_block(&self, picker: &mut dyn BlockPicker) -> BlockId {
        let candidates = self.resting_blocks().count();
        debug_assert!(candidates > 0, "no resting block to pick");

        let index = picker.pick(candidates.max(1)).min(candidates.saturating_sub(1));
        let id = self.resting_blocks().nth(index).map_or(BlockId(0), Block::id);
        debug_assert!(self.block(id).is_some_and(|block| !block.carried));
        id
    }

    /// Records a finished move: `id` now rests in `new_cell` and its old
    /// cell becomes the hole.
    pub(crate) fn complete_swap(&mut self, id: BlockId, new_cell: Cell) {
        debug_assert!(self.occupancy_is_consistent(), "occupancy broken before swap");
        debug_assert_eq!(new_cell, self.empty_cell, "block must move into the hole");

        let Some(block) = self.blocks.get_mut(id.index()) else {
            debug_assert!(false, "swap for unknown {id}");
            return;
        };
        debug_assert!(!block.carried, "{id} still on the hook");

        let previous = block.cell;
        block.cell = new_cell;
        self.empty_cell = previous;

        tracing::debug!("{} placed at {}, hole now at {}", id, new_cell, previous);
        debug_assert!(self.occupancy_is_consistent(), "occupancy broken after swap");
    }

    /// True if the eight block cells and the hole are nine distinct cells.
    #[must_use]
    pub fn occupancy_is_consistent(&self) -> bool {
        if self.blocks.len() != BLOCK_COUNT || !self.empty_cell.in_bounds() {
            return false;
        }

        let mut seen = [false; GRID_CELLS];
        let cells = self.blocks.iter().map(|block| block.cell);
        for cell in cells.chain(std::iter::once(self.empty_cell)) {
            if !cell.in_bounds() || seen[cell.index()] {
                return false;
            }
            seen[cell.index()] = true;
        }
        true
    }
}
