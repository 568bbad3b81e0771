//! Ownership handoff between the grid and the hook.
//!
//! A block's rendered world position must not jump when its parent changes,
//! so both directions convert through world space using the transforms as
//! they stand at the instant of the handoff.

use gantry_shared::Vec3;

use crate::chain::KinematicChain;
use crate::grid::{Block, BlockId, Cell, GridModel, ParentSpace};

/// World position of a block under its current parent.
#[must_use]
pub fn block_world_position(block: &Block, chain: &KinematicChain) -> Vec3 {
    match block.parent() {
        ParentSpace::Grid => chain.grid_local_to_world(block.local_position()),
        ParentSpace::Hook => chain.hook_local_to_world(block.local_position()),
    }
}

/// Reparents a resting block to the hook without moving it.
pub(crate) fn attach(grid: &mut GridModel, chain: &KinematicChain, id: BlockId) {
    let Some(block) = grid.block_mut(id) else {
        return;
    };
    debug_assert!(!block.is_carried(), "{id} attached twice");

    let world = block_world_position(block, chain);
    let local = chain.world_to_hook_local(world);
    block.reparent(ParentSpace::Hook, local);

    tracing::debug!("{} attached to hook at local {:?}", id, local.to_array());
}

/// Reparents a carried block to the grid and snaps it onto `cell`.
pub(crate) fn detach(grid: &mut GridModel, chain: &KinematicChain, id: BlockId, cell: Cell) {
    let snapped = grid.rest_position(cell);
    let Some(block) = grid.block_mut(id) else {
        return;
    };
    debug_assert!(block.is_carried(), "{id} detached without attach");

    let world = block_world_position(block, chain);
    let local = chain.world_to_grid_local(world);
    let drift = local.distance(snapped);
    block.reparent(ParentSpace::Grid, snapped);

    tracing::trace!("{} released at {} (snap drift {:.6})", id, cell, drift);
}
