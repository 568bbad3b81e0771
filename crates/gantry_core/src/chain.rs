//! # Kinematic Chain
//!
//! Bridge -> trolley -> hook. Each link translates along one fixed axis
//! relative to its parent, so the whole transform of a link is the sum of
//! its ancestors' offsets:
//!
//! ```text
//! grid frame (origin)
//!   └─ bridge   mount (0, bridge_height, 0) + Z * bridge
//!        └─ trolley   X * trolley
//!             └─ hook   mount (0, hook_mount, 0) + Y * hook
//! ```
//!
//! The chain is a passive store. Sequencing and interpolation belong to the
//! phase machine.

use std::fmt;

use gantry_shared::Vec3;

use crate::layout::RigLayout;

/// One actuator / link of the crane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Bridge, travelling along Z.
    Bridge,
    /// Trolley, travelling along X on the bridge.
    Trolley,
    /// Hook, travelling along Y below the trolley.
    Hook,
}

impl Axis {
    /// All links, root first.
    pub const ALL: [Axis; 3] = [Axis::Bridge, Axis::Trolley, Axis::Hook];

    /// Parent link; `None` means the grid frame.
    #[must_use]
    pub const fn parent(self) -> Option<Axis> {
        match self {
            Self::Bridge => None,
            Self::Trolley => Some(Self::Bridge),
            Self::Hook => Some(Self::Trolley),
        }
    }

    /// Direction of travel in the parent frame.
    #[must_use]
    pub const fn direction(self) -> Vec3 {
        match self {
            Self::Bridge => Vec3::Z,
            Self::Trolley => Vec3::X,
            Self::Hook => Vec3::Y,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Bridge => 0,
            Self::Trolley => 1,
            Self::Hook => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bridge => "bridge",
            Self::Trolley => "trolley",
            Self::Hook => "hook",
        };
        f.write_str(name)
    }
}

/// A single-degree-of-freedom value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Actuator {
    value: f32,
}

impl Actuator {
    /// Current value.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.value
    }

    /// Overwrites the value.
    pub fn set(&mut self, value: f32) {
        self.value = value;
    }
}

/// The three actuators plus the fixed geometry that mounts them.
#[derive(Clone, Debug)]
pub struct KinematicChain {
    actuators: [Actuator; 3],
    origin: Vec3,
    bridge_height: f32,
    hook_mount: f32,
    drop_depth: f32,
    rail_extent: f32,
}

impl KinematicChain {
    /// Hook value when fully raised.
    pub const RAISED: f32 = 0.0;

    /// Builds a chain at rest: rails centred, hook raised.
    #[must_use]
    pub fn new(rig: &RigLayout) -> Self {
        Self {
            actuators: [Actuator::default(); 3],
            origin: rig.origin,
            bridge_height: rig.bridge_height,
            hook_mount: rig.hook_mount,
            drop_depth: rig.drop_depth,
            rail_extent: rig.rail_extent,
        }
    }

    /// Reads one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> f32 {
        self.actuators[axis.slot()].get()
    }

    /// Writes one axis, held inside its physical travel.
    pub fn set(&mut self, axis: Axis, value: f32) {
        let value = match axis {
            Axis::Bridge | Axis::Trolley => self.clamp_to_rail(value),
            Axis::Hook => value.clamp(self.drop_depth, Self::RAISED),
        };
        self.actuators[axis.slot()].set(value);
    }

    /// Hook value when fully lowered.
    #[must_use]
    pub const fn lowered(&self) -> f32 {
        self.drop_depth
    }

    /// Clamps a rail target into `[-rail_extent, rail_extent]`.
    #[must_use]
    pub fn clamp_to_rail(&self, value: f32) -> f32 {
        value.clamp(-self.rail_extent, self.rail_extent)
    }

    /// Offset of a link in its parent's frame.
    #[must_use]
    pub fn local_offset(&self, axis: Axis) -> Vec3 {
        let mount = match axis {
            Axis::Bridge => Vec3::Y * self.bridge_height,
            Axis::Trolley => Vec3::ZERO,
            Axis::Hook => Vec3::Y * self.hook_mount,
        };
        mount + axis.direction() * self.get(axis)
    }

    /// World position of a link, composed through its ancestry.
    #[must_use]
    pub fn world_position(&self, axis: Axis) -> Vec3 {
        let mut position = self.local_offset(axis);
        let mut link = axis.parent();
        while let Some(parent) = link {
            position = position + self.local_offset(parent);
            link = parent.parent();
        }
        self.origin + position
    }

    /// Expresses a world point in the hook's frame.
    #[must_use]
    pub fn world_to_hook_local(&self, world: Vec3) -> Vec3 {
        world - self.world_position(Axis::Hook)
    }

    /// Expresses a hook-local point in world space.
    #[must_use]
    pub fn hook_local_to_world(&self, local: Vec3) -> Vec3 {
        self.world_position(Axis::Hook) + local
    }

    /// Expresses a world point in the grid frame.
    #[must_use]
    pub fn world_to_grid_local(&self, world: Vec3) -> Vec3 {
        world - self.origin
    }

    /// Expresses a grid-local point in world space.
    #[must_use]
    pub fn grid_local_to_world(&self, local: Vec3) -> Vec3 {
        self.origin + local
    }
}
