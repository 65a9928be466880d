//! Fluid levels and the global pickers aquifers fall back to.

use enum_dispatch::enum_dispatch;

use crate::types::BlockStateId;

/// A fluid filling everything below a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidStatus {
    /// First y (exclusive) above the fluid.
    pub fluid_level: i32,
    /// Block state filling the positions below the level.
    pub fluid_type: BlockStateId,
}

impl FluidStatus {
    /// Creates a status from a level and a fluid.
    #[must_use]
    pub const fn new(fluid_level: i32, fluid_type: BlockStateId) -> Self {
        Self {
            fluid_level,
            fluid_type,
        }
    }

    /// The fluid below the level, `air` at and above it.
    #[must_use]
    pub const fn at(&self, y: i32, air: BlockStateId) -> BlockStateId {
        if y < self.fluid_level {
            self.fluid_type
        } else {
            air
        }
    }
}

/// Decides which fluid fills an open position when no aquifer overrides it.
#[enum_dispatch]
pub trait FluidPickerImpl {
    /// Fluid status at a block position.
    fn compute_fluid(&self, x: i32, y: i32, z: i32) -> FluidStatus;
}

/// The global fluid pickers.
#[enum_dispatch(FluidPickerImpl)]
#[derive(Debug, Clone)]
pub enum FluidPicker {
    /// The same status everywhere.
    Static(StaticFluidPicker),
    /// Sea level water above a lava floor.
    Overworld(OverworldFluidPicker),
}

/// A picker returning one status everywhere.
#[derive(Debug, Clone)]
pub struct StaticFluidPicker {
    status: FluidStatus,
}

impl StaticFluidPicker {
    /// Creates a picker that always returns `status`.
    #[must_use]
    pub const fn new(status: FluidStatus) -> Self {
        Self { status }
    }
}

impl FluidPickerImpl for StaticFluidPicker {
    fn compute_fluid(&self, _x: i32, _y: i32, _z: i32) -> FluidStatus {
        self.status
    }
}

/// Water at sea level, lava below `y = -54`.
#[derive(Debug, Clone)]
pub struct OverworldFluidPicker {
    lava: FluidStatus,
    default: FluidStatus,
    lava_below: i32,
}

impl OverworldFluidPicker {
    /// Top of the lava lakes at the bottom of the world.
    pub const LAVA_LEVEL: i32 = -54;

    /// Creates the picker for a world with the given sea level.
    #[must_use]
    pub fn new(sea_level: i32, default_fluid: BlockStateId, lava: BlockStateId) -> Self {
        Self {
            lava: FluidStatus::new(Self::LAVA_LEVEL, lava),
            default: FluidStatus::new(sea_level, default_fluid),
            lava_below: Self::LAVA_LEVEL.min(sea_level),
        }
    }
}

impl FluidPickerImpl for OverworldFluidPicker {
    fn compute_fluid(&self, _x: i32, y: i32, _z: i32) -> FluidStatus {
        if y < self.lava_below {
            self.lava
        } else {
            self.default
        }
    }
}
