//! Surface building: rule data, bound rules and the system that applies
//! them column by column.

pub mod data;
pub mod rules;
pub mod system;

pub use rules::{
    CaveSurface, ConditionSource, PreliminarySurface, RuleSource, SurfaceContext, SurfaceRule,
    VerticalAnchor,
};
pub use system::SurfaceSystem;
