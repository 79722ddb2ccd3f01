//! Panel Model - shared data model for dashboard layout generation
//!
//! Defines the types that flow between the pipeline agents:
//! - Requirement model (phases, roles, conditions, info items, pages)
//! - Component library entries with derived ergonomics scores
//! - Layout plans (screen, regions, placed items, slot bindings)
//!
//! # Example
//!
//! ```rust
//! use panel_model::{DataType, InfoItem, RequirementModel};
//!
//! let mut model = RequirementModel::default();
//! model.info_items.push(InfoItem::new("alarm", "Active alarms", DataType::Alert));
//! assert!(model.info_item("alarm").is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod component;
pub mod error;
pub mod plan;
pub mod requirement;

pub use component::{
    ComponentExample, ComponentLibrary, ComponentMeta, DensityProfile, Ergonomics, LayerStats,
    PriorityAffinity, Size, Slot, SlotKind, VisualFootprint,
};
pub use error::ModelError;
pub use plan::{
    Background, LayoutMode, LayoutPlan, PlacedItem, Region, RegionRole, Screen, SlotBinding,
};
pub use requirement::{
    DataType, Facet, InfoItem, InfoPriority, Page, PreferredBinding, RequirementModel,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
