//! Layout plan
//!
//! The output handed to a renderer: a screen, a set of ratio-positioned
//! regions, and the items placed in each region with their component
//! bindings.

use crate::component::ComponentLibrary;
use crate::error::ModelError;
use crate::requirement::DataType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Background descriptor for the screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
}

/// Target screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
}

impl Screen {
    /// Reference canvas width
    pub const REFERENCE_WIDTH: u32 = 1920;
    /// Reference canvas height
    pub const REFERENCE_HEIGHT: u32 = 1080;

    /// Create screen with explicit dimensions
    #[inline]
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: None,
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(Self::REFERENCE_WIDTH, Self::REFERENCE_HEIGHT)
    }
}

/// Semantic role of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionRole {
    Hero,
    Summary,
    Main,
    Sidebar,
    Toolbar,
    #[serde(other)]
    Other,
}

impl RegionRole {
    /// Whether items with top priority belong here
    #[inline]
    #[must_use]
    pub fn is_prominent(&self) -> bool {
        matches!(self, RegionRole::Hero | RegionRole::Summary)
    }
}

/// How items flow inside a region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    Stack,
    Flow,
}

/// Content bound into one component slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotBinding {
    pub slot_name: String,
    pub value: String,
}

impl SlotBinding {
    /// Create new slot binding
    #[inline]
    #[must_use]
    pub fn new(slot_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            slot_name: slot_name.into(),
            value: value.into(),
        }
    }
}

/// An info item placed in a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub info_item_id: String,
    /// `None` is a reviewer-flaggable state
    #[serde(default)]
    pub component_id: Option<String>,
    #[serde(default)]
    pub slot_bindings: Vec<SlotBinding>,
}

impl PlacedItem {
    /// Create placed item
    #[inline]
    #[must_use]
    pub fn new(info_item_id: impl Into<String>, component_id: Option<String>) -> Self {
        Self {
            info_item_id: info_item_id.into(),
            component_id,
            slot_bindings: Vec::new(),
        }
    }
}

/// Named rectangular area with ratio coordinates in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub role: RegionRole,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default)]
    pub items: Vec<PlacedItem>,
}

impl Region {
    /// Create empty region
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        role: RegionRole,
        (x, y, width, height): (f64, f64, f64, f64),
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            role,
            x,
            y,
            width,
            height,
            layout: LayoutMode::default(),
            items: Vec::new(),
        }
    }

    /// Whether the region holds the info item
    #[inline]
    #[must_use]
    pub fn contains(&self, info_item_id: &str) -> bool {
        self.items.iter().any(|i| i.info_item_id == info_item_id)
    }
}

/// Spatial layout for one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlan {
    pub screen: Screen,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub component_defaults: BTreeMap<DataType, String>,
}

impl LayoutPlan {
    /// Region holding the info item, with the item's index
    #[must_use]
    pub fn locate(&self, info_item_id: &str) -> Option<(usize, usize)> {
        self.regions.iter().enumerate().find_map(|(r, region)| {
            region
                .items
                .iter()
                .position(|i| i.info_item_id == info_item_id)
                .map(|i| (r, i))
        })
    }

    /// First region with a prominent (hero/summary) role
    #[must_use]
    pub fn prominent_region(&self) -> Option<usize> {
        self.regions.iter().position(|r| r.role.is_prominent())
    }

    /// First region with the given role
    #[must_use]
    pub fn region_with_role(&self, role: RegionRole) -> Option<usize> {
        self.regions.iter().position(|r| r.role == role)
    }

    /// All placed items across regions
    pub fn placed_items(&self) -> impl Iterator<Item = (&Region, &PlacedItem)> {
        self.regions
            .iter()
            .flat_map(|r| r.items.iter().map(move |i| (r, i)))
    }

    /// Total number of placed items
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.regions.iter().map(|r| r.items.len()).sum()
    }

    /// Check the renderer contract: ratios in range, components and slots resolvable
    ///
    /// # Errors
    /// The first contract violation found.
    pub fn check_renderable(&self, library: &ComponentLibrary) -> Result<(), ModelError> {
        for region in &self.regions {
            for (field, value) in [
                ("x", region.x),
                ("y", region.y),
                ("width", region.width),
                ("height", region.height),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ModelError::RatioOutOfRange {
                        region_id: region.id.clone(),
                        field,
                        value,
                    });
                }
            }
            for item in &region.items {
                let Some(component_id) = &item.component_id else {
                    continue;
                };
                let component =
                    library
                        .get(component_id)
                        .ok_or_else(|| ModelError::UnknownComponent {
                            region_id: region.id.clone(),
                            info_item_id: item.info_item_id.clone(),
                            component_id: component_id.clone(),
                        })?;
                if let Some(binding) = item
                    .slot_bindings
                    .iter()
                    .find(|b| !component.has_slot(&b.slot_name))
                {
                    return Err(ModelError::UnknownSlot {
                        component_id: component_id.clone(),
                        slot_name: binding.slot_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
