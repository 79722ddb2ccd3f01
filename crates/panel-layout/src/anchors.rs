//! Cross-page placement anchors

use panel_model::{LayoutPlan, RegionRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Region role pinned for each info item the first time it was placed
///
/// Owned by the caller's run context and threaded through consecutive
/// pages; later pages are reviewed and repaired against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorBook {
    roles: HashMap<String, RegionRole>,
}

impl AnchorBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pinned role, if any
    #[must_use]
    pub fn role_of(&self, info_item_id: &str) -> Option<RegionRole> {
        self.roles.get(info_item_id).copied()
    }

    /// Pin a role unless one is already pinned; returns whether it was new
    pub fn pin(&mut self, info_item_id: &str, role: RegionRole) -> bool {
        if self.roles.contains_key(info_item_id) {
            return false;
        }
        self.roles.insert(info_item_id.to_string(), role);
        true
    }

    /// Pin every item of the plan that is not pinned yet
    pub fn pin_plan(&mut self, plan: &LayoutPlan) -> usize {
        plan.placed_items()
            .filter(|(region, item)| self.pin(&item.info_item_id, region.role))
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
