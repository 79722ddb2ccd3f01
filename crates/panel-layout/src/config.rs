//! Planner and reviewer settings

use panel_model::Screen;
use serde::{Deserialize, Serialize};

/// Target canvas for generated plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    /// Hint passed to the model planner
    pub screen_type: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: Screen::REFERENCE_WIDTH,
            height: Screen::REFERENCE_HEIGHT,
            screen_type: "monitoring dashboard".to_string(),
        }
    }
}

impl ScreenConfig {
    /// Screen descriptor without background
    #[must_use]
    pub fn screen(&self) -> Screen {
        Screen::new(self.width, self.height)
    }
}

/// Reviewer thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Regions holding more items than this are overcrowded
    pub max_items_per_region: usize,
    /// Items at or above this priority belong in a hero/summary region
    pub hero_priority_threshold: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_items_per_region: 6,
            hero_priority_threshold: 3,
        }
    }
}
