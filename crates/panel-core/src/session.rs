//! Per-session run state
//!
//! Everything that survives between orchestrated calls lives here and is
//! passed in explicitly, so concurrent sessions never share state.

use panel_layout::AnchorBook;
use panel_model::{Background, ComponentLibrary, LayoutPlan};
use std::collections::HashMap;

/// State carried across runs of one session
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    library: Option<ComponentLibrary>,
    last_plans: HashMap<String, LayoutPlan>,
    background: Option<Background>,
    anchors: AnchorBook,
}

impl RunContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With component library (ergonomics filled in)
    #[must_use]
    pub fn with_library(mut self, library: ComponentLibrary) -> Self {
        self.set_library(library);
        self
    }

    /// Replace the library; missing ergonomics scores are recomputed
    pub fn set_library(&mut self, mut library: ComponentLibrary) {
        let filled = library.ensure_ergonomics();
        tracing::debug!(components = library.len(), filled, "component library loaded");
        self.library = Some(library);
    }

    #[must_use]
    pub fn library(&self) -> Option<&ComponentLibrary> {
        self.library.as_ref()
    }

    /// Background applied to every generated plan
    pub fn set_background(&mut self, background: Background) {
        self.background = Some(background);
    }

    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Most recent final plan of a page
    #[must_use]
    pub fn last_plan(&self, page_id: &str) -> Option<&LayoutPlan> {
        self.last_plans.get(page_id)
    }

    pub fn record_plan(&mut self, page_id: &str, plan: LayoutPlan) {
        self.last_plans.insert(page_id.to_string(), plan);
    }

    #[must_use]
    pub fn anchors(&self) -> &AnchorBook {
        &self.anchors
    }

    pub fn anchors_mut(&mut self) -> &mut AnchorBook {
        &mut self.anchors
    }

    /// Forget cross-page anchors, e.g. after the requirement model changed
    pub fn reset_anchors(&mut self) {
        self.anchors = AnchorBook::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::{ComponentExample, DataType, RegionRole};

    #[test]
    fn library_ergonomics_are_filled() {
        let ctx = RunContext::new().with_library(ComponentLibrary::new(vec![
            ComponentExample::new("card", "Card", vec![DataType::Numeric]),
        ]));
        let library = ctx.library().unwrap();
        assert!(library.get("card").unwrap().ergonomics.is_some());
    }

    #[test]
    fn anchors_reset() {
        let mut ctx = RunContext::new();
        ctx.anchors_mut().pin("kpi", RegionRole::Hero);
        assert_eq!(ctx.anchors().len(), 1);
        ctx.reset_anchors();
        assert!(ctx.anchors().is_empty());
    }
}
