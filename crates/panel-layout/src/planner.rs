//! Layout planner
//!
//! Places a page's info items into named regions. The model-assisted path is
//! tried first. Items the model leaves out are appended to a main region,
//! and a transport, decode, shape or renderability failure substitutes the
//! deterministic heuristic layout:
//!
//! ```text
//! +---------------------------+--------+
//! | hero (top priority)       |sidebar |
//! +---------------------------+(alerts)|
//! | left (remaining items)    |        |
//! +---------------------------+--------+
//! | bottom (toolbar)                   |
//! +------------------------------------+
//! ```

use crate::config::ScreenConfig;
use panel_llm::{request_json, LlmError, ModelCapability};
use panel_model::{
    ComponentExample, ComponentLibrary, DataType, InfoItem, LayoutPlan, ModelError, Page,
    PlacedItem, PreferredBinding, Region, RegionRole, RequirementModel, SlotBinding, SlotKind,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

const PLANNER_SYSTEM_PROMPT: &str = "You lay out monitoring dashboards. \
Place every info item into a region. Coordinates are ratios in [0, 1] of the screen. \
Answer with JSON only: {\"screen\": {\"width\": 1920, \"height\": 1080}, \
\"regions\": [{\"id\": \"...\", \"name\": \"...\", \"role\": \"hero|summary|main|sidebar|toolbar\", \
\"x\": 0.0, \"y\": 0.0, \"width\": 0.5, \"height\": 0.3, \
\"items\": [{\"infoItemId\": \"...\", \"componentId\": \"...\"}]}]}";

/// Heuristic region geometry as (x, y, width, height) ratios
pub const HERO_FRAME: (f64, f64, f64, f64) = (0.02, 0.02, 0.70, 0.30);
pub const SIDEBAR_FRAME: (f64, f64, f64, f64) = (0.74, 0.02, 0.24, 0.84);
pub const LEFT_FRAME: (f64, f64, f64, f64) = (0.02, 0.34, 0.70, 0.52);
pub const BOTTOM_FRAME: (f64, f64, f64, f64) = (0.02, 0.88, 0.96, 0.10);

/// Why a model layout was not used
#[derive(Debug, thiserror::Error)]
pub enum PlanRejection {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("model layout lacks a screen object")]
    MissingScreen,

    #[error("model layout lacks a regions array")]
    MissingRegions,

    #[error("model layout malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Shape was fine but the plan breaks the renderer contract
    #[error("model layout not renderable: {0}")]
    NotRenderable(#[from] ModelError),
}

/// Result of planning one page
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// Model answer passed shape and renderability checks
    ModelAssisted(LayoutPlan),
    /// Deterministic layout, with the reason the model path was skipped
    Heuristic { plan: LayoutPlan, reason: String },
}

impl PlanOutcome {
    #[must_use]
    pub fn plan(&self) -> &LayoutPlan {
        match self {
            Self::ModelAssisted(plan) | Self::Heuristic { plan, .. } => plan,
        }
    }

    #[must_use]
    pub fn into_plan(self) -> LayoutPlan {
        match self {
            Self::ModelAssisted(plan) | Self::Heuristic { plan, .. } => plan,
        }
    }

    #[must_use]
    pub fn is_model_assisted(&self) -> bool {
        matches!(self, Self::ModelAssisted(_))
    }

    /// Fallback reason, if any
    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::ModelAssisted(_) => None,
            Self::Heuristic { reason, .. } => Some(reason),
        }
    }
}

/// Everything the planner reads for one page
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub requirement: &'a RequirementModel,
    pub page: &'a Page,
    pub library: &'a ComponentLibrary,
    /// Retrieval result: info item id to component id
    pub bindings: &'a HashMap<String, String>,
}

/// Layout planner
#[derive(Debug, Clone, Default)]
pub struct LayoutPlanner {
    screen: ScreenConfig,
}

impl LayoutPlanner {
    #[must_use]
    pub fn new(screen: ScreenConfig) -> Self {
        Self { screen }
    }

    #[must_use]
    pub fn screen(&self) -> &ScreenConfig {
        &self.screen
    }

    /// Plan one page, model first
    pub async fn plan(
        &self,
        model: Option<&dyn ModelCapability>,
        input: PlanInput<'_>,
    ) -> PlanOutcome {
        let Some(model) = model else {
            return PlanOutcome::Heuristic {
                plan: self.heuristic(input),
                reason: "no model capability".to_string(),
            };
        };
        match self.model_plan(model, input).await {
            Ok(plan) => PlanOutcome::ModelAssisted(plan),
            Err(rejection) => {
                tracing::warn!(page_id = %input.page.id, %rejection, "model layout rejected; using heuristic");
                PlanOutcome::Heuristic {
                    plan: self.heuristic(input),
                    reason: rejection.to_string(),
                }
            }
        }
    }

    async fn model_plan(
        &self,
        model: &dyn ModelCapability,
        input: PlanInput<'_>,
    ) -> Result<LayoutPlan, PlanRejection> {
        let items: Vec<Value> = input
            .page
            .ordered_item_ids()
            .iter()
            .filter_map(|id| input.requirement.info_item(id))
            .map(|item| {
                json!({
                    "infoItemId": item.id,
                    "name": item.name,
                    "dataType": item.data_type,
                    "priority": input.page.priority_of(&item.id),
                    "componentId": input.bindings.get(&item.id),
                })
            })
            .collect();
        let components: Vec<Value> = input
            .library
            .components()
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "name": c.name,
                    "supportedDataTypes": c.supported_data_types,
                    "layoutRole": c.meta.layout_role,
                    "recommendedViewportZone": c.meta.recommended_viewport_zone,
                })
            })
            .collect();
        let user_prompt = json!({
            "screenType": self.screen.screen_type,
            "screen": { "width": self.screen.width, "height": self.screen.height },
            "page": input.page.name,
            "items": items,
            "components": components,
        })
        .to_string();

        let raw: Value = request_json(model, PLANNER_SYSTEM_PROMPT, &user_prompt).await?;
        if !raw.get("screen").is_some_and(Value::is_object) {
            return Err(PlanRejection::MissingScreen);
        }
        if !raw.get("regions").is_some_and(Value::is_array) {
            return Err(PlanRejection::MissingRegions);
        }
        let mut plan: LayoutPlan = serde_json::from_value(raw)?;

        // Unknown items and repeat placements are dropped, first placement wins.
        let mut placed_ids: HashSet<String> = HashSet::new();
        for region in &mut plan.regions {
            region.items.retain(|placed| {
                input.requirement.info_item(&placed.info_item_id).is_some()
                    && placed_ids.insert(placed.info_item_id.clone())
            });
            for placed in &mut region.items {
                let known = placed
                    .component_id
                    .as_deref()
                    .is_some_and(|id| input.library.get(id).is_some());
                if !known {
                    placed.component_id = input.bindings.get(&placed.info_item_id).cloned();
                }
                let component = placed
                    .component_id
                    .as_deref()
                    .and_then(|id| input.library.get(id));
                match component {
                    Some(component) => placed
                        .slot_bindings
                        .retain(|b| component.has_slot(&b.slot_name)),
                    None => placed.slot_bindings.clear(),
                }
                if placed.slot_bindings.is_empty() {
                    if let Some(item) = input.requirement.info_item(&placed.info_item_id) {
                        placed.slot_bindings = bind_slots(
                            item,
                            component,
                            input.page.preferred_binding(&item.id),
                        );
                    }
                }
            }
        }

        let defaults = component_defaults(input.library);
        plan.component_defaults
            .retain(|_, id| input.library.get(id).is_some());
        if plan.component_defaults.is_empty() {
            plan.component_defaults = defaults.clone();
        }

        let missing: Vec<&InfoItem> = input
            .page
            .ordered_item_ids()
            .iter()
            .filter(|id| !placed_ids.contains(id.as_str()))
            .filter_map(|id| input.requirement.info_item(id))
            .collect();
        if !missing.is_empty() {
            tracing::debug!(
                page_id = %input.page.id,
                missing = missing.len(),
                "placing items the model layout left out"
            );
            let index = match plan.region_with_role(RegionRole::Main) {
                Some(index) => index,
                None => {
                    let id = unused_region_id(&plan, "main");
                    plan.regions
                        .push(named(Region::new(id, RegionRole::Main, LEFT_FRAME), "Main"));
                    plan.regions.len() - 1
                }
            };
            for item in missing {
                let placed = place(item, input, &defaults);
                plan.regions[index].items.push(placed);
            }
        }

        plan.check_renderable(input.library)?;
        Ok(plan)
    }

    /// Deterministic layout: top item in hero, alerts in sidebar, the rest left
    #[must_use]
    pub fn heuristic(&self, input: PlanInput<'_>) -> LayoutPlan {
        let defaults = component_defaults(input.library);
        let mut hero = named(Region::new("hero", RegionRole::Hero, HERO_FRAME), "Hero");
        let mut sidebar = named(
            Region::new("sidebar", RegionRole::Sidebar, SIDEBAR_FRAME),
            "Alerts",
        );
        let mut left = named(Region::new("left", RegionRole::Main, LEFT_FRAME), "Main");
        let bottom = named(
            Region::new("bottom", RegionRole::Toolbar, BOTTOM_FRAME),
            "Toolbar",
        );

        let ordered = input.page.ordered_item_ids();
        for (index, item) in ordered
            .iter()
            .filter_map(|id| input.requirement.info_item(id))
            .enumerate()
        {
            let placed = place(item, input, &defaults);
            if index == 0 {
                hero.items.push(placed);
            } else if item.data_type == DataType::Alert {
                sidebar.items.push(placed);
            } else {
                left.items.push(placed);
            }
        }

        LayoutPlan {
            screen: self.screen.screen(),
            regions: vec![hero, sidebar, left, bottom],
            component_defaults: defaults,
        }
    }
}

fn unused_region_id(plan: &LayoutPlan, base: &str) -> String {
    let taken = |id: &str| plan.regions.iter().any(|r| r.id == id);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|id| !taken(id))
        .unwrap_or_else(|| base.to_string())
}

fn named(mut region: Region, name: &str) -> Region {
    region.name = name.to_string();
    region
}

fn place(
    item: &InfoItem,
    input: PlanInput<'_>,
    defaults: &BTreeMap<DataType, String>,
) -> PlacedItem {
    let preferred = input.page.preferred_binding(&item.id);
    let component_id = preferred
        .and_then(|p| p.component_id.clone())
        .filter(|id| input.library.get(id).is_some())
        .or_else(|| input.bindings.get(&item.id).cloned())
        .or_else(|| defaults.get(&item.data_type).cloned());
    let component = component_id.as_deref().and_then(|id| input.library.get(id));
    let mut placed = PlacedItem::new(item.id.clone(), component_id.clone());
    placed.slot_bindings = bind_slots(item, component, preferred);
    placed
}

/// First library component supporting each data type
#[must_use]
pub fn component_defaults(library: &ComponentLibrary) -> BTreeMap<DataType, String> {
    DataType::ALL
        .iter()
        .filter_map(|dt| library.first_supporting(*dt).map(|c| (*dt, c.id.clone())))
        .collect()
}

/// Slot bindings for an item rendered with `component`
///
/// Preferred slot hints win; otherwise every declared slot receives a
/// placeholder derived from the item. Bindings never name a slot the
/// component does not declare.
#[must_use]
pub fn bind_slots(
    item: &InfoItem,
    component: Option<&ComponentExample>,
    preferred: Option<&PreferredBinding>,
) -> Vec<SlotBinding> {
    let Some(component) = component else {
        return Vec::new();
    };
    if let Some(hints) = preferred.map(|p| &p.slot_hints).filter(|h| !h.is_empty()) {
        return hints
            .iter()
            .filter(|hint| component.has_slot(&hint.slot_name))
            .cloned()
            .collect();
    }
    component
        .slots
        .iter()
        .map(|slot| SlotBinding::new(slot.name.clone(), placeholder(item, slot.kind)))
        .collect()
}

fn placeholder(item: &InfoItem, kind: SlotKind) -> String {
    match kind {
        SlotKind::Label => item.name.clone(),
        SlotKind::NumericValue => match item.data_type {
            DataType::Trend => "--".to_string(),
            _ => "0".to_string(),
        },
        SlotKind::Unit => unit_hint(item).unwrap_or_default(),
        SlotKind::State => "normal".to_string(),
        SlotKind::Alert => "no active alarms".to_string(),
        SlotKind::ListItem => {
            if item.description.is_empty() {
                item.name.clone()
            } else {
                item.description.clone()
            }
        }
    }
}

/// Unit written in parentheses in the item's name or description
fn unit_hint(item: &InfoItem) -> Option<String> {
    [&item.name, &item.description].into_iter().find_map(|text| {
        let open = text.find('(')?;
        let close = text[open..].find(')')? + open;
        let unit = text[open + 1..close].trim();
        (!unit.is_empty()).then(|| unit.to_string())
    })
}
