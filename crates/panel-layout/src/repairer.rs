//! Layout repairer
//!
//! Applies targeted fixes for reviewer findings to a copy of the plan, in this
//! order: replace-component, promote, anchor, reflow-region. Reflow runs last
//! so regions that grew through promotion are split as well.

use crate::anchors::AnchorBook;
use crate::config::ReviewConfig;
use crate::metrics::{MetricsDelta, QualityMetrics};
use crate::planner::{bind_slots, HERO_FRAME};
use crate::reviewer::{role_name, Finding, Review};
use panel_model::{
    ComponentLibrary, LayoutPlan, Page, PlacedItem, Region, RegionRole, RequirementModel,
};
use panel_retrieval::TwoStageRetriever;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Kind of repair applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepairAction {
    Promote,
    ReplaceComponent,
    ReflowRegion,
    Anchor,
}

impl fmt::Display for RepairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Promote => "promote",
            Self::ReplaceComponent => "replace-component",
            Self::ReflowRegion => "reflow-region",
            Self::Anchor => "anchor",
        })
    }
}

/// One change-log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    pub action: RepairAction,
    /// Info item or region id
    pub target: String,
    pub detail: String,
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.action, self.target, self.detail)
    }
}

/// Original and repaired plans with the change log and quality delta
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOutcome {
    pub original: LayoutPlan,
    pub repaired: LayoutPlan,
    pub changes: Vec<ChangeEntry>,
    pub before: QualityMetrics,
    pub after: QualityMetrics,
}

impl RepairOutcome {
    #[must_use]
    pub fn delta(&self) -> MetricsDelta {
        self.before.delta(&self.after)
    }

    /// Human-readable change log
    #[must_use]
    pub fn change_log(&self) -> Vec<String> {
        self.changes.iter().map(ToString::to_string).collect()
    }
}

/// What the repairer works from
#[derive(Debug, Clone, Copy)]
pub struct RepairInput<'a> {
    pub plan: &'a LayoutPlan,
    pub review: &'a Review,
    pub requirement: &'a RequirementModel,
    pub page: &'a Page,
    pub library: &'a ComponentLibrary,
}

/// Layout repairer
#[derive(Debug, Clone, Default)]
pub struct LayoutRepairer {
    retriever: TwoStageRetriever,
    config: ReviewConfig,
}

impl LayoutRepairer {
    #[must_use]
    pub fn new(retriever: TwoStageRetriever, config: ReviewConfig) -> Self {
        Self { retriever, config }
    }

    /// Repair a copy of the plan; the input plan is left untouched
    ///
    /// Every item of the repaired plan is pinned in `anchors` if it was not
    /// pinned by an earlier page.
    pub fn repair(&self, input: RepairInput<'_>, anchors: &mut AnchorBook) -> RepairOutcome {
        let mut plan = input.plan.clone();
        let mut changes = Vec::new();
        let before =
            QualityMetrics::measure(input.plan, input.requirement, input.library, &self.config);

        self.replace_components(&mut plan, input, &mut changes);
        let promoted = promote(&mut plan, input.review, &mut changes);
        anchor(&mut plan, input.review, &promoted, &mut changes);
        reflow(&mut plan, self.config.max_items_per_region, &mut changes);
        anchors.pin_plan(&plan);

        let after = QualityMetrics::measure(&plan, input.requirement, input.library, &self.config);
        tracing::info!(
            page_id = %input.page.id,
            changes = changes.len(),
            before = ?before,
            after = ?after,
            "layout repaired"
        );
        RepairOutcome {
            original: input.plan.clone(),
            repaired: plan,
            changes,
            before,
            after,
        }
    }

    fn replace_components(
        &self,
        plan: &mut LayoutPlan,
        input: RepairInput<'_>,
        changes: &mut Vec<ChangeEntry>,
    ) {
        let mut seen = HashSet::new();
        for issue in &input.review.issues {
            let (info_item_id, exclude) = match &issue.finding {
                Finding::MissingBinding { info_item_id } => (info_item_id, None),
                Finding::TypeMismatch {
                    info_item_id,
                    component_id,
                } => (info_item_id, Some(component_id.as_str())),
                _ => continue,
            };
            if !seen.insert(info_item_id.clone()) {
                continue;
            }
            let Some(item) = input.requirement.info_item(info_item_id) else {
                tracing::debug!(%info_item_id, "undeclared info item; binding left as is");
                continue;
            };
            let priority = input.page.priority_of(info_item_id);
            let Some(next) = self
                .retriever
                .next_best(item, input.library, priority, exclude)
            else {
                tracing::warn!(%info_item_id, "no alternative component available");
                continue;
            };
            let component = input.library.get(&next.component_id);
            let slots = bind_slots(item, component, input.page.preferred_binding(info_item_id));
            for region in &mut plan.regions {
                for placed in region
                    .items
                    .iter_mut()
                    .filter(|p| &p.info_item_id == info_item_id)
                {
                    placed.component_id = Some(next.component_id.clone());
                    placed.slot_bindings.clone_from(&slots);
                }
            }
            changes.push(ChangeEntry {
                action: RepairAction::ReplaceComponent,
                target: info_item_id.clone(),
                detail: format!(
                    "{} -> {} (score {:.2})",
                    exclude.unwrap_or("unbound"),
                    next.component_id,
                    next.score
                ),
            });
        }
    }
}

/// Move misplaced high-priority items to the front of the prominent region
fn promote(plan: &mut LayoutPlan, review: &Review, changes: &mut Vec<ChangeEntry>) -> HashSet<String> {
    let mut targets: Vec<(&str, u32)> = review
        .issues
        .iter()
        .filter_map(|issue| match &issue.finding {
            Finding::Misplaced {
                info_item_id,
                priority,
                ..
            } => Some((info_item_id.as_str(), *priority)),
            _ => None,
        })
        .collect();
    // prepend lowest-importance first so priority 1 ends up in front
    targets.sort_by(|a, b| b.1.cmp(&a.1));
    targets.dedup_by(|a, b| a.0 == b.0);

    let mut promoted = HashSet::new();
    for (info_item_id, priority) in targets {
        let Some((from, index)) = plan.locate(info_item_id) else {
            continue;
        };
        if plan.regions[from].role.is_prominent() {
            continue;
        }
        let placed = plan.regions[from].items.remove(index);
        let from_id = plan.regions[from].id.clone();
        let target = match plan.prominent_region() {
            Some(target) => target,
            None => {
                let mut hero = Region::new(unique_region_id(plan, "hero"), RegionRole::Hero, HERO_FRAME);
                hero.name = "Hero".to_string();
                plan.regions.insert(0, hero);
                0
            }
        };
        plan.regions[target].items.insert(0, placed);
        changes.push(ChangeEntry {
            action: RepairAction::Promote,
            target: info_item_id.to_string(),
            detail: format!(
                "priority {priority} moved from {from_id} to {}",
                plan.regions[target].id
            ),
        });
        promoted.insert(info_item_id.to_string());
    }
    promoted
}

/// Relocate items to the region role pinned by an earlier page
fn anchor(
    plan: &mut LayoutPlan,
    review: &Review,
    promoted: &HashSet<String>,
    changes: &mut Vec<ChangeEntry>,
) {
    for issue in &review.issues {
        let Finding::CrossPage {
            info_item_id,
            anchored,
            ..
        } = &issue.finding
        else {
            continue;
        };
        if promoted.contains(info_item_id) {
            tracing::debug!(%info_item_id, "promotion takes precedence over anchor");
            continue;
        }
        let (Some((from, index)), Some(target)) =
            (plan.locate(info_item_id), plan.region_with_role(*anchored))
        else {
            continue;
        };
        if from == target {
            continue;
        }
        let placed: PlacedItem = plan.regions[from].items.remove(index);
        let from_id = plan.regions[from].id.clone();
        plan.regions[target].items.push(placed);
        changes.push(ChangeEntry {
            action: RepairAction::Anchor,
            target: info_item_id.clone(),
            detail: format!(
                "moved from {from_id} to {} region {} to match earlier pages",
                role_name(*anchored),
                plan.regions[target].id
            ),
        });
    }
}

/// Split overcrowded regions side by side until every region fits
fn reflow(plan: &mut LayoutPlan, limit: usize, changes: &mut Vec<ChangeEntry>) {
    let limit = limit.max(1);
    let mut index = 0;
    while index < plan.regions.len() {
        let count = plan.regions[index].items.len();
        if count <= limit {
            index += 1;
            continue;
        }
        let new_id = unique_region_id(plan, &format!("{}-b", plan.regions[index].id));
        let region = &mut plan.regions[index];
        let trailing = region.items.split_off(count - count / 2);
        region.width /= 2.0;
        let sibling = Region {
            id: new_id,
            name: format!("{} (2)", region.name),
            role: region.role,
            x: region.x + region.width,
            y: region.y,
            width: region.width,
            height: region.height,
            layout: region.layout,
            items: trailing,
        };
        changes.push(ChangeEntry {
            action: RepairAction::ReflowRegion,
            target: region.id.clone(),
            detail: format!(
                "split {count} items into {} + {} (new region {})",
                region.items.len(),
                sibling.items.len(),
                sibling.id
            ),
        });
        plan.regions.insert(index + 1, sibling);
        // the first half is re-checked on the next pass
    }
}

fn unique_region_id(plan: &LayoutPlan, base: &str) -> String {
    let mut id = base.to_string();
    while plan.regions.iter().any(|r| r.id == id) {
        id.push_str("-b");
    }
    id
}
