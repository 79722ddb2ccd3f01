//! Plan, review and repair against the shared fixtures

use panel_layout::{
    AnchorBook, Finding, IssueCategory, LayoutPlanner, LayoutRepairer, LayoutReviewer, PlanInput,
    RepairAction, RepairInput, ReviewInput,
};
use panel_model::{
    InfoPriority, LayoutPlan, Page, PlacedItem, Region, RegionRole, RequirementModel,
};
use panel_test_utils::{sample_library, sample_requirement, FailingModel, ScriptedModel};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashMap;

fn fully_ranked(requirement: &RequirementModel) -> Page {
    Page::new("ranked", "Ranked").with_priorities(
        requirement
            .info_items
            .iter()
            .enumerate()
            .map(|(i, item)| InfoPriority::new(item.id.clone(), u32::try_from(i + 1).unwrap()))
            .collect(),
    )
}

#[test]
fn eight_item_region_is_one_usability_issue_and_reflows_to_two() {
    let mut requirement = sample_requirement();
    let library = sample_library();
    requirement.info_items.push(panel_model::InfoItem::new(
        "energy",
        "Energy use",
        panel_model::DataType::Numeric,
    ));
    let page = fully_ranked(&requirement);
    assert_eq!(requirement.info_items.len(), 8);

    let bindings: HashMap<String, String> = requirement
        .info_items
        .iter()
        .filter_map(|item| {
            library
                .first_supporting(item.data_type)
                .map(|c| (item.id.clone(), c.id.clone()))
        })
        .collect();
    let mut hero = Region::new("hero", RegionRole::Hero, (0.02, 0.02, 0.96, 0.5));
    hero.items = requirement
        .info_items
        .iter()
        .map(|item| PlacedItem::new(item.id.clone(), bindings.get(&item.id).cloned()))
        .collect();
    let plan = LayoutPlan {
        regions: vec![hero],
        ..LayoutPlan::default()
    };

    let review = LayoutReviewer::default().review(ReviewInput {
        plan: &plan,
        requirement: &requirement,
        page: &page,
        library: &library,
        anchors: &AnchorBook::new(),
    });
    assert_eq!(review.issues.len(), 1);
    assert_eq!(review.issues[0].category, IssueCategory::Usability);
    assert!(review.issues[0].message.contains("过于拥挤"));

    let outcome = LayoutRepairer::default().repair(
        RepairInput {
            plan: &plan,
            review: &review,
            requirement: &requirement,
            page: &page,
            library: &library,
        },
        &mut AnchorBook::new(),
    );
    assert_eq!(outcome.repaired.regions.len(), 2);
    assert_eq!(
        outcome.repaired.regions[0].items.len() + outcome.repaired.regions[1].items.len(),
        8
    );
    assert_eq!(outcome.changes[0].action, RepairAction::ReflowRegion);
    assert_eq!(outcome.before.crowded_regions, 1);
    assert_eq!(outcome.after.crowded_regions, 0);
    assert_eq!(outcome.original, plan);
}

#[tokio::test]
async fn heuristic_loop_leaves_no_semantic_issues() {
    let requirement = sample_requirement();
    let library = sample_library();
    let page = &requirement.pages[0];
    let bindings = HashMap::new();
    let input = PlanInput {
        requirement: &requirement,
        page,
        library: &library,
        bindings: &bindings,
    };

    let outcome = LayoutPlanner::default().plan(None, input).await;
    assert!(!outcome.is_model_assisted());
    let plan = outcome.into_plan();
    assert!(plan.check_renderable(&library).is_ok());

    let reviewer = LayoutReviewer::default();
    let mut anchors = AnchorBook::new();
    let review = reviewer.review(ReviewInput {
        plan: &plan,
        requirement: &requirement,
        page,
        library: &library,
        anchors: &anchors,
    });
    assert_eq!(review.summary.semantic, 1);

    let repaired = LayoutRepairer::default()
        .repair(
            RepairInput {
                plan: &plan,
                review: &review,
                requirement: &requirement,
                page,
                library: &library,
            },
            &mut anchors,
        )
        .repaired;
    let again = reviewer.review(ReviewInput {
        plan: &repaired,
        requirement: &requirement,
        page,
        library: &library,
        anchors: &anchors,
    });
    assert!(again.is_clean(), "{:?}", again.issues);
    assert!(repaired.check_renderable(&library).is_ok());
}

#[tokio::test]
async fn valid_model_layout_is_used() {
    let requirement = sample_requirement();
    let library = sample_library();
    let bindings = HashMap::new();
    let model = ScriptedModel::new([r#"```json
{"screen": {"width": 1920, "height": 1080},
 "regions": [{"id": "top", "name": "Top", "role": "hero", "x": 0, "y": 0, "width": 1, "height": 0.5,
   "items": [{"infoItemId": "throughput", "componentId": "kpi-card"}, {"infoItemId": "ghost"}]}]}
```"#]);

    let outcome = LayoutPlanner::default()
        .plan(
            Some(&model),
            PlanInput {
                requirement: &requirement,
                page: &requirement.pages[0],
                library: &library,
                bindings: &bindings,
            },
        )
        .await;

    assert!(outcome.is_model_assisted());
    let plan = outcome.plan();
    assert_eq!(plan.item_count(), 3);
    assert_eq!(plan.regions[0].items.len(), 1);
    assert_eq!(plan.regions[0].items[0].slot_bindings.len(), 3);
    assert!(!plan.component_defaults.is_empty());
    assert!(plan.check_renderable(&library).is_ok());

    // Items the model left out land in an appended main region, in priority order.
    assert_eq!(plan.regions.len(), 2);
    let main = &plan.regions[1];
    assert_eq!(main.role, RegionRole::Main);
    let ids: Vec<&str> = main.items.iter().map(|i| i.info_item_id.as_str()).collect();
    assert_eq!(ids, vec!["temp-trend", "alarm"]);
    assert!(main.items.iter().all(|i| i.component_id.is_some()));
}

#[tokio::test]
async fn model_layout_places_every_page_item_once() {
    let requirement = sample_requirement();
    let library = sample_library();
    let page = fully_ranked(&requirement);
    let bindings = HashMap::new();
    let model = ScriptedModel::new([r#"{"screen": {"width": 1920, "height": 1080},
 "regions": [
   {"id": "main", "role": "hero", "x": 0, "y": 0, "width": 0.7, "height": 0.4,
    "items": [{"infoItemId": "alarm", "componentId": "alarm-list"},
              {"infoItemId": "alarm", "componentId": "status-lamp"}]},
   {"id": "side", "role": "sidebar", "x": 0.7, "y": 0, "width": 0.3, "height": 0.9,
    "items": [{"infoItemId": "site-map", "componentId": "site-map",
               "slotBindings": [{"slotName": "legend", "value": "zones"}]}]}]}"#]);

    let outcome = LayoutPlanner::default()
        .plan(
            Some(&model),
            PlanInput {
                requirement: &requirement,
                page: &page,
                library: &library,
                bindings: &bindings,
            },
        )
        .await;

    assert!(outcome.is_model_assisted(), "{:?}", outcome.warning());
    let plan = outcome.plan();
    assert_eq!(plan.item_count(), requirement.info_items.len());
    for item in &requirement.info_items {
        let count = plan
            .placed_items()
            .filter(|(_, placed)| placed.info_item_id == item.id)
            .count();
        assert_eq!(count, 1, "{}", item.id);
    }
    let (region, index) = plan.locate("alarm").unwrap();
    assert_eq!(
        plan.regions[region].items[index].component_id.as_deref(),
        Some("alarm-list")
    );
    // The model's own "main" id is taken by a hero region.
    let appended = plan.regions.last().unwrap();
    assert_eq!(appended.id, "main-2");
    assert_eq!(appended.role, RegionRole::Main);
    let (region, index) = plan.locate("site-map").unwrap();
    let slots: Vec<&str> = plan.regions[region].items[index]
        .slot_bindings
        .iter()
        .map(|b| b.slot_name.as_str())
        .collect();
    assert_eq!(slots, vec!["title"]);
    assert!(plan.check_renderable(&library).is_ok());
}

#[tokio::test]
async fn out_of_range_model_layout_falls_back() {
    let requirement = sample_requirement();
    let library = sample_library();
    let page = fully_ranked(&requirement);
    let bindings = HashMap::new();
    let input = PlanInput {
        requirement: &requirement,
        page: &page,
        library: &library,
        bindings: &bindings,
    };
    let planner = LayoutPlanner::default();
    let model = ScriptedModel::new([r#"{"screen": {"width": 1920, "height": 1080},
 "regions": [{"id": "wide", "role": "main", "x": 1.5, "y": -0.2, "width": 3, "height": 0.5,
   "items": [{"infoItemId": "throughput", "componentId": "kpi-card"}]}]}"#]);

    let outcome = planner.plan(Some(&model), input).await;

    assert!(!outcome.is_model_assisted());
    assert!(outcome
        .warning()
        .is_some_and(|w| w.starts_with("model layout not renderable")));
    assert_eq!(outcome.plan(), &planner.heuristic(input));
    assert_eq!(outcome.plan().item_count(), 7);
    assert!(outcome.plan().check_renderable(&library).is_ok());
}

#[tokio::test]
async fn malformed_or_failed_model_layout_falls_back() {
    let requirement = sample_requirement();
    let library = sample_library();
    let bindings = HashMap::new();
    let input = PlanInput {
        requirement: &requirement,
        page: &requirement.pages[0],
        library: &library,
        bindings: &bindings,
    };
    let planner = LayoutPlanner::default();

    let shapeless = ScriptedModel::new([r#"{"screen": {"width": 1920}, "layout": []}"#]);
    let outcome = planner.plan(Some(&shapeless), input).await;
    assert_eq!(outcome.warning(), Some("model layout lacks a regions array"));
    assert_eq!(outcome.plan(), &planner.heuristic(input));

    let failing = FailingModel::timeout();
    let outcome = planner.plan(Some(&failing), input).await;
    assert!(outcome.warning().is_some_and(|w| w.contains("timed out")));
}

#[test]
fn cross_page_drift_is_anchored_on_second_page() {
    let requirement = sample_requirement();
    let library = sample_library();
    let page = fully_ranked(&requirement);
    let mut anchors = AnchorBook::new();
    anchors.pin("event-list", RegionRole::Sidebar);

    let mut hero = Region::new("hero", RegionRole::Hero, (0.0, 0.0, 0.7, 0.3));
    let mut side = Region::new("side", RegionRole::Sidebar, (0.7, 0.0, 0.3, 0.9));
    let mut main = Region::new("main", RegionRole::Main, (0.0, 0.3, 0.7, 0.6));
    for item in &requirement.info_items {
        let component = library.first_supporting(item.data_type).map(|c| c.id.clone());
        let placed = PlacedItem::new(item.id.clone(), component);
        match page.priority_of(&item.id) {
            Some(p) if p <= 3 => hero.items.push(placed),
            _ if item.id == "site-map" => side.items.push(placed),
            _ => main.items.push(placed),
        }
    }
    let plan = LayoutPlan {
        regions: vec![hero, side, main],
        ..LayoutPlan::default()
    };

    let review = LayoutReviewer::default().review(ReviewInput {
        plan: &plan,
        requirement: &requirement,
        page: &page,
        library: &library,
        anchors: &anchors,
    });
    assert_eq!(review.summary.consistency, 1);
    assert!(matches!(
        &review.of(IssueCategory::Consistency).next().unwrap().finding,
        Finding::CrossPage { info_item_id, .. } if info_item_id == "event-list"
    ));

    let outcome = LayoutRepairer::default().repair(
        RepairInput {
            plan: &plan,
            review: &review,
            requirement: &requirement,
            page: &page,
            library: &library,
        },
        &mut anchors,
    );
    let (region, _) = outcome.repaired.locate("event-list").unwrap();
    assert_eq!(outcome.repaired.regions[region].role, RegionRole::Sidebar);
}

proptest! {
    #[test]
    fn repair_never_adds_missing_bindings(
        bound in proptest::collection::vec(any::<bool>(), 7),
        roles in proptest::collection::vec(0usize..3, 7),
    ) {
        let requirement = sample_requirement();
        let library = sample_library();
        let page = fully_ranked(&requirement);
        let mut regions = vec![
            Region::new("hero", RegionRole::Hero, (0.0, 0.0, 0.7, 0.3)),
            Region::new("side", RegionRole::Sidebar, (0.7, 0.0, 0.3, 0.9)),
            Region::new("main", RegionRole::Main, (0.0, 0.3, 0.7, 0.6)),
        ];
        for (i, item) in requirement.info_items.iter().enumerate() {
            let component = if bound[i] {
                library.first_supporting(item.data_type).map(|c| c.id.clone())
            } else {
                None
            };
            regions[roles[i]].items.push(PlacedItem::new(item.id.clone(), component));
        }
        let plan = LayoutPlan { regions, ..LayoutPlan::default() };
        let reviewer = LayoutReviewer::default();
        let mut anchors = AnchorBook::new();
        let missing = |review: &panel_layout::Review| {
            review
                .issues
                .iter()
                .filter(|i| matches!(i.finding, Finding::MissingBinding { .. }))
                .count()
        };

        let review = reviewer.review(ReviewInput {
            plan: &plan,
            requirement: &requirement,
            page: &page,
            library: &library,
            anchors: &anchors,
        });
        let outcome = LayoutRepairer::default().repair(
            RepairInput {
                plan: &plan,
                review: &review,
                requirement: &requirement,
                page: &page,
                library: &library,
            },
            &mut anchors,
        );
        let after = reviewer.review(ReviewInput {
            plan: &outcome.repaired,
            requirement: &requirement,
            page: &page,
            library: &library,
            anchors: &AnchorBook::new(),
        });

        prop_assert!(missing(&after) <= missing(&review));
        prop_assert_eq!(missing(&after), 0);
        prop_assert_eq!(outcome.repaired.item_count(), plan.item_count());
        prop_assert!(after.summary.semantic == 0);
    }
}
