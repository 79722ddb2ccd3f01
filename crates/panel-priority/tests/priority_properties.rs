//! Property tests for normalization and the priority-balance optimizer.

use panel_model::{DataType, InfoItem, InfoPriority, Page, RequirementModel};
use panel_priority::{dominates, normalize_priorities, OptimizerConfig, PriorityOptimizer};
use proptest::prelude::*;

const TYPES: [DataType; 7] = DataType::ALL;

fn model_strategy() -> impl Strategy<Value = RequirementModel> {
    (1..9usize)
        .prop_flat_map(|n| {
            (
                Just(n),
                proptest::collection::vec(0..TYPES.len(), n),
                proptest::collection::vec(
                    proptest::collection::vec((0..n + 2, 0..12u32), 0..n + 3),
                    1..4,
                ),
            )
        })
        .prop_map(|(n, types, pages)| {
            let info_items = (0..n)
                .map(|i| InfoItem::new(format!("i{i}"), format!("Item {i}"), TYPES[types[i]]))
                .collect();
            let pages = pages
                .into_iter()
                .enumerate()
                .map(|(p, entries)| {
                    Page::new(format!("page-{p}"), format!("Page {p}")).with_priorities(
                        entries
                            .into_iter()
                            .map(|(item, priority)| InfoPriority::new(format!("i{item}"), priority))
                            .collect(),
                    )
                })
                .collect();
            RequirementModel {
                info_items,
                pages,
                ..RequirementModel::default()
            }
        })
}

proptest! {
    #[test]
    fn prop_normalized_priorities_are_dense(model in model_strategy()) {
        let normalized = normalize_priorities(&model);
        prop_assert!(normalized.model.check_dense_priorities().is_ok());
        for page in &normalized.model.pages {
            prop_assert_eq!(page.info_priorities.len(), model.info_items.len());
        }
    }

    #[test]
    fn prop_optimizer_is_deterministic(model in model_strategy()) {
        let normalized = normalize_priorities(&model).model;
        let optimizer = PriorityOptimizer::new(OptimizerConfig::default());
        let first = optimizer.optimize_requirement(&normalized);
        let second = optimizer.optimize_requirement(&normalized);
        for (a, b) in first.iter().zip(&second) {
            prop_assert_eq!(&a.winner, &b.winner);
        }
    }

    #[test]
    fn prop_final_front_is_non_dominated(model in model_strategy()) {
        let normalized = normalize_priorities(&model).model;
        let optimizer = PriorityOptimizer::default();
        for result in optimizer.optimize_requirement(&normalized) {
            for a in &result.final_front {
                for b in &result.final_front {
                    prop_assert!(!dominates(&a.objectives.as_array(), &b.objectives.as_array()));
                }
            }
        }
    }

    #[test]
    fn prop_winner_covers_every_item(model in model_strategy()) {
        let normalized = normalize_priorities(&model).model;
        for result in PriorityOptimizer::default().optimize_requirement(&normalized) {
            let mut priorities: Vec<u32> = result.winner.iter().map(|p| p.priority).collect();
            priorities.sort_unstable();
            let expected: Vec<u32> = (1..=normalized.info_items.len() as u32).collect();
            prop_assert_eq!(priorities, expected);
        }
    }
}

#[test]
fn alert_item_with_baseline_priority_five_is_promoted() {
    let model = RequirementModel {
        info_items: vec![
            InfoItem::new("flow", "Flow", DataType::Trend),
            InfoItem::new("pressure", "Pressure", DataType::Numeric),
            InfoItem::new("valves", "Valve states", DataType::State),
            InfoItem::new("log", "Event log", DataType::List),
            InfoItem::new("leak", "Leak detection", DataType::Alert).with_tags(["alert"]),
        ],
        pages: vec![Page::new("pumping", "Pumping station").with_priorities(vec![
            InfoPriority::new("flow", 1),
            InfoPriority::new("pressure", 2),
            InfoPriority::new("valves", 3),
            InfoPriority::new("log", 4),
            InfoPriority::new("leak", 5),
        ])],
        ..RequirementModel::default()
    };

    let result = PriorityOptimizer::default().optimize_page(&model, &model.pages[0]);
    let leak = result.winner.iter().find(|p| p.info_item_id == "leak").unwrap();
    assert!(leak.priority <= 2, "alert ranked {}", leak.priority);

    for candidate in &result.final_front {
        let rank = candidate.order.iter().position(|id| id == "leak").unwrap() + 1;
        assert!(rank <= 2 || !candidate.semantic.risks.is_empty());
    }
}

#[test]
fn pages_optimize_independently_of_order() {
    let item = |id: &str, t| InfoItem::new(id, id, t);
    let page = |id: &str| {
        Page::new(id, id).with_priorities(vec![
            InfoPriority::new("a", 1),
            InfoPriority::new("b", 2),
            InfoPriority::new("c", 3),
        ])
    };
    let forward = RequirementModel {
        info_items: vec![
            item("a", DataType::Text),
            item("b", DataType::Map),
            item("c", DataType::Alert),
        ],
        pages: vec![page("x"), page("y")],
        ..RequirementModel::default()
    };
    let mut reversed = forward.clone();
    reversed.pages.reverse();

    let optimizer = PriorityOptimizer::default();
    let f = optimizer.optimize_requirement(&forward);
    let r = optimizer.optimize_requirement(&reversed);
    assert_eq!(f[0].winner, r[1].winner);
    assert_eq!(f[1].winner, r[0].winner);
}
