//! Plan quality metrics reported before and after repair

use crate::config::ReviewConfig;
use panel_model::{ComponentLibrary, LayoutPlan, RequirementModel};
use serde::Serialize;

/// Counts that repair is expected to drive down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Regions over the item limit
    pub crowded_regions: usize,
    /// Items with a missing or type-incompatible component
    pub binding_mismatches: usize,
    /// Items in excess of region limits, summed over regions
    pub overload: usize,
}

/// Signed change between two measurements (after minus before)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDelta {
    pub crowded_regions: i64,
    pub binding_mismatches: i64,
    pub overload: i64,
}

impl QualityMetrics {
    /// Measure a plan
    #[must_use]
    pub fn measure(
        plan: &LayoutPlan,
        requirement: &RequirementModel,
        library: &ComponentLibrary,
        config: &ReviewConfig,
    ) -> Self {
        let limit = config.max_items_per_region;
        let crowded_regions = plan.regions.iter().filter(|r| r.items.len() > limit).count();
        let overload = plan
            .regions
            .iter()
            .map(|r| r.items.len().saturating_sub(limit))
            .sum();
        let binding_mismatches = plan
            .placed_items()
            .filter(|(_, placed)| {
                let component = placed.component_id.as_deref().and_then(|id| library.get(id));
                match (component, requirement.info_item(&placed.info_item_id)) {
                    (None, _) => true,
                    (Some(component), Some(item)) => !component.supports(item.data_type),
                    (Some(_), None) => false,
                }
            })
            .count();
        Self {
            crowded_regions,
            binding_mismatches,
            overload,
        }
    }

    /// `after - self` per field
    #[must_use]
    pub fn delta(&self, after: &Self) -> MetricsDelta {
        let diff = |before: usize, after: usize| {
            i64::try_from(after).unwrap_or(i64::MAX) - i64::try_from(before).unwrap_or(i64::MAX)
        };
        MetricsDelta {
            crowded_regions: diff(self.crowded_regions, after.crowded_regions),
            binding_mismatches: diff(self.binding_mismatches, after.binding_mismatches),
            overload: diff(self.overload, after.overload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::{ComponentExample, DataType, InfoItem, PlacedItem, Region, RegionRole};

    #[test]
    fn measures_crowding_and_bindings() {
        let library = ComponentLibrary::new(vec![ComponentExample::new(
            "card",
            "Card",
            vec![DataType::Numeric],
        )]);
        let requirement = RequirementModel {
            info_items: vec![
                InfoItem::new("n", "N", DataType::Numeric),
                InfoItem::new("m", "M", DataType::Map),
            ],
            ..RequirementModel::default()
        };
        let mut main = Region::new("main", RegionRole::Main, (0.0, 0.0, 1.0, 1.0));
        main.items.push(PlacedItem::new("n", Some("card".to_string())));
        main.items.push(PlacedItem::new("m", Some("card".to_string())));
        main.items.push(PlacedItem::new("n", None));
        let plan = LayoutPlan {
            regions: vec![main],
            ..LayoutPlan::default()
        };
        let config = ReviewConfig {
            max_items_per_region: 2,
            ..ReviewConfig::default()
        };

        let metrics = QualityMetrics::measure(&plan, &requirement, &library, &config);
        assert_eq!(
            metrics,
            QualityMetrics {
                crowded_regions: 1,
                binding_mismatches: 2,
                overload: 1,
            }
        );
        let delta = metrics.delta(&QualityMetrics::default());
        assert_eq!(delta.binding_mismatches, -2);
    }
}
