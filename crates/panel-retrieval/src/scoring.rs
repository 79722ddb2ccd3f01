//! Stage 1: heuristic pair scoring

use crate::weights::RetrievalWeights;
use panel_model::{ComponentExample, ComponentLibrary, DataType, DensityProfile, InfoItem, PriorityAffinity};
use serde::Serialize;

/// A component scored for one info item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub component_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
}

fn density_suits(data_type: DataType, profile: DensityProfile) -> bool {
    match data_type {
        DataType::List | DataType::Map | DataType::Trend => profile == DensityProfile::High,
        DataType::Text => profile != DensityProfile::Low,
        DataType::Numeric | DataType::State | DataType::Alert => profile != DensityProfile::High,
    }
}

fn priority_band(priority: u32) -> PriorityAffinity {
    match priority {
        0..=3 => PriorityAffinity::High,
        4..=6 => PriorityAffinity::Medium,
        _ => PriorityAffinity::Low,
    }
}

/// Score one (item, component) pair
///
/// `priority` is the item's page rank when known; without it the
/// priority-affinity term is skipped.
#[must_use]
pub fn score_pair(
    item: &InfoItem,
    component: &ComponentExample,
    priority: Option<u32>,
    weights: &RetrievalWeights,
) -> ScoredCandidate {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    if component.supports(item.data_type) {
        score += weights.data_type_match;
        reasons.push("data type match".to_string());
    }

    let vocabulary = component.vocabulary();
    let overlap = item
        .tags
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| vocabulary.contains(t))
        .count()
        .min(weights.tag_overlap_cap);
    if overlap > 0 {
        score += weights.tag_overlap_unit * overlap as f64;
        reasons.push(format!("{overlap} semantic tag overlap"));
    }

    if density_suits(item.data_type, component.meta.info_density_profile) {
        score += weights.density_bonus;
        reasons.push("density profile fits".to_string());
    }

    if let Some(priority) = priority {
        if priority_band(priority) == component.meta.priority_affinity {
            score += weights.priority_affinity_bonus;
            reasons.push("priority affinity".to_string());
        }
    }

    if item.data_type == DataType::Alert && component.meta.criticality_support {
        score += weights.criticality_bonus;
        reasons.push("supports critical states".to_string());
    }

    let ergonomics = component.ergonomics();
    score += (1.0 - ergonomics.v_vis) * weights.low_visual_weight
        + (1.0 - ergonomics.v_int) * weights.low_interaction_weight
        + ergonomics.cap * weights.capacity_weight;
    if ergonomics.v_vis < weights.low_visual_threshold {
        reasons.push("low visual complexity".to_string());
    }
    if ergonomics.v_int < weights.low_interaction_threshold {
        reasons.push("low interaction load".to_string());
    }
    if ergonomics.cap > weights.high_capacity_threshold {
        reasons.push("high information capacity".to_string());
    }

    ScoredCandidate {
        component_id: component.id.clone(),
        score,
        reasons,
    }
}

/// Every component ranked for the item, best first (ties keep library order)
#[must_use]
pub fn rank_components(
    item: &InfoItem,
    library: &ComponentLibrary,
    priority: Option<u32>,
    weights: &RetrievalWeights,
) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<ScoredCandidate> = library
        .components()
        .iter()
        .map(|component| score_pair(item, component, priority, weights))
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::{ComponentMeta, Ergonomics};

    fn flat(component: ComponentExample) -> ComponentExample {
        let mut component = component;
        component.ergonomics = Some(Ergonomics {
            v_vis: 0.5,
            v_int: 0.5,
            cap: 0.5,
        });
        component
    }

    #[test]
    fn data_type_match_dominates() {
        let item = InfoItem::new("alarm", "Alarm feed", DataType::Alert);
        let weights = RetrievalWeights::default();
        let matching = flat(ComponentExample::new("list", "Alarm list", vec![DataType::Alert]));
        let other = flat(ComponentExample::new("map", "Map", vec![DataType::Map]));
        let a = score_pair(&item, &matching, None, &weights);
        let b = score_pair(&item, &other, None, &weights);
        assert!(a.score > b.score);
        assert!(a.reasons.contains(&"data type match".to_string()));
    }

    #[test]
    fn tag_overlap_is_capped() {
        let item = InfoItem::new("k", "KPI", DataType::Numeric)
            .with_tags(["kpi", "energy", "plant", "shift"]);
        let component = flat(
            ComponentExample::new("c", "kpi energy plant shift card", vec![]).with_meta(
                ComponentMeta {
                    info_density_profile: DensityProfile::High,
                    ..ComponentMeta::default()
                },
            ),
        );
        let weights = RetrievalWeights::default();
        let scored = score_pair(&item, &component, None, &weights);
        // capped overlap 3 * 0.8, no density fit, ergonomics 0.4 + 0.25 + 0.35
        assert!((scored.score - (2.4 + 1.0)).abs() < 1e-9);
        assert!(scored.reasons.contains(&"3 semantic tag overlap".to_string()));
    }

    #[test]
    fn priority_affinity_needs_known_priority() {
        let item = InfoItem::new("t", "Temperature", DataType::Numeric);
        let component = flat(ComponentExample::new("g", "Gauge", vec![DataType::Numeric]).with_meta(
            ComponentMeta {
                priority_affinity: PriorityAffinity::High,
                ..ComponentMeta::default()
            },
        ));
        let weights = RetrievalWeights::default();
        let with = score_pair(&item, &component, Some(1), &weights);
        let without = score_pair(&item, &component, None, &weights);
        assert!((with.score - without.score - weights.priority_affinity_bonus).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let item = InfoItem::new("t", "Temperature", DataType::Numeric);
        let library = ComponentLibrary::new(vec![
            flat(ComponentExample::new("first", "A", vec![DataType::Numeric])),
            flat(ComponentExample::new("second", "B", vec![DataType::Numeric])),
        ]);
        let ranked = rank_components(&item, &library, None, &RetrievalWeights::default());
        assert_eq!(ranked[0].component_id, "first");
        assert_eq!(ranked[1].component_id, "second");
    }
}
