//! Stage 1 scoring weights

use serde::{Deserialize, Serialize};

/// Weights and thresholds of the heuristic scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalWeights {
    /// Fixed bonus when the component supports the item's data type
    pub data_type_match: f64,
    /// Bonus per overlapping semantic tag
    pub tag_overlap_unit: f64,
    /// Overlapping tags counted at most
    pub tag_overlap_cap: usize,
    /// Bonus when the density profile suits the data type
    pub density_bonus: f64,
    /// Bonus when the priority affinity matches the item's priority band
    pub priority_affinity_bonus: f64,
    /// Bonus for criticality support on alert items
    pub criticality_bonus: f64,
    /// Weight of (1 - visual complexity)
    pub low_visual_weight: f64,
    /// Weight of (1 - interaction load)
    pub low_interaction_weight: f64,
    /// Weight of information capacity
    pub capacity_weight: f64,
    /// Below this visual complexity a reason is reported
    pub low_visual_threshold: f64,
    /// Below this interaction load a reason is reported
    pub low_interaction_threshold: f64,
    /// Above this capacity a reason is reported
    pub high_capacity_threshold: f64,
    /// Candidates kept per item
    pub top_k: usize,
}

impl Default for RetrievalWeights {
    fn default() -> Self {
        Self {
            data_type_match: 3.0,
            tag_overlap_unit: 0.8,
            tag_overlap_cap: 3,
            density_bonus: 0.6,
            priority_affinity_bonus: 1.0,
            criticality_bonus: 0.5,
            low_visual_weight: 0.8,
            low_interaction_weight: 0.5,
            capacity_weight: 0.7,
            low_visual_threshold: 0.35,
            low_interaction_threshold: 0.35,
            high_capacity_threshold: 0.6,
            top_k: 5,
        }
    }
}
