//! Objective functions for priority candidates
//!
//! All five objectives are minimized and divided by the item count so pages
//! of different sizes score on comparable scales.

use crate::config::OptimizerConfig;
use crate::semantics::ItemProfile;
use serde::Serialize;
use std::collections::HashMap;

/// Objective names in vector order
pub const OBJECTIVE_NAMES: [&str; 5] = [
    "density",
    "overload",
    "semanticRisk",
    "instability",
    "readabilityRisk",
];

/// Scores of one candidate (lower is better everywhere)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveVector {
    pub density: f64,
    pub overload: f64,
    pub semantic_risk: f64,
    pub instability: f64,
    pub readability_risk: f64,
}

impl ObjectiveVector {
    /// Values in [`OBJECTIVE_NAMES`] order
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.density,
            self.overload,
            self.semantic_risk,
            self.instability,
            self.readability_risk,
        ]
    }
}

/// Semantic risk with its explanation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticAssessment {
    /// Normalized risk score
    pub score: f64,
    /// Items that must stay near the top
    pub must_keep: Vec<String>,
    /// Human-readable risk findings
    pub risks: Vec<String>,
    /// Alert items ranked below the alert limit
    pub violations: usize,
}

/// Scores candidates of one page against its baseline
#[derive(Debug)]
pub(crate) struct ObjectiveScorer<'a> {
    config: &'a OptimizerConfig,
    profiles: HashMap<String, ItemProfile>,
    baseline_rank: HashMap<String, usize>,
}

impl<'a> ObjectiveScorer<'a> {
    pub(crate) fn new(
        config: &'a OptimizerConfig,
        profiles: HashMap<String, ItemProfile>,
        baseline: &[String],
    ) -> Self {
        let baseline_rank = baseline
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx + 1))
            .collect();
        Self {
            config,
            profiles,
            baseline_rank,
        }
    }

    pub(crate) fn profile(&self, id: &str) -> Option<&ItemProfile> {
        self.profiles.get(id)
    }

    /// Score an ordering (item ids, most important first)
    pub(crate) fn score(&self, order: &[String]) -> (ObjectiveVector, SemanticAssessment) {
        let n = order.len();
        if n == 0 {
            return (ObjectiveVector::default(), SemanticAssessment::default());
        }
        let n_f = n as f64;

        let mut weighted_rank = 0.0;
        let mut weight_total = 0.0;
        let mut overload = 0.0;
        let mut readability = 0.0;
        let mut displacement = 0.0;

        for (idx, id) in order.iter().enumerate() {
            let rank = idx + 1;
            let Some(profile) = self.profiles.get(id) else {
                continue;
            };

            weighted_rank += profile.importance() * rank as f64;
            weight_total += profile.importance();

            if rank <= self.config.top_band {
                overload += profile.display_load() * self.config.top_band_weight;
                readability += profile.reading_load() * self.config.top_band_weight;
            } else {
                if rank <= self.config.overload_band {
                    overload += profile.display_load() * self.config.second_band_weight;
                }
                if rank <= self.config.readability_band {
                    readability += profile.reading_load() * self.config.second_band_weight;
                }
            }

            let base = self.baseline_rank.get(id).copied().unwrap_or(rank);
            displacement += rank.abs_diff(base) as f64;
        }

        let semantic = self.assess(order);
        let density = if weight_total > 0.0 {
            weighted_rank / weight_total / n_f
        } else {
            0.0
        };

        let objectives = ObjectiveVector {
            density,
            overload: overload / n_f,
            semantic_risk: semantic.score,
            instability: displacement / n_f / n_f,
            readability_risk: readability / n_f,
        };
        (objectives, semantic)
    }

    fn assess(&self, order: &[String]) -> SemanticAssessment {
        let mut raw = 0.0;
        let mut must_keep = Vec::new();
        let mut risks = Vec::new();
        let mut violations = 0;

        for (idx, id) in order.iter().enumerate() {
            let rank = idx + 1;
            let Some(profile) = self.profiles.get(id) else {
                continue;
            };

            if profile.alert {
                must_keep.push(id.clone());
                if rank > self.config.alert_rank_limit {
                    let gap = rank - self.config.alert_rank_limit;
                    raw += self.config.alert_penalty * gap as f64;
                    violations += 1;
                    risks.push(format!(
                        "safety item '{}' demoted to rank {rank} (limit {})",
                        profile.name, self.config.alert_rank_limit
                    ));
                }
            } else if profile.kpi {
                must_keep.push(id.clone());
                if rank > self.config.kpi_rank_limit {
                    let gap = rank - self.config.kpi_rank_limit;
                    raw += self.config.kpi_penalty * gap as f64;
                    risks.push(format!(
                        "KPI item '{}' demoted to rank {rank} (limit {})",
                        profile.name, self.config.kpi_rank_limit
                    ));
                }
            }

            if let Some(base) = self.baseline_rank.get(id) {
                let shift = rank.abs_diff(*base);
                if shift >= self.config.shift_threshold {
                    raw += self.config.shift_penalty;
                    risks.push(format!(
                        "'{}' moved {shift} ranks from baseline {base} to {rank}",
                        profile.name
                    ));
                }
            }
        }

        SemanticAssessment {
            score: raw / order.len() as f64,
            must_keep,
            risks,
            violations,
        }
    }
}
