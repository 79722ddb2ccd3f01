//! Priority-balance optimizer
//!
//! A bounded NSGA-II-style search over one page's ranking:
//! 1. Seed a population with the baseline and swap-mutated variants
//! 2. Each generation, mutate survivors, score the union on five objectives,
//!    sort into constrained Pareto fronts and keep the best by front, then
//!    crowding distance
//! 3. After the last generation, pick the winner from the best front by
//!    crowding, then semantic risk, overload, readability, instability, density
//!
//! The RNG is seeded from the page id, so identical input yields an
//! identical winner. Pages never fail: degenerate input returns the baseline.

use crate::config::OptimizerConfig;
use crate::objectives::{ObjectiveScorer, ObjectiveVector, SemanticAssessment, OBJECTIVE_NAMES};
use crate::pareto::{crowding_distance, sort_fronts};
use crate::semantics::ItemProfile;
use panel_model::{InfoPriority, Page, RequirementModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

const EPSILON: f64 = 1e-9;

/// One evaluated ordering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Info item ids, most important first
    pub order: Vec<String>,
    pub objectives: ObjectiveVector,
    pub semantic: SemanticAssessment,
    /// Pareto front index (0 = best)
    pub rank: usize,
    /// Crowding distance within its front
    pub crowding: f64,
}

/// Audit record of one generation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub generation: usize,
    /// Candidates scored this round (survivors plus offspring)
    pub evaluated: Vec<Candidate>,
    /// Size of each front, best first
    pub front_sizes: Vec<usize>,
    /// Survivors carried into the next round
    pub survivors: usize,
}

/// Result of optimizing one page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptimization {
    pub page_id: String,
    pub seed: u64,
    pub baseline: Vec<InfoPriority>,
    pub winner: Vec<InfoPriority>,
    pub winner_objectives: Option<ObjectiveVector>,
    pub winner_semantic: Option<SemanticAssessment>,
    pub final_front: Vec<Candidate>,
    pub history: Vec<GenerationRecord>,
    pub rationale: String,
    /// True when the page skipped the search
    pub bypassed: bool,
}

impl PageOptimization {
    fn bypass(page: &Page, seed: u64, reason: &str) -> Self {
        Self {
            page_id: page.id.clone(),
            seed,
            baseline: page.info_priorities.clone(),
            winner: page.info_priorities.clone(),
            winner_objectives: None,
            winner_semantic: None,
            final_front: Vec::new(),
            history: Vec::new(),
            rationale: reason.to_string(),
            bypassed: true,
        }
    }

    /// Number of candidates scored across all generations
    #[must_use]
    pub fn evaluated_count(&self) -> usize {
        self.history.iter().map(|g| g.evaluated.len()).sum()
    }
}

/// NSGA-II-lite optimizer for page priorities
#[derive(Debug, Clone, Default)]
pub struct PriorityOptimizer {
    config: OptimizerConfig,
}

impl PriorityOptimizer {
    /// Create optimizer
    #[inline]
    #[must_use]
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Deterministic seed derived from page identity
    #[must_use]
    pub fn seed_for(page_id: &str) -> u64 {
        let hash = blake3::hash(page_id.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Optimize every page; pages run in parallel, results keep page order
    #[must_use]
    pub fn optimize_requirement(&self, model: &RequirementModel) -> Vec<PageOptimization> {
        model
            .pages
            .par_iter()
            .map(|page| self.optimize_page(model, page))
            .collect()
    }

    /// Optimize one page's (normalized) priority list
    #[must_use]
    pub fn optimize_page(&self, model: &RequirementModel, page: &Page) -> PageOptimization {
        let seed = Self::seed_for(&page.id);
        let profiles: HashMap<String, ItemProfile> = model
            .info_items
            .iter()
            .map(|item| (item.id.clone(), ItemProfile::of(item)))
            .collect();
        let baseline: Vec<String> = page
            .ordered_item_ids()
            .into_iter()
            .filter(|id| profiles.contains_key(id))
            .collect();

        if baseline.len() <= 1 {
            return PageOptimization::bypass(page, seed, "fewer than two ranked items; baseline kept");
        }

        let scorer = ObjectiveScorer::new(&self.config, profiles, &baseline);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut population = vec![baseline.clone()];
        let mut seen: HashSet<Vec<String>> = population.iter().cloned().collect();
        let attempts = self.config.population_size * 4;
        for _ in 0..attempts {
            if population.len() >= self.config.population_size {
                break;
            }
            let child = self.offspring(&baseline, &scorer, &mut rng);
            if seen.insert(child.clone()) {
                population.push(child);
            }
        }

        let mut history = Vec::with_capacity(self.config.generations);
        let mut all_evaluated: Vec<Candidate> = Vec::new();
        let mut survivors: Vec<Candidate> = Vec::new();

        for generation in 0..self.config.generations.max(1) {
            let mut pool = population.clone();
            let mut pool_seen: HashSet<Vec<String>> = pool.iter().cloned().collect();
            for parent in &population {
                let child = self.offspring(parent, &scorer, &mut rng);
                if pool_seen.insert(child.clone()) {
                    pool.push(child);
                }
            }

            let mut evaluated: Vec<Candidate> = pool
                .into_iter()
                .map(|order| {
                    let (objectives, semantic) = scorer.score(&order);
                    Candidate {
                        order,
                        objectives,
                        semantic,
                        rank: 0,
                        crowding: 0.0,
                    }
                })
                .collect();

            let fronts = rank_candidates(&mut evaluated);
            survivors = select_survivors(&evaluated, &fronts, self.config.population_size);
            population = survivors.iter().map(|c| c.order.clone()).collect();

            tracing::debug!(
                page_id = %page.id,
                generation,
                evaluated = evaluated.len(),
                fronts = fronts.len(),
                "generation complete"
            );

            for candidate in &evaluated {
                if !all_evaluated.iter().any(|c| c.order == candidate.order) {
                    all_evaluated.push(candidate.clone());
                }
            }
            history.push(GenerationRecord {
                generation,
                front_sizes: fronts.iter().map(Vec::len).collect(),
                survivors: survivors.len(),
                evaluated,
            });
        }

        let mut final_front: Vec<Candidate> =
            survivors.into_iter().filter(|c| c.rank == 0).collect();
        final_front.sort_by(prefer);

        let Some(winner) = final_front.first().cloned() else {
            return PageOptimization::bypass(page, seed, "empty candidate population; baseline kept");
        };

        let rationale = rationale(&winner, &all_evaluated, history.len());
        tracing::info!(page_id = %page.id, %rationale, "priority winner selected");

        PageOptimization {
            page_id: page.id.clone(),
            seed,
            baseline: page.info_priorities.clone(),
            winner: to_priorities(&winner.order, page),
            winner_objectives: Some(winner.objectives),
            winner_semantic: Some(winner.semantic.clone()),
            final_front,
            history,
            rationale,
            bypassed: false,
        }
    }

    /// Swap-mutate a parent, then lift alert items into the top slots
    fn offspring(&self, parent: &[String], scorer: &ObjectiveScorer<'_>, rng: &mut StdRng) -> Vec<String> {
        let mut child = parent.to_vec();
        let n = child.len();
        let max_swaps = self.config.max_swaps.min(n - 1).max(1);
        let swaps = rng.random_range(1..=max_swaps);
        for _ in 0..swaps {
            let i = rng.random_range(0..n);
            let mut j = rng.random_range(0..n - 1);
            if j >= i {
                j += 1;
            }
            child.swap(i, j);
        }
        self.promote_alerts(&mut child, scorer);
        child
    }

    fn promote_alerts(&self, order: &mut [String], scorer: &ObjectiveScorer<'_>) {
        let limit = self.config.alert_rank_limit.min(order.len());
        let is_alert = |id: &String| scorer.profile(id).is_some_and(|p| p.alert);
        for pos in limit..order.len() {
            if !is_alert(&order[pos]) {
                continue;
            }
            match (0..limit).find(|&slot| !is_alert(&order[slot])) {
                Some(slot) => order.swap(slot, pos),
                None => break,
            }
        }
    }
}

/// Assign front rank and crowding distance; returns the fronts
fn rank_candidates(candidates: &mut [Candidate]) -> Vec<Vec<usize>> {
    let objectives: Vec<[f64; 5]> = candidates.iter().map(|c| c.objectives.as_array()).collect();
    let violations: Vec<usize> = candidates.iter().map(|c| c.semantic.violations).collect();
    let fronts = sort_fronts(&objectives, &violations);
    for (rank, front) in fronts.iter().enumerate() {
        let distances = crowding_distance(&objectives, front);
        for (&idx, distance) in front.iter().zip(distances) {
            candidates[idx].rank = rank;
            candidates[idx].crowding = distance;
        }
    }
    fronts
}

/// Fill the next population front by front, truncating the last by crowding
fn select_survivors(candidates: &[Candidate], fronts: &[Vec<usize>], size: usize) -> Vec<Candidate> {
    let mut survivors = Vec::with_capacity(size);
    for front in fronts {
        if survivors.len() + front.len() <= size {
            survivors.extend(front.iter().map(|&i| candidates[i].clone()));
            continue;
        }
        let mut members: Vec<&Candidate> = front.iter().map(|&i| &candidates[i]).collect();
        members.sort_by(|a, b| b.crowding.total_cmp(&a.crowding));
        let remaining = size - survivors.len();
        survivors.extend(members.into_iter().take(remaining).cloned());
        break;
    }
    survivors
}

/// Winner preference; `sort_by` is stable so full ties keep first-encountered order
fn prefer(a: &Candidate, b: &Candidate) -> Ordering {
    b.crowding
        .total_cmp(&a.crowding)
        .then_with(|| a.objectives.semantic_risk.total_cmp(&b.objectives.semantic_risk))
        .then_with(|| a.objectives.overload.total_cmp(&b.objectives.overload))
        .then_with(|| {
            a.objectives
                .readability_risk
                .total_cmp(&b.objectives.readability_risk)
        })
        .then_with(|| a.objectives.instability.total_cmp(&b.objectives.instability))
        .then_with(|| a.objectives.density.total_cmp(&b.objectives.density))
}

fn rationale(winner: &Candidate, evaluated: &[Candidate], generations: usize) -> String {
    let values = winner.objectives.as_array();
    let best_on: Vec<&str> = OBJECTIVE_NAMES
        .iter()
        .enumerate()
        .filter(|(m, _)| {
            evaluated
                .iter()
                .all(|c| values[*m] <= c.objectives.as_array()[*m] + EPSILON)
        })
        .map(|(_, name)| *name)
        .collect();

    let head = format!(
        "selected from {} candidates over {generations} generations",
        evaluated.len()
    );
    let crowding = if winner.crowding.is_infinite() {
        "boundary of the Pareto front".to_string()
    } else {
        format!("crowding distance {:.3}", winner.crowding)
    };
    if best_on.is_empty() {
        format!("{head}; balanced trade-off with no single best objective; {crowding}")
    } else {
        format!("{head}; best on {}; {crowding}", best_on.join(", "))
    }
}

fn to_priorities(order: &[String], page: &Page) -> Vec<InfoPriority> {
    order
        .iter()
        .enumerate()
        .map(|(idx, id)| InfoPriority {
            info_item_id: id.clone(),
            priority: u32::try_from(idx + 1).unwrap_or(u32::MAX),
            note: page
                .info_priorities
                .iter()
                .find(|p| &p.info_item_id == id)
                .and_then(|p| p.note.clone()),
        })
        .collect()
}

/// Replace each page's priorities with its optimization winner
pub fn apply_winners(model: &mut RequirementModel, results: &[PageOptimization]) {
    for result in results {
        if let Some(page) = model.pages.iter_mut().find(|p| p.id == result.page_id) {
            page.info_priorities = result.winner.clone();
        }
    }
}
