//! Priority normalization
//!
//! After normalization every page's `info_priorities` covers every info item
//! exactly once and the priorities form the dense sequence 1..N.

use crate::semantics::ItemProfile;
use panel_model::{InfoPriority, Page, RequirementModel};
use std::collections::HashSet;

/// Normalized model plus the pages whose ranking was synthesized wholesale
#[derive(Debug, Clone)]
pub struct NormalizedRequirement {
    pub model: RequirementModel,
    /// Pages that had no priorities and adopted the default ranking
    pub auto_filled: Vec<String>,
}

/// Deterministic default ranking over all info items
///
/// Alert/safety items first, then KPI-like items, contextual text last; ties
/// break by name, then id.
#[must_use]
pub fn default_ranking(model: &RequirementModel) -> Vec<String> {
    let mut profiles: Vec<ItemProfile> = model.info_items.iter().map(ItemProfile::of).collect();
    profiles.sort_by(|a, b| {
        b.semantic_score()
            .cmp(&a.semantic_score())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    profiles.into_iter().map(|p| p.id).collect()
}

/// Normalize every page of the model
#[must_use]
pub fn normalize_priorities(model: &RequirementModel) -> NormalizedRequirement {
    let defaults = default_ranking(model);
    let known: HashSet<&str> = model.info_items.iter().map(|i| i.id.as_str()).collect();
    let mut normalized = model.clone();
    let mut auto_filled = Vec::new();

    for page in &mut normalized.pages {
        if normalize_page(page, &defaults, &known) {
            auto_filled.push(page.id.clone());
        }
    }

    if !auto_filled.is_empty() {
        tracing::info!(pages = ?auto_filled, "auto-filled page priorities");
    }

    NormalizedRequirement {
        model: normalized,
        auto_filled,
    }
}

/// Returns true when the page had no usable priorities
fn normalize_page(page: &mut Page, defaults: &[String], known: &HashSet<&str>) -> bool {
    let mut explicit: Vec<(usize, &InfoPriority)> = page
        .info_priorities
        .iter()
        .enumerate()
        .filter(|(_, p)| known.contains(p.info_item_id.as_str()))
        .collect();
    explicit.sort_by_key(|(idx, p)| (p.priority, *idx));

    let mut seen = HashSet::new();
    let mut ordered: Vec<InfoPriority> = Vec::with_capacity(defaults.len());
    for (_, entry) in explicit {
        if seen.insert(entry.info_item_id.clone()) {
            ordered.push(entry.clone());
        }
    }

    let auto_filled = ordered.is_empty();
    for id in defaults {
        if seen.insert(id.clone()) {
            let mut entry = InfoPriority::new(id.clone(), 0);
            if !auto_filled {
                entry.note = Some("appended by default ranking".to_string());
            }
            ordered.push(entry);
        }
    }

    for (idx, entry) in ordered.iter_mut().enumerate() {
        entry.priority = u32::try_from(idx + 1).unwrap_or(u32::MAX);
    }
    page.info_priorities = ordered;
    auto_filled
}
