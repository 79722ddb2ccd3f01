//! Stage 2: model arbitration over Stage 1 shortlists

use crate::scoring::{rank_components, ScoredCandidate};
use crate::weights::RetrievalWeights;
use panel_llm::{request_json, LlmError, ModelCapability};
use panel_model::{ComponentLibrary, InfoItem, RequirementModel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

const ARBITER_SYSTEM_PROMPT: &str = "You bind dashboard information items to UI components. \
For every item choose exactly one componentId from its candidate list. \
Answer with JSON only: {\"bindings\": [{\"infoItemId\": \"...\", \"componentId\": \"...\", \"reason\": \"...\"}]}";

/// Where a binding decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingSource {
    /// Model arbitration picked it
    Arbiter,
    /// Stage 1 leader (fallback)
    Heuristic,
    /// Library was empty
    Unbound,
}

/// Final binding of one info item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub info_item_id: String,
    /// Empty only when the library is empty
    pub component_id: String,
    pub justification: String,
    pub source: BindingSource,
    /// Stage 1 shortlist
    pub candidates: Vec<ScoredCandidate>,
}

/// Bindings for a whole requirement model
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalOutcome {
    pub bindings: Vec<Binding>,
    /// True when the model's answer was used for at least one item
    pub used_llm: bool,
    /// Why arbitration degraded, if it did
    pub warning: Option<String>,
}

impl RetrievalOutcome {
    /// Binding for an info item
    #[must_use]
    pub fn binding(&self, info_item_id: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.info_item_id == info_item_id)
    }

    /// Map of info item id to bound component id (unbound items omitted)
    #[must_use]
    pub fn component_map(&self) -> HashMap<String, String> {
        self.bindings
            .iter()
            .filter(|b| !b.component_id.is_empty())
            .map(|b| (b.info_item_id.clone(), b.component_id.clone()))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ArbiterAnswer {
    #[serde(default)]
    bindings: Vec<ArbiterPick>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArbiterPick {
    info_item_id: String,
    component_id: String,
    #[serde(default)]
    reason: String,
}

/// Two-stage retriever
#[derive(Debug, Clone, Default)]
pub struct TwoStageRetriever {
    weights: RetrievalWeights,
}

impl TwoStageRetriever {
    /// Create retriever; `top_k` is raised to at least one candidate
    #[inline]
    #[must_use]
    pub fn new(mut weights: RetrievalWeights) -> Self {
        weights.top_k = weights.top_k.max(1);
        Self { weights }
    }

    /// Get weights
    #[inline]
    #[must_use]
    pub fn weights(&self) -> &RetrievalWeights {
        &self.weights
    }

    /// Stage 1 top-k for one item
    #[must_use]
    pub fn shortlist(
        &self,
        item: &InfoItem,
        library: &ComponentLibrary,
        priority: Option<u32>,
    ) -> Vec<ScoredCandidate> {
        let mut ranked = rank_components(item, library, priority, &self.weights);
        ranked.truncate(self.weights.top_k);
        ranked
    }

    /// Best Stage 1 candidate other than `exclude`
    #[must_use]
    pub fn next_best(
        &self,
        item: &InfoItem,
        library: &ComponentLibrary,
        priority: Option<u32>,
        exclude: Option<&str>,
    ) -> Option<ScoredCandidate> {
        rank_components(item, library, priority, &self.weights)
            .into_iter()
            .find(|c| Some(c.component_id.as_str()) != exclude)
    }

    /// Bind every info item of the model
    ///
    /// An item's priority is its best rank across pages. Never fails: model
    /// problems degrade to Stage 1 leaders and are reported in `warning`.
    pub async fn retrieve(
        &self,
        model: Option<&dyn ModelCapability>,
        requirement: &RequirementModel,
        library: &ComponentLibrary,
    ) -> RetrievalOutcome {
        let shortlists: Vec<(&InfoItem, Vec<ScoredCandidate>)> = requirement
            .info_items
            .iter()
            .map(|item| {
                let priority = best_priority(requirement, &item.id);
                (item, self.shortlist(item, library, priority))
            })
            .collect();

        if library.is_empty() {
            tracing::warn!("component library is empty; items left unbound");
            return RetrievalOutcome {
                bindings: shortlists
                    .into_iter()
                    .map(|(item, candidates)| Binding {
                        info_item_id: item.id.clone(),
                        component_id: String::new(),
                        justification: "component library is empty".to_string(),
                        source: BindingSource::Unbound,
                        candidates,
                    })
                    .collect(),
                used_llm: false,
                warning: Some("component library is empty".to_string()),
            };
        }

        let (picks, warning) = match model {
            Some(model) => match self.arbitrate(model, &shortlists).await {
                Ok(picks) => (picks, None),
                Err(reason) => {
                    tracing::warn!(%reason, "arbitration failed; using stage-1 leaders");
                    (HashMap::new(), Some(format!("arbitration failed: {reason}")))
                }
            },
            None => (
                HashMap::new(),
                Some("no model capability; using stage-1 leaders".to_string()),
            ),
        };

        let mut used_llm = false;
        let bindings = shortlists
            .into_iter()
            .map(|(item, candidates)| {
                let accepted = picks
                    .get(&item.id)
                    .filter(|(id, _)| candidates.iter().any(|c| &c.component_id == id));
                match accepted {
                    Some((component_id, reason)) => {
                        used_llm = true;
                        Binding {
                            info_item_id: item.id.clone(),
                            component_id: component_id.clone(),
                            justification: reason.clone(),
                            source: BindingSource::Arbiter,
                            candidates,
                        }
                    }
                    None => heuristic_binding(item, candidates),
                }
            })
            .collect();

        RetrievalOutcome {
            bindings,
            used_llm,
            warning,
        }
    }

    async fn arbitrate(
        &self,
        model: &dyn ModelCapability,
        shortlists: &[(&InfoItem, Vec<ScoredCandidate>)],
    ) -> Result<HashMap<String, (String, String)>, LlmError> {
        let items: Vec<_> = shortlists
            .iter()
            .map(|(item, candidates)| {
                json!({
                    "infoItemId": item.id,
                    "name": item.name,
                    "dataType": item.data_type,
                    "candidates": candidates,
                })
            })
            .collect();
        let user_prompt = json!({ "items": items }).to_string();

        let answer: ArbiterAnswer = request_json(model, ARBITER_SYSTEM_PROMPT, &user_prompt).await?;
        Ok(answer
            .bindings
            .into_iter()
            .map(|p| {
                let reason = if p.reason.is_empty() {
                    "chosen by arbiter".to_string()
                } else {
                    p.reason
                };
                (p.info_item_id, (p.component_id, reason))
            })
            .collect())
    }
}

fn heuristic_binding(item: &InfoItem, candidates: Vec<ScoredCandidate>) -> Binding {
    let (component_id, justification) = match candidates.first() {
        Some(top) => (
            top.component_id.clone(),
            format!("stage-1 top score {:.2}: {}", top.score, top.reasons.join(", ")),
        ),
        None => (String::new(), "no candidates".to_string()),
    };
    Binding {
        info_item_id: item.id.clone(),
        component_id,
        justification,
        source: BindingSource::Heuristic,
        candidates,
    }
}

fn best_priority(requirement: &RequirementModel, info_item_id: &str) -> Option<u32> {
    requirement
        .pages
        .iter()
        .filter_map(|page| page.priority_of(info_item_id))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::{ComponentExample, DataType, InfoPriority, Page};

    fn library() -> ComponentLibrary {
        ComponentLibrary::new(vec![
            ComponentExample::new("gauge", "Gauge", vec![DataType::Numeric]),
            ComponentExample::new("card", "Card", vec![DataType::Numeric]),
            ComponentExample::new("map", "Map", vec![DataType::Map]),
        ])
    }

    #[test]
    fn shortlist_respects_top_k() {
        let weights = RetrievalWeights {
            top_k: 2,
            ..RetrievalWeights::default()
        };
        let retriever = TwoStageRetriever::new(weights);
        let item = InfoItem::new("t", "Throughput", DataType::Numeric);
        assert_eq!(retriever.shortlist(&item, &library(), None).len(), 2);
    }

    #[tokio::test]
    async fn zero_top_k_still_binds_every_item() {
        let weights = RetrievalWeights {
            top_k: 0,
            ..RetrievalWeights::default()
        };
        let retriever = TwoStageRetriever::new(weights);
        assert_eq!(retriever.weights().top_k, 1);

        let model = RequirementModel {
            info_items: vec![InfoItem::new("t", "Throughput", DataType::Numeric)],
            ..RequirementModel::default()
        };
        let outcome = retriever.retrieve(None, &model, &library()).await;
        let binding = outcome.binding("t").unwrap();
        assert!(!binding.component_id.is_empty());
        assert_eq!(binding.candidates.len(), 1);
    }

    #[test]
    fn next_best_skips_excluded_component() {
        let retriever = TwoStageRetriever::default();
        let item = InfoItem::new("t", "Throughput", DataType::Numeric);
        let top = retriever.next_best(&item, &library(), None, None).unwrap();
        let second = retriever
            .next_best(&item, &library(), None, Some(&top.component_id))
            .unwrap();
        assert_ne!(top.component_id, second.component_id);
        assert!(library().get(&second.component_id).unwrap().supports(DataType::Numeric));
    }

    #[test]
    fn best_priority_takes_minimum_across_pages() {
        let model = RequirementModel {
            pages: vec![
                Page::new("p1", "One").with_priorities(vec![InfoPriority::new("t", 4)]),
                Page::new("p2", "Two").with_priorities(vec![InfoPriority::new("t", 2)]),
                Page::new("p3", "Three"),
            ],
            ..RequirementModel::default()
        };
        assert_eq!(best_priority(&model, "t"), Some(2));
        assert_eq!(best_priority(&model, "missing"), None);
    }
}
