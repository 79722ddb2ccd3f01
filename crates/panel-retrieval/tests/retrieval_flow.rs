//! End-to-end two-stage retrieval against the shared fixtures

use panel_model::{ComponentLibrary, DataType, InfoItem, RequirementModel};
use panel_retrieval::{BindingSource, RetrievalWeights, TwoStageRetriever};
use panel_test_utils::{sample_library, sample_requirement, FailingModel, ScriptedModel};
use pretty_assertions::assert_eq;

fn retriever() -> TwoStageRetriever {
    TwoStageRetriever::new(RetrievalWeights::default())
}

#[tokio::test]
async fn empty_library_leaves_every_item_unbound() {
    let requirement = RequirementModel {
        info_items: vec![
            InfoItem::new("a", "Alarm", DataType::Alert),
            InfoItem::new("b", "Output", DataType::Numeric),
            InfoItem::new("c", "Notes", DataType::Text),
        ],
        ..RequirementModel::default()
    };

    let outcome = retriever()
        .retrieve(None, &requirement, &ComponentLibrary::default())
        .await;

    assert_eq!(outcome.bindings.len(), 3);
    for binding in &outcome.bindings {
        assert_eq!(binding.component_id, "");
        assert!(binding.candidates.is_empty());
        assert_eq!(binding.source, BindingSource::Unbound);
    }
    assert!(!outcome.used_llm);
    assert!(outcome.component_map().is_empty());
}

#[tokio::test]
async fn without_model_every_item_gets_stage_one_leader() {
    let requirement = sample_requirement();
    let library = sample_library();

    let outcome = retriever().retrieve(None, &requirement, &library).await;

    assert_eq!(outcome.bindings.len(), requirement.info_items.len());
    for binding in &outcome.bindings {
        assert!(!binding.component_id.is_empty());
        assert_eq!(binding.source, BindingSource::Heuristic);
        assert_eq!(binding.component_id, binding.candidates[0].component_id);
        assert!(binding.candidates.len() <= RetrievalWeights::default().top_k);
    }
    assert!(outcome.warning.is_some());
    assert!(!outcome.used_llm);
}

#[tokio::test]
async fn arbiter_pick_from_shortlist_is_accepted() {
    let requirement = sample_requirement();
    let library = sample_library();
    let model = ScriptedModel::new([r#"Sure! {"bindings": [
        {"infoItemId": "alarm", "componentId": "status-lamp", "reason": "compact indicator"}
    ]}"#]);

    let outcome = retriever()
        .retrieve(Some(&model), &requirement, &library)
        .await;

    let alarm = outcome.binding("alarm").unwrap();
    assert_eq!(alarm.component_id, "status-lamp");
    assert_eq!(alarm.source, BindingSource::Arbiter);
    assert_eq!(alarm.justification, "compact indicator");
    assert!(outcome.used_llm);
    assert!(outcome.warning.is_none());

    // items the model skipped fall back individually
    let notes = outcome.binding("shift-notes").unwrap();
    assert_eq!(notes.source, BindingSource::Heuristic);

    assert_eq!(model.call_count(), 1);
    let (_, user_prompt) = &model.prompts()[0];
    assert!(user_prompt.contains("\"infoItemId\":\"alarm\""));
}

#[tokio::test]
async fn off_list_pick_falls_back_to_leader() {
    let requirement = sample_requirement();
    let library = sample_library();
    let model = ScriptedModel::new([
        r#"{"bindings": [{"infoItemId": "alarm", "componentId": "ghost-widget"}]}"#,
    ]);

    let outcome = retriever()
        .retrieve(Some(&model), &requirement, &library)
        .await;

    let alarm = outcome.binding("alarm").unwrap();
    assert_eq!(alarm.source, BindingSource::Heuristic);
    assert_ne!(alarm.component_id, "ghost-widget");
    assert!(library.get(&alarm.component_id).is_some());
    assert!(!outcome.used_llm);
}

#[tokio::test]
async fn unreadable_answer_degrades_with_warning() {
    let requirement = sample_requirement();
    let library = sample_library();
    let model = ScriptedModel::new(["I would rather not answer in JSON."]);

    let outcome = retriever()
        .retrieve(Some(&model), &requirement, &library)
        .await;

    assert!(outcome
        .warning
        .as_deref()
        .is_some_and(|w| w.starts_with("arbitration failed")));
    assert!(outcome
        .bindings
        .iter()
        .all(|b| b.source == BindingSource::Heuristic && !b.component_id.is_empty()));
}

#[tokio::test]
async fn transport_failure_degrades_with_warning() {
    let requirement = sample_requirement();
    let library = sample_library();
    let model = FailingModel::timeout();

    let outcome = retriever()
        .retrieve(Some(&model), &requirement, &library)
        .await;

    assert!(outcome.warning.as_deref().is_some_and(|w| w.contains("timed out")));
    assert_eq!(outcome.component_map().len(), requirement.info_items.len());
}
