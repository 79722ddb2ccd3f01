//! Testing utilities for the Panel workspace
//!
//! Shared fixtures (component library, requirement model, document text) and
//! scripted model doubles.

#![allow(missing_docs)]

use async_trait::async_trait;
use panel_llm::{LlmError, ModelCapability};
use panel_model::{
    ComponentExample, ComponentLibrary, ComponentMeta, DataType, DensityProfile, Facet, InfoItem,
    InfoPriority, LayerStats, Page, PriorityAffinity, RequirementModel, Slot, SlotKind,
    VisualFootprint,
};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Model double that replays canned responses in order
///
/// Once the script is exhausted every call returns `LlmError::Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push_error(&self, error: LlmError) {
        self.responses.lock().push_back(Err(error));
    }

    /// (system, user) prompt pairs received so far
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl ModelCapability for ScriptedModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Unavailable("script exhausted".to_string())))
    }
}

/// Model double that always fails with the same error
#[derive(Debug, Clone)]
pub struct FailingModel(pub LlmError);

impl FailingModel {
    pub fn timeout() -> Self {
        Self(LlmError::Timeout { duration_secs: 30 })
    }
}

#[async_trait]
impl ModelCapability for FailingModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        Err(self.0.clone())
    }
}

fn slots(entries: &[(&str, SlotKind)]) -> Vec<Slot> {
    entries.iter().map(|(name, kind)| Slot::new(*name, *kind)).collect()
}

fn stats(layers: u32, text: u32, colors: u32, interactive: u32, depth: u32) -> LayerStats {
    LayerStats {
        layer_count: layers,
        text_layer_count: text,
        color_count: colors,
        interactive_layer_count: interactive,
        depth,
    }
}

/// Six-component monitoring library
pub fn sample_library() -> ComponentLibrary {
    ComponentLibrary::new(vec![
        ComponentExample::new("kpi-card", "KPI card", vec![DataType::Numeric, DataType::State])
            .with_slots(slots(&[
                ("title", SlotKind::Label),
                ("value", SlotKind::NumericValue),
                ("unit", SlotKind::Unit),
            ]))
            .with_meta(ComponentMeta {
                info_category: Some("kpi".to_string()),
                priority_affinity: PriorityAffinity::High,
                visual_footprint: VisualFootprint::Small,
                info_density_profile: DensityProfile::Low,
                ..ComponentMeta::default()
            })
            .with_layer_stats(stats(6, 3, 2, 0, 2)),
        ComponentExample::new("trend-chart", "Trend chart", vec![DataType::Trend, DataType::Numeric])
            .with_slots(slots(&[("title", SlotKind::Label), ("value", SlotKind::NumericValue)]))
            .with_meta(ComponentMeta {
                info_category: Some("trend".to_string()),
                visual_footprint: VisualFootprint::Large,
                info_density_profile: DensityProfile::High,
                interaction_support: vec!["hover".to_string(), "zoom".to_string()],
                ..ComponentMeta::default()
            })
            .with_layer_stats(stats(14, 4, 4, 2, 3)),
        ComponentExample::new("alarm-list", "Alarm list", vec![DataType::Alert, DataType::List])
            .with_slots(slots(&[
                ("title", SlotKind::Label),
                ("row", SlotKind::ListItem),
                ("level", SlotKind::Alert),
            ]))
            .with_meta(ComponentMeta {
                info_category: Some("alert".to_string()),
                task_stage_affinity: vec!["safety".to_string()],
                priority_affinity: PriorityAffinity::High,
                criticality_support: true,
                info_density_profile: DensityProfile::High,
                ..ComponentMeta::default()
            })
            .with_layer_stats(stats(10, 5, 3, 1, 2)),
        ComponentExample::new("status-lamp", "Status lamp", vec![DataType::State, DataType::Alert])
            .with_slots(slots(&[("label", SlotKind::Label), ("state", SlotKind::State)]))
            .with_meta(ComponentMeta {
                visual_footprint: VisualFootprint::Small,
                info_density_profile: DensityProfile::Low,
                criticality_support: true,
                ..ComponentMeta::default()
            })
            .with_layer_stats(stats(3, 1, 3, 0, 1)),
        ComponentExample::new("site-map", "Site map", vec![DataType::Map])
            .with_slots(slots(&[("title", SlotKind::Label)]))
            .with_meta(ComponentMeta {
                visual_footprint: VisualFootprint::Large,
                info_density_profile: DensityProfile::High,
                interaction_support: vec!["pan".to_string(), "zoom".to_string()],
                ..ComponentMeta::default()
            }),
        ComponentExample::new("text-panel", "Text panel", vec![DataType::Text, DataType::List])
            .with_slots(slots(&[("title", SlotKind::Label), ("body", SlotKind::ListItem)]))
            .with_meta(ComponentMeta {
                priority_affinity: PriorityAffinity::Low,
                info_density_profile: DensityProfile::Medium,
                ..ComponentMeta::default()
            }),
    ])
}

/// Two-page requirement model: one page with partial priorities, one without
pub fn sample_requirement() -> RequirementModel {
    RequirementModel {
        phases: vec![Facet::new("operation", "Operation")],
        roles: vec![
            Facet::new("operator", "Operator"),
            Facet::new("supervisor", "Supervisor"),
        ],
        conditions: vec![
            Facet::new("normal", "Normal"),
            Facet::new("abnormal", "Abnormal"),
        ],
        info_items: vec![
            InfoItem::new("alarm", "Active alarms", DataType::Alert)
                .with_tags(["alert", "safety"])
                .with_description("Unacknowledged alarms by severity"),
            InfoItem::new("throughput", "Line throughput", DataType::Numeric).with_tags(["kpi"]),
            InfoItem::new("temp-trend", "Furnace temperature", DataType::Trend),
            InfoItem::new("pump-state", "Pump state", DataType::State),
            InfoItem::new("site-map", "Plant map", DataType::Map),
            InfoItem::new("shift-notes", "Shift notes", DataType::Text),
            InfoItem::new("event-list", "Recent events", DataType::List),
        ],
        pages: vec![
            Page {
                phase_id: Some("operation".to_string()),
                role_id: Some("operator".to_string()),
                condition_id: Some("normal".to_string()),
                ..Page::new("ops-overview", "Operations overview").with_priorities(vec![
                    InfoPriority::new("throughput", 1),
                    InfoPriority::new("temp-trend", 2),
                    InfoPriority::new("alarm", 6),
                ])
            },
            Page {
                phase_id: Some("operation".to_string()),
                role_id: Some("supervisor".to_string()),
                condition_id: Some("abnormal".to_string()),
                ..Page::new("ops-incident", "Incident response")
            },
        ],
    }
}

/// Requirement text with bulleted information needs
pub fn sample_document() -> &'static str {
    "Furnace line monitoring dashboard\n\
     Operators watch the line during normal operation and respond to incidents.\n\
     Information needs:\n\
     - Active alarms by severity\n\
     - Line throughput (units/hour)\n\
     - Furnace temperature trend\n\
     - Pump state\n\
     - Shift notes\n"
}
