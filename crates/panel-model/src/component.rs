//! Component library entries
//!
//! A [`ComponentExample`] is a reusable UI component from a design library.
//! Ergonomics scores are derived, never authoritative: they are recomputed
//! from layer statistics whenever missing.

use crate::requirement::DataType;
use serde::{Deserialize, Serialize};

/// Visual complexity contributed by each layer
pub const VIS_PER_LAYER: f64 = 0.03;
/// Visual complexity contributed by each distinct colour
pub const VIS_PER_COLOR: f64 = 0.06;
/// Visual complexity contributed by each nesting level
pub const VIS_PER_DEPTH: f64 = 0.05;
/// Interaction load contributed by each interactive layer
pub const INT_PER_INTERACTIVE_LAYER: f64 = 0.12;
/// Interaction load contributed by each declared interaction
pub const INT_PER_INTERACTION: f64 = 0.08;
/// Capacity contributed by each text layer
pub const CAP_PER_TEXT_LAYER: f64 = 0.08;
/// Capacity contributed by each slot
pub const CAP_PER_SLOT: f64 = 0.1;

/// Declared pixel size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Type of a component sub-region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKind {
    Label,
    NumericValue,
    Unit,
    State,
    Alert,
    ListItem,
}

/// Named, typed sub-part of a component that can receive bound content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub kind: SlotKind,
}

impl Slot {
    /// Create new slot
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Priority band a component is designed for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityAffinity {
    High,
    #[default]
    Medium,
    Low,
}

/// How much information a component packs per unit of area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityProfile {
    Low,
    #[default]
    Medium,
    High,
}

/// Relative screen area a component occupies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualFootprint {
    Small,
    #[default]
    Medium,
    Large,
}

/// Descriptive metadata attached to a library entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentMeta {
    pub info_category: Option<String>,
    pub task_stage_affinity: Vec<String>,
    pub priority_affinity: PriorityAffinity,
    pub criticality_support: bool,
    pub visual_footprint: VisualFootprint,
    pub info_density_profile: DensityProfile,
    pub dynamic_behavior: Option<String>,
    pub layout_role: Option<String>,
    pub recommended_viewport_zone: Option<String>,
    pub interaction_support: Vec<String>,
    pub recommended_max_instances_per_page: Option<u32>,
}

/// Layer statistics of the rendered component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerStats {
    pub layer_count: u32,
    pub text_layer_count: u32,
    pub color_count: u32,
    pub interactive_layer_count: u32,
    pub depth: u32,
}

/// Derived ergonomics scores, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ergonomics {
    /// Visual complexity
    pub v_vis: f64,
    /// Interaction load
    pub v_int: f64,
    /// Information-carrying capacity
    pub cap: f64,
}

impl Ergonomics {
    /// Compute scores from layer statistics
    #[must_use]
    pub fn from_layer_stats(stats: &LayerStats, component: &ComponentExample) -> Self {
        let v_vis = f64::from(stats.layer_count) * VIS_PER_LAYER
            + f64::from(stats.color_count) * VIS_PER_COLOR
            + f64::from(stats.depth) * VIS_PER_DEPTH;
        let v_int = f64::from(stats.interactive_layer_count) * INT_PER_INTERACTIVE_LAYER
            + component.meta.interaction_support.len() as f64 * INT_PER_INTERACTION;
        let cap = f64::from(stats.text_layer_count) * CAP_PER_TEXT_LAYER
            + component.slots.len() as f64 * CAP_PER_SLOT;
        Self {
            v_vis: v_vis.clamp(0.0, 1.0),
            v_int: v_int.clamp(0.0, 1.0),
            cap: cap.clamp(0.0, 1.0),
        }
    }

    /// Estimate scores from metadata alone when no layer statistics exist
    #[must_use]
    pub fn estimate(component: &ComponentExample) -> Self {
        let v_vis = match component.meta.visual_footprint {
            VisualFootprint::Small => 0.25,
            VisualFootprint::Medium => 0.45,
            VisualFootprint::Large => 0.7,
        };
        let v_int = component.meta.interaction_support.len() as f64 * 0.15;
        let density = match component.meta.info_density_profile {
            DensityProfile::Low => 0.1,
            DensityProfile::Medium => 0.25,
            DensityProfile::High => 0.4,
        };
        let cap = component.slots.len() as f64 * 0.15 + density;
        Self {
            v_vis,
            v_int: v_int.clamp(0.0, 1.0),
            cap: cap.clamp(0.0, 1.0),
        }
    }
}

/// A library entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentExample {
    pub id: String,
    /// Opaque rendering handle
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub sample_text: Option<String>,
    #[serde(default)]
    pub sample_color: Option<String>,
    #[serde(default)]
    pub supported_data_types: Vec<DataType>,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(flatten)]
    pub meta: ComponentMeta,
    #[serde(default)]
    pub layer_stats: Option<LayerStats>,
    #[serde(default)]
    pub ergonomics: Option<Ergonomics>,
}

impl ComponentExample {
    /// Create new component supporting the given data types
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, supported: Vec<DataType>) -> Self {
        let id = id.into();
        Self {
            node_id: format!("node:{id}"),
            id,
            name: name.into(),
            size: Size::default(),
            sample_text: None,
            sample_color: None,
            supported_data_types: supported,
            slots: Vec::new(),
            meta: ComponentMeta::default(),
            layer_stats: None,
            ergonomics: None,
        }
    }

    /// With slots
    #[inline]
    #[must_use]
    pub fn with_slots(mut self, slots: Vec<Slot>) -> Self {
        self.slots = slots;
        self
    }

    /// With metadata
    #[inline]
    #[must_use]
    pub fn with_meta(mut self, meta: ComponentMeta) -> Self {
        self.meta = meta;
        self
    }

    /// With layer statistics
    #[inline]
    #[must_use]
    pub fn with_layer_stats(mut self, stats: LayerStats) -> Self {
        self.layer_stats = Some(stats);
        self
    }

    /// Whether the component can present the data type
    #[inline]
    #[must_use]
    pub fn supports(&self, data_type: DataType) -> bool {
        self.supported_data_types.contains(&data_type)
    }

    /// Whether the component declares a slot with this name
    #[inline]
    #[must_use]
    pub fn has_slot(&self, slot_name: &str) -> bool {
        self.slots.iter().any(|s| s.name == slot_name)
    }

    /// Stored ergonomics, or freshly computed ones when missing
    #[must_use]
    pub fn ergonomics(&self) -> Ergonomics {
        if let Some(stored) = self.ergonomics {
            return stored;
        }
        match &self.layer_stats {
            Some(stats) => Ergonomics::from_layer_stats(stats, self),
            None => Ergonomics::estimate(self),
        }
    }

    /// Lowercased descriptive vocabulary used for tag overlap
    #[must_use]
    pub fn vocabulary(&self) -> Vec<String> {
        let mut words: Vec<String> = Vec::new();
        let mut push = |s: &str| {
            for token in s.split(|c: char| !c.is_alphanumeric() && c != '-') {
                if !token.is_empty() {
                    words.push(token.to_lowercase());
                }
            }
        };
        push(&self.name);
        if let Some(category) = &self.meta.info_category {
            push(category);
        }
        for stage in &self.meta.task_stage_affinity {
            push(stage);
        }
        if let Some(behavior) = &self.meta.dynamic_behavior {
            push(behavior);
        }
        if let Some(role) = &self.meta.layout_role {
            push(role);
        }
        words.sort();
        words.dedup();
        words
    }
}

/// Ordered list of library entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentLibrary {
    components: Vec<ComponentExample>,
}

impl ComponentLibrary {
    /// Create library from entries (order is preserved)
    #[inline]
    #[must_use]
    pub fn new(components: Vec<ComponentExample>) -> Self {
        Self { components }
    }

    /// Entries in library order
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ComponentExample] {
        &self.components
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the library has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Find an entry by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ComponentExample> {
        self.components.iter().find(|c| c.id == id)
    }

    /// First entry supporting the data type
    #[must_use]
    pub fn first_supporting(&self, data_type: DataType) -> Option<&ComponentExample> {
        self.components.iter().find(|c| c.supports(data_type))
    }

    /// Fill in ergonomics for every entry that lacks them
    ///
    /// Returns the number of entries updated.
    pub fn ensure_ergonomics(&mut self) -> usize {
        let mut updated = 0;
        for component in &mut self.components {
            if component.ergonomics.is_none() {
                component.ergonomics = Some(component.ergonomics());
                updated += 1;
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge() -> ComponentExample {
        ComponentExample::new("gauge", "KPI Gauge", vec![DataType::Numeric])
            .with_slots(vec![
                Slot::new("title", SlotKind::Label),
                Slot::new("value", SlotKind::NumericValue),
                Slot::new("unit", SlotKind::Unit),
            ])
    }

    #[test]
    fn ergonomics_from_layer_stats() {
        let component = gauge().with_layer_stats(LayerStats {
            layer_count: 10,
            text_layer_count: 3,
            color_count: 2,
            interactive_layer_count: 0,
            depth: 2,
        });
        let e = component.ergonomics();
        assert!((e.v_vis - (0.3 + 0.12 + 0.1)).abs() < 1e-9);
        assert!(e.v_int.abs() < 1e-9);
        assert!((e.cap - (0.24 + 0.3)).abs() < 1e-9);
    }

    #[test]
    fn ergonomics_clamped_to_unit_range() {
        let component = gauge().with_layer_stats(LayerStats {
            layer_count: 200,
            text_layer_count: 50,
            color_count: 40,
            interactive_layer_count: 30,
            depth: 12,
        });
        let e = component.ergonomics();
        assert!((e.v_vis - 1.0).abs() < 1e-9);
        assert!((e.v_int - 1.0).abs() < 1e-9);
        assert!((e.cap - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stored_ergonomics_win() {
        let mut component = gauge();
        component.ergonomics = Some(Ergonomics {
            v_vis: 0.9,
            v_int: 0.1,
            cap: 0.2,
        });
        assert!((component.ergonomics().v_vis - 0.9).abs() < 1e-9);
    }

    #[test]
    fn ensure_ergonomics_fills_missing_only() {
        let mut stored = gauge();
        stored.id = "stored".to_string();
        stored.ergonomics = Some(Ergonomics::default());
        let mut library = ComponentLibrary::new(vec![gauge(), stored]);
        assert_eq!(library.ensure_ergonomics(), 1);
        assert!(library.components().iter().all(|c| c.ergonomics.is_some()));
    }

    #[test]
    fn library_deserializes_flattened_meta() {
        let json = r#"[{
            "id": "alarm-list",
            "nodeId": "12:4",
            "supportedDataTypes": ["alert", "list"],
            "slots": [{"name": "row", "kind": "listItem"}],
            "priorityAffinity": "high",
            "infoDensityProfile": "high",
            "criticalitySupport": true
        }]"#;
        let library: ComponentLibrary = serde_json::from_str(json).unwrap();
        let c = library.get("alarm-list").unwrap();
        assert!(c.supports(DataType::Alert));
        assert_eq!(c.meta.priority_affinity, PriorityAffinity::High);
        assert!(c.meta.criticality_support);
        assert_eq!(c.slots[0].kind, SlotKind::ListItem);
    }

    #[test]
    fn vocabulary_is_lowercase_and_deduped() {
        let mut component = gauge();
        component.meta.info_category = Some("KPI".to_string());
        let vocab = component.vocabulary();
        assert_eq!(vocab.iter().filter(|w| *w == "kpi").count(), 1);
        assert!(vocab.contains(&"gauge".to_string()));
    }
}
