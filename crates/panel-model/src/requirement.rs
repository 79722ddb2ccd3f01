//! Requirement model
//!
//! The structured form of a requirements document:
//! - Facets describing when / who / under which condition a page applies
//! - Information items, each with a data type and semantic tags
//! - Pages with a page-scoped priority ranking over the info items

use crate::error::ModelError;
use crate::plan::SlotBinding;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Kind of data an information item carries
///
/// Serializes as the lowercase name. Deserialization goes through
/// [`DataType::parse_lenient`], so synonyms such as `"number"` or `"table"`
/// are accepted and unknown names read as `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Single numeric value
    Numeric,
    /// Time series / trend
    Trend,
    /// Alarm or warning
    Alert,
    /// Discrete state
    State,
    /// Free text
    Text,
    /// Geographic / spatial view
    Map,
    /// Tabular or list data
    List,
}

impl DataType {
    /// All data types in declaration order
    pub const ALL: [DataType; 7] = [
        DataType::Numeric,
        DataType::Trend,
        DataType::Alert,
        DataType::State,
        DataType::Text,
        DataType::Map,
        DataType::List,
    ];

    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Numeric => "numeric",
            DataType::Trend => "trend",
            DataType::Alert => "alert",
            DataType::State => "state",
            DataType::Text => "text",
            DataType::Map => "map",
            DataType::List => "list",
        }
    }

    /// Lenient parse used for model output; unknown names become `Text`
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(DataType::Text)
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(DataType::parse_lenient(&value))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" | "number" | "kpi" => Ok(DataType::Numeric),
            "trend" | "chart" | "timeseries" => Ok(DataType::Trend),
            "alert" | "alarm" | "warning" => Ok(DataType::Alert),
            "state" | "status" => Ok(DataType::State),
            "text" => Ok(DataType::Text),
            "map" => Ok(DataType::Map),
            "list" | "table" => Ok(DataType::List),
            other => Err(format!("unknown data type: {other}")),
        }
    }
}

/// A phase, role or condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Facet {
    /// Create new facet
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}

/// Atomic fact a page must present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoItem {
    /// Item identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Kind of data
    pub data_type: DataType,
    /// Semantic tags (e.g. "safety", "kpi")
    #[serde(default)]
    pub tags: Vec<String>,
}

impl InfoItem {
    /// Create new info item
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            data_type,
            tags: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With semantic tags
    #[inline]
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Lowercased name, description and tags joined for keyword matching
    #[must_use]
    pub fn search_text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.description);
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text.to_lowercase()
    }
}

/// One entry of a page's priority ranking (lower = more important)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoPriority {
    pub info_item_id: String,
    pub priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl InfoPriority {
    /// Create new priority entry
    #[inline]
    #[must_use]
    pub fn new(info_item_id: impl Into<String>, priority: u32) -> Self {
        Self {
            info_item_id: info_item_id.into(),
            priority,
            note: None,
        }
    }
}

/// Page-level binding preference carried by the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferredBinding {
    pub info_item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default)]
    pub slot_hints: Vec<SlotBinding>,
}

/// A screen the dashboard must provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phase_id: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub info_priorities: Vec<InfoPriority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_bindings: Vec<PreferredBinding>,
}

impl Page {
    /// Create new page without priorities
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phase_id: None,
            role_id: None,
            condition_id: None,
            info_priorities: Vec::new(),
            preferred_bindings: Vec::new(),
        }
    }

    /// With priority list
    #[inline]
    #[must_use]
    pub fn with_priorities(mut self, priorities: Vec<InfoPriority>) -> Self {
        self.info_priorities = priorities;
        self
    }

    /// Priority of an info item on this page
    #[must_use]
    pub fn priority_of(&self, info_item_id: &str) -> Option<u32> {
        self.info_priorities
            .iter()
            .find(|p| p.info_item_id == info_item_id)
            .map(|p| p.priority)
    }

    /// Info item ids ordered by priority (ties keep list order)
    #[must_use]
    pub fn ordered_item_ids(&self) -> Vec<String> {
        let mut entries: Vec<_> = self.info_priorities.iter().enumerate().collect();
        entries.sort_by_key(|(idx, p)| (p.priority, *idx));
        entries
            .into_iter()
            .map(|(_, p)| p.info_item_id.clone())
            .collect()
    }

    /// Preferred binding for an info item, if the document declared one
    #[must_use]
    pub fn preferred_binding(&self, info_item_id: &str) -> Option<&PreferredBinding> {
        self.preferred_bindings
            .iter()
            .find(|b| b.info_item_id == info_item_id)
    }
}

/// Structured requirement model extracted from a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementModel {
    #[serde(default)]
    pub phases: Vec<Facet>,
    #[serde(default)]
    pub roles: Vec<Facet>,
    #[serde(default)]
    pub conditions: Vec<Facet>,
    #[serde(default)]
    pub info_items: Vec<InfoItem>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl RequirementModel {
    /// Look up an info item by id
    #[must_use]
    pub fn info_item(&self, id: &str) -> Option<&InfoItem> {
        self.info_items.iter().find(|item| item.id == id)
    }

    /// Look up a page by id
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    /// Check that every page ranks every info item exactly once with dense priorities
    ///
    /// # Errors
    /// The first violation found, in page order.
    pub fn check_dense_priorities(&self) -> Result<(), ModelError> {
        let expected = self
            .info_items
            .iter()
            .map(|i| i.id.as_str())
            .collect::<HashSet<_>>()
            .len();
        for page in &self.pages {
            let mut seen = HashSet::new();
            for entry in &page.info_priorities {
                if self.info_item(&entry.info_item_id).is_none() {
                    return Err(ModelError::UnknownInfoItem {
                        page_id: page.id.clone(),
                        info_item_id: entry.info_item_id.clone(),
                    });
                }
                if !seen.insert(entry.info_item_id.as_str()) {
                    return Err(ModelError::DuplicatePriority {
                        page_id: page.id.clone(),
                        info_item_id: entry.info_item_id.clone(),
                    });
                }
            }
            if seen.len() != expected {
                return Err(ModelError::IncompletePriorities {
                    page_id: page.id.clone(),
                    covered: seen.len(),
                    expected,
                });
            }
            let mut priorities: Vec<u32> =
                page.info_priorities.iter().map(|p| p.priority).collect();
            priorities.sort_unstable();
            let dense = priorities
                .iter()
                .enumerate()
                .all(|(idx, p)| *p as usize == idx + 1);
            if !dense {
                return Err(ModelError::SparsePriorities {
                    page_id: page.id.clone(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_item_model() -> RequirementModel {
        RequirementModel {
            info_items: vec![
                InfoItem::new("a", "Alpha", DataType::Numeric),
                InfoItem::new("b", "Beta", DataType::Alert),
            ],
            pages: vec![Page::new("p1", "Overview").with_priorities(vec![
                InfoPriority::new("b", 1),
                InfoPriority::new("a", 2),
            ])],
            ..RequirementModel::default()
        }
    }

    #[test]
    fn data_type_lenient_parse() {
        assert_eq!(DataType::parse_lenient("ALARM"), DataType::Alert);
        assert_eq!(DataType::parse_lenient("table"), DataType::List);
        assert_eq!(DataType::parse_lenient("hologram"), DataType::Text);
    }

    #[test]
    fn data_type_deserializes_synonyms() {
        let parsed: Vec<DataType> =
            serde_json::from_str(r#"["number", "Status", "table", "hologram"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![DataType::Numeric, DataType::State, DataType::List, DataType::Text]
        );
        assert_eq!(serde_json::to_string(&DataType::Numeric).unwrap(), r#""numeric""#);
        assert!(serde_json::from_str::<DataType>("3").is_err());
    }

    #[test]
    fn requirement_deserializes_camel_case() {
        let json = r#"{
            "infoItems": [{"id": "x", "name": "X", "dataType": "trend"}],
            "pages": [{"id": "p", "name": "P", "infoPriorities": [{"infoItemId": "x", "priority": 1}]}]
        }"#;
        let model: RequirementModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.info_items[0].data_type, DataType::Trend);
        assert_eq!(model.pages[0].priority_of("x"), Some(1));
        assert!(model.phases.is_empty());
    }

    #[test]
    fn dense_priorities_accepted() {
        assert!(two_item_model().check_dense_priorities().is_ok());
    }

    #[test]
    fn sparse_priorities_rejected() {
        let mut model = two_item_model();
        model.pages[0].info_priorities[1].priority = 5;
        assert!(matches!(
            model.check_dense_priorities(),
            Err(ModelError::SparsePriorities { .. })
        ));
    }

    #[test]
    fn duplicate_priorities_rejected() {
        let mut model = two_item_model();
        model.pages[0].info_priorities[1].info_item_id = "b".to_string();
        assert!(matches!(
            model.check_dense_priorities(),
            Err(ModelError::DuplicatePriority { .. })
        ));
    }

    #[test]
    fn ordered_item_ids_follow_priority() {
        let model = two_item_model();
        assert_eq!(model.pages[0].ordered_item_ids(), vec!["b", "a"]);
    }
}
