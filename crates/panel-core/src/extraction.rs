//! Structured extraction
//!
//! Turns requirement text into a candidate requirement model. The model
//! capability is asked first; when it is absent, fails, or returns an
//! unusable model, a deterministic stub is derived from the document's
//! bulleted lines instead.

use crate::error::{PipelineError, Result};
use once_cell::sync::Lazy;
use panel_llm::{request_json, ModelCapability};
use panel_model::{DataType, Facet, InfoItem, Page, RequirementModel};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured requirements for monitoring dashboards. \
Answer with JSON only, shaped as {\"phases\": [{\"id\", \"name\"}], \"roles\": [...], \"conditions\": [...], \
\"infoItems\": [{\"id\", \"name\", \"description\", \"dataType\": \"numeric|trend|alert|state|text|map|list\", \"tags\": []}], \
\"pages\": [{\"id\", \"name\", \"phaseId\", \"roleId\", \"conditionId\", \"infoPriorities\": [{\"infoItemId\", \"priority\"}]}]}";

static BULLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*•]|\d+[.)、])\s*(.+?)\s*$").expect("valid bullet regex")
});

/// Keyword table for inferring a data type from free text, checked in order
const TYPE_KEYWORDS: &[(DataType, &[&str])] = &[
    (DataType::Alert, &["alarm", "alert", "warning", "fault", "告警", "报警", "预警"]),
    (DataType::Trend, &["trend", "history", "over time", "curve", "趋势", "曲线"]),
    (DataType::Map, &["map", "location", "layout of", "地图", "位置"]),
    (DataType::List, &["list", "events", "queue", "table", "列表", "清单"]),
    (DataType::State, &["state", "status", "mode", "状态"]),
    (DataType::Text, &["note", "remark", "comment", "description", "备注", "说明"]),
];

/// Result of extraction
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Model answer accepted
    Parsed(RequirementModel),
    /// Deterministic stub, with the reason the model answer was not used
    Fallback {
        model: RequirementModel,
        reason: String,
    },
}

impl ExtractionOutcome {
    #[must_use]
    pub fn model(&self) -> &RequirementModel {
        match self {
            Self::Parsed(model) | Self::Fallback { model, .. } => model,
        }
    }

    #[must_use]
    pub fn into_model(self) -> RequirementModel {
        match self {
            Self::Parsed(model) | Self::Fallback { model, .. } => model,
        }
    }

    #[must_use]
    pub fn used_llm(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// How complete an extracted model is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completeness {
    pub phases: usize,
    pub roles: usize,
    pub conditions: usize,
    pub info_items: usize,
    pub pages: usize,
    /// Top-level sections that came back empty
    pub missing_sections: Vec<String>,
    /// Pages that carry no priorities at all
    pub pages_without_priorities: Vec<String>,
}

impl Completeness {
    /// Assess a model
    #[must_use]
    pub fn of(model: &RequirementModel) -> Self {
        let sections = [
            ("phases", model.phases.len()),
            ("roles", model.roles.len()),
            ("conditions", model.conditions.len()),
            ("infoItems", model.info_items.len()),
            ("pages", model.pages.len()),
        ];
        Self {
            phases: model.phases.len(),
            roles: model.roles.len(),
            conditions: model.conditions.len(),
            info_items: model.info_items.len(),
            pages: model.pages.len(),
            missing_sections: sections
                .iter()
                .filter(|(_, n)| *n == 0)
                .map(|(name, _)| (*name).to_string())
                .collect(),
            pages_without_priorities: model
                .pages
                .iter()
                .filter(|p| p.info_priorities.is_empty())
                .map(|p| p.id.clone())
                .collect(),
        }
    }

    /// No section is empty
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_sections.is_empty()
    }
}

/// Extraction agent
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor;

impl Extractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract a requirement model from document text
    ///
    /// # Errors
    /// `PipelineError::InvalidInput` when the text is empty. Model failures
    /// never error; they produce `ExtractionOutcome::Fallback`.
    pub async fn extract(
        &self,
        model: Option<&dyn ModelCapability>,
        document: &str,
    ) -> Result<ExtractionOutcome> {
        if document.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "document text is empty".to_string(),
            ));
        }
        let Some(model) = model else {
            return Ok(ExtractionOutcome::Fallback {
                model: stub_model(document),
                reason: "no model capability".to_string(),
            });
        };
        let reason = match request_json::<RequirementModel>(model, EXTRACTION_SYSTEM_PROMPT, document).await {
            Ok(parsed) if parsed.info_items.is_empty() => "model returned no info items".to_string(),
            Ok(parsed) if parsed.pages.is_empty() => "model returned no pages".to_string(),
            Ok(parsed) => return Ok(ExtractionOutcome::Parsed(parsed)),
            Err(e) => e.to_string(),
        };
        tracing::warn!(%reason, "extraction degraded to stub model");
        Ok(ExtractionOutcome::Fallback {
            model: stub_model(document),
            reason,
        })
    }
}

/// Deterministic requirement model derived from the document's bullets
///
/// Every bullet or numbered line becomes an info item; one overview page
/// without priorities is created so the normalizer fills it. A document
/// without bullets yields a fixed four-item monitoring model.
#[must_use]
pub fn stub_model(document: &str) -> RequirementModel {
    let mut ids = HashSet::new();
    let mut items: Vec<InfoItem> = document
        .lines()
        .filter_map(|line| BULLET.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(index, text)| {
            let id = unique_id(&mut ids, &slug(&text, index));
            let data_type = infer_data_type(&text);
            let tags = infer_tags(&text, data_type);
            InfoItem::new(id, text, data_type).with_tags(tags)
        })
        .collect();
    if items.is_empty() {
        items = default_items();
    }

    RequirementModel {
        phases: vec![Facet::new("operation", "Operation")],
        roles: vec![Facet::new("operator", "Operator")],
        conditions: vec![Facet::new("normal", "Normal")],
        info_items: items,
        pages: vec![Page {
            phase_id: Some("operation".to_string()),
            role_id: Some("operator".to_string()),
            condition_id: Some("normal".to_string()),
            ..Page::new("overview", "Overview")
        }],
    }
}

fn default_items() -> Vec<InfoItem> {
    vec![
        InfoItem::new("active-alarms", "Active alarms", DataType::Alert).with_tags(["alert"]),
        InfoItem::new("key-metric", "Key metric", DataType::Numeric).with_tags(["kpi"]),
        InfoItem::new("metric-trend", "Metric trend", DataType::Trend),
        InfoItem::new("system-status", "System status", DataType::State),
    ]
}

fn infer_data_type(text: &str) -> DataType {
    let lower = text.to_lowercase();
    TYPE_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map_or(DataType::Numeric, |(dt, _)| *dt)
}

fn infer_tags(text: &str, data_type: DataType) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags = Vec::new();
    if data_type == DataType::Alert || lower.contains("safety") || lower.contains("安全") {
        tags.push("alert".to_string());
    }
    if ["kpi", "rate", "throughput", "efficiency", "yield", "指标", "产量"]
        .iter()
        .any(|w| lower.contains(w))
    {
        tags.push("kpi".to_string());
    }
    tags
}

/// Lowercase ASCII slug; non-ASCII text falls back to a positional id
fn slug(text: &str, index: usize) -> String {
    let mut slug = String::new();
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
        if slug.len() >= 40 {
            break;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        format!("item-{}", index + 1)
    } else {
        slug
    }
}

fn unique_id(seen: &mut HashSet<String>, base: &str) -> String {
    let mut id = base.to_string();
    let mut n = 2;
    while !seen.insert(id.clone()) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}
