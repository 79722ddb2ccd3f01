//! Layout reviewer
//!
//! Pure inspection of a plan. Findings are advisory; the repairer decides
//! what to change.

use crate::anchors::AnchorBook;
use crate::config::ReviewConfig;
use panel_model::{ComponentLibrary, LayoutPlan, Page, RegionRole, RequirementModel};
use serde::Serialize;
use std::fmt;

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Semantic,
    Usability,
    Ergonomics,
    Consistency,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Semantic => "semantic",
            Self::Usability => "usability",
            Self::Ergonomics => "ergonomics",
            Self::Consistency => "consistency",
        })
    }
}

/// Issue severity, ordered low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// What exactly was found, with the ids the repairer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "camelCase")]
pub enum Finding {
    /// Region holds more items than allowed
    #[serde(rename_all = "camelCase")]
    Overcrowded { region_id: String, count: usize },
    /// High-priority item outside every hero/summary region
    #[serde(rename_all = "camelCase")]
    Misplaced {
        info_item_id: String,
        priority: u32,
        region_id: String,
    },
    /// Item has no resolvable component
    #[serde(rename_all = "camelCase")]
    MissingBinding { info_item_id: String },
    /// Bound component does not support the item's data type
    #[serde(rename_all = "camelCase")]
    TypeMismatch {
        info_item_id: String,
        component_id: String,
    },
    /// Item sits in a different region role than on an earlier page
    #[serde(rename_all = "camelCase")]
    CrossPage {
        info_item_id: String,
        anchored: RegionRole,
        actual: RegionRole,
    },
}

impl Finding {
    #[must_use]
    pub fn category(&self) -> IssueCategory {
        match self {
            Self::Overcrowded { .. } => IssueCategory::Usability,
            Self::Misplaced { .. } => IssueCategory::Semantic,
            Self::MissingBinding { .. } | Self::TypeMismatch { .. } => IssueCategory::Ergonomics,
            Self::CrossPage { .. } => IssueCategory::Consistency,
        }
    }

    /// Info item the finding is about, if it is about one
    #[must_use]
    pub fn info_item_id(&self) -> Option<&str> {
        match self {
            Self::Overcrowded { .. } => None,
            Self::Misplaced { info_item_id, .. }
            | Self::MissingBinding { info_item_id }
            | Self::TypeMismatch { info_item_id, .. }
            | Self::CrossPage { info_item_id, .. } => Some(info_item_id),
        }
    }
}

/// One reviewer finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewIssue {
    #[serde(rename = "type")]
    pub category: IssueCategory,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    #[serde(flatten)]
    pub finding: Finding,
}

impl ReviewIssue {
    fn new(finding: Finding, severity: Severity, message: String, suggestion: String) -> Self {
        Self {
            category: finding.category(),
            severity,
            message,
            suggestion,
            finding,
        }
    }
}

/// Issue counts per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub semantic: usize,
    pub usability: usize,
    pub ergonomics: usize,
    pub consistency: usize,
    pub total: usize,
}

impl ReviewSummary {
    #[must_use]
    pub fn count(&self, category: IssueCategory) -> usize {
        match category {
            IssueCategory::Semantic => self.semantic,
            IssueCategory::Usability => self.usability,
            IssueCategory::Ergonomics => self.ergonomics,
            IssueCategory::Consistency => self.consistency,
        }
    }
}

/// Ranked issues (most severe first) plus counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Review {
    pub issues: Vec<ReviewIssue>,
    pub summary: ReviewSummary,
}

impl Review {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues of one category, in rank order
    pub fn of(&self, category: IssueCategory) -> impl Iterator<Item = &ReviewIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }
}

/// What the reviewer looks at
#[derive(Debug, Clone, Copy)]
pub struct ReviewInput<'a> {
    pub plan: &'a LayoutPlan,
    pub requirement: &'a RequirementModel,
    pub page: &'a Page,
    pub library: &'a ComponentLibrary,
    /// Roles pinned by earlier pages
    pub anchors: &'a AnchorBook,
}

/// Layout reviewer
#[derive(Debug, Clone, Default)]
pub struct LayoutReviewer {
    config: ReviewConfig,
}

impl LayoutReviewer {
    #[must_use]
    pub fn new(config: ReviewConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Inspect a plan
    #[must_use]
    pub fn review(&self, input: ReviewInput<'_>) -> Review {
        let mut issues = Vec::new();

        for region in &input.plan.regions {
            let count = region.items.len();
            if count > self.config.max_items_per_region {
                issues.push(ReviewIssue::new(
                    Finding::Overcrowded {
                        region_id: region.id.clone(),
                        count,
                    },
                    if count > 2 * self.config.max_items_per_region {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                    format!(
                        "region {} is overcrowded (过于拥挤): {count} items, limit {}",
                        region.id, self.config.max_items_per_region
                    ),
                    "split the region and reflow its trailing items".to_string(),
                ));
            }
        }

        for (region, placed) in input.plan.placed_items() {
            let id = placed.info_item_id.as_str();

            if let Some(priority) = input.page.priority_of(id) {
                if priority <= self.config.hero_priority_threshold && !region.role.is_prominent() {
                    issues.push(ReviewIssue::new(
                        Finding::Misplaced {
                            info_item_id: id.to_string(),
                            priority,
                            region_id: region.id.clone(),
                        },
                        if priority == 1 {
                            Severity::High
                        } else {
                            Severity::Medium
                        },
                        format!("priority {priority} item {id} sits in {} region {}", role_name(region.role), region.id),
                        "promote it into the hero/summary region".to_string(),
                    ));
                }
            }

            let component = placed
                .component_id
                .as_deref()
                .filter(|c| !c.is_empty())
                .and_then(|c| input.library.get(c));
            match component {
                None => issues.push(ReviewIssue::new(
                    Finding::MissingBinding {
                        info_item_id: id.to_string(),
                    },
                    Severity::High,
                    format!("{id} has no resolvable component binding"),
                    "bind the best-scoring library component".to_string(),
                )),
                Some(component) => {
                    if let Some(item) = input.requirement.info_item(id) {
                        if !component.supports(item.data_type) {
                            issues.push(ReviewIssue::new(
                                Finding::TypeMismatch {
                                    info_item_id: id.to_string(),
                                    component_id: component.id.clone(),
                                },
                                Severity::Medium,
                                format!(
                                    "{} does not support {} data of {id}",
                                    component.id, item.data_type
                                ),
                                "replace it with the next-best component".to_string(),
                            ));
                        }
                    }
                }
            }

            if let Some(anchored) = input.anchors.role_of(id) {
                if anchored != region.role {
                    issues.push(ReviewIssue::new(
                        Finding::CrossPage {
                            info_item_id: id.to_string(),
                            anchored,
                            actual: region.role,
                        },
                        Severity::Low,
                        format!(
                            "{id} is in a {} region here but a {} region on an earlier page",
                            role_name(region.role),
                            role_name(anchored)
                        ),
                        "align its placement with the earlier page".to_string(),
                    ));
                }
            }
        }

        // stable: equal severities keep discovery order
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        let summary = summarize(&issues);
        tracing::debug!(page_id = %input.page.id, total = summary.total, "layout reviewed");
        Review { issues, summary }
    }
}

fn summarize(issues: &[ReviewIssue]) -> ReviewSummary {
    let mut summary = ReviewSummary {
        total: issues.len(),
        ..ReviewSummary::default()
    };
    for issue in issues {
        match issue.category {
            IssueCategory::Semantic => summary.semantic += 1,
            IssueCategory::Usability => summary.usability += 1,
            IssueCategory::Ergonomics => summary.ergonomics += 1,
            IssueCategory::Consistency => summary.consistency += 1,
        }
    }
    summary
}

pub(crate) fn role_name(role: RegionRole) -> &'static str {
    match role {
        RegionRole::Hero => "hero",
        RegionRole::Summary => "summary",
        RegionRole::Main => "main",
        RegionRole::Sidebar => "sidebar",
        RegionRole::Toolbar => "toolbar",
        RegionRole::Other => "other",
    }
}
