//! Panel Layout - generate, review and repair dashboard layout plans
//!
//! The closed loop for one page:
//! 1. [`LayoutPlanner`] places items into regions (model first, heuristic fallback)
//! 2. [`LayoutReviewer`] flags overcrowding, misplaced priorities, binding
//!    problems and cross-page drift
//! 3. [`LayoutRepairer`] fixes a copy of the plan and reports quality before
//!    and after
//!
//! Cross-page state lives in an [`AnchorBook`] owned by the caller.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod anchors;
pub mod config;
pub mod metrics;
pub mod planner;
pub mod repairer;
pub mod reviewer;

pub use anchors::AnchorBook;
pub use config::{ReviewConfig, ScreenConfig};
pub use metrics::{MetricsDelta, QualityMetrics};
pub use planner::{
    bind_slots, component_defaults, LayoutPlanner, PlanInput, PlanOutcome, PlanRejection,
};
pub use repairer::{ChangeEntry, LayoutRepairer, RepairAction, RepairInput, RepairOutcome};
pub use reviewer::{
    Finding, IssueCategory, LayoutReviewer, Review, ReviewInput, ReviewIssue, ReviewSummary,
    Severity,
};
