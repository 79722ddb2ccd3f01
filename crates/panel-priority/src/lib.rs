//! Panel Priority - page priority normalization and balancing
//!
//! Two agents live here:
//! - [`normalize`]: guarantees every page ranks every info item exactly once,
//!   densely numbered 1..N, synthesizing a semantic default where needed
//! - [`optimizer`]: a bounded NSGA-II-style search that perturbs a page's
//!   ranking, scores candidates on five competing objectives and picks a
//!   Pareto-optimal, well-spread winner
//!
//! # Example
//!
//! ```rust
//! use panel_model::{DataType, InfoItem, Page, RequirementModel};
//! use panel_priority::{normalize_priorities, OptimizerConfig, PriorityOptimizer};
//!
//! let model = RequirementModel {
//!     info_items: vec![
//!         InfoItem::new("temp", "Temperature", DataType::Numeric),
//!         InfoItem::new("alarm", "Alarm feed", DataType::Alert),
//!     ],
//!     pages: vec![Page::new("p1", "Overview")],
//!     ..RequirementModel::default()
//! };
//! let normalized = normalize_priorities(&model);
//! assert_eq!(normalized.auto_filled, vec!["p1".to_string()]);
//!
//! let optimizer = PriorityOptimizer::new(OptimizerConfig::default());
//! let result = optimizer.optimize_page(&normalized.model, &normalized.model.pages[0]);
//! assert_eq!(result.winner.len(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod normalize;
pub mod objectives;
pub mod optimizer;
pub mod pareto;
pub mod semantics;

pub use config::OptimizerConfig;
pub use normalize::{default_ranking, normalize_priorities, NormalizedRequirement};
pub use objectives::{ObjectiveVector, SemanticAssessment, OBJECTIVE_NAMES};
pub use optimizer::{
    apply_winners, Candidate, GenerationRecord, PageOptimization, PriorityOptimizer,
};
pub use pareto::{crowding_distance, dominates, sort_fronts};
pub use semantics::ItemProfile;
