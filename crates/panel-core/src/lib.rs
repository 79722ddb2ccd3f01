//! Panel Core - orchestration of the dashboard generation agents
//!
//! The orchestrator sequences:
//! 1. Structured extraction (model first, deterministic stub fallback)
//! 2. Priority normalization and NSGA-II-lite priority balancing
//! 3. Two-stage component retrieval
//! 4. The closed layout loop: plan, review, repair per page
//!
//! Every run produces an immutable trace persisted under a ULID. Model
//! failures never abort a run; they surface as warnings.
//!
//! # Example
//!
//! ```rust,no_run
//! use panel_core::{InMemoryTraceStore, Orchestrator, PipelineConfig, RunContext};
//! use panel_model::ComponentLibrary;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), panel_core::PipelineError> {
//! let orchestrator = Orchestrator::new(PipelineConfig::default(), Arc::new(InMemoryTraceStore::new()));
//! let mut ctx = RunContext::new().with_library(ComponentLibrary::default());
//! let (run, layouts) = orchestrator
//!     .run_end_to_end(&mut ctx, "- Active alarms\n- Throughput")
//!     .await?;
//! println!("{} pages, trace {}", layouts.pages.len(), run.trace_id);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod extraction;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod trace;

pub use config::{PipelineConfig, TraceConfig};
pub use error::{PipelineError, Result};
pub use extraction::{stub_model, Completeness, ExtractionOutcome, Extractor};
pub use orchestrator::{ClosedLoopRun, Orchestrator, PageLayout, PipelineRun};
pub use session::RunContext;
pub use store::{
    FileTraceStore, InMemoryRequirementStore, InMemoryTraceStore, JsonFileLibrary,
    LibraryProvider, RequirementStore, StaticLibrary, TraceStore,
};
pub use trace::{StepReport, StepStatus, StepTimer, Trace, TraceId, TraceKind, TraceRecorder, TraceStep};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
