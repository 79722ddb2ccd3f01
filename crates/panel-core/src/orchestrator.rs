//! Orchestrator
//!
//! Two traced entry points:
//! - [`Orchestrator::run_pipeline`]: extraction, normalization, priority
//!   balancing and component retrieval
//! - [`Orchestrator::run_closed_loop`]: plan, review and repair for every page
//!
//! Agents are never retried. A failing model call degrades that agent to its
//! deterministic path and the warning is recorded in the trace.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::extraction::{Completeness, Extractor};
use crate::session::RunContext;
use crate::store::{FileTraceStore, InMemoryTraceStore, RequirementStore, TraceStore};
use crate::trace::{StepReport, Trace, TraceId, TraceKind, TraceRecorder};
use panel_layout::{
    LayoutPlanner, LayoutRepairer, LayoutReviewer, PlanInput, RepairInput, RepairOutcome, Review,
    ReviewInput,
};
use panel_llm::{HttpModelClient, ModelCapability};
use panel_model::{LayoutPlan, RequirementModel};
use panel_priority::{apply_winners, normalize_priorities, PageOptimization, PriorityOptimizer};
use panel_retrieval::{RetrievalOutcome, TwoStageRetriever};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Result of [`Orchestrator::run_pipeline`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub trace_id: TraceId,
    /// Normalized model with the optimizer's winners applied
    pub requirement: RequirementModel,
    /// Pages whose priorities were synthesized wholesale
    pub auto_filled: Vec<String>,
    pub completeness: Completeness,
    pub optimizations: Vec<PageOptimization>,
    pub retrieval: RetrievalOutcome,
    /// True when any agent used the model's answer
    #[serde(rename = "usedLLM")]
    pub used_llm: bool,
    pub warnings: Vec<String>,
}

/// Closed-loop result for one page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub page_id: String,
    pub model_assisted: bool,
    /// Why the planner fell back, if it did
    pub plan_warning: Option<String>,
    pub review: Review,
    pub repair: RepairOutcome,
}

impl PageLayout {
    /// Final (repaired) plan
    #[must_use]
    pub fn plan(&self) -> &LayoutPlan {
        &self.repair.repaired
    }
}

/// Result of [`Orchestrator::run_closed_loop`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedLoopRun {
    pub trace_id: TraceId,
    pub pages: Vec<PageLayout>,
    pub warnings: Vec<String>,
}

impl ClosedLoopRun {
    #[must_use]
    pub fn page(&self, page_id: &str) -> Option<&PageLayout> {
        self.pages.iter().find(|p| p.page_id == page_id)
    }
}

/// Sequences the agents and persists a trace per run
pub struct Orchestrator {
    config: PipelineConfig,
    model: Option<Arc<dyn ModelCapability>>,
    traces: Arc<dyn TraceStore>,
    extractor: Extractor,
    optimizer: PriorityOptimizer,
    retriever: TwoStageRetriever,
    planner: LayoutPlanner,
    reviewer: LayoutReviewer,
    repairer: LayoutRepairer,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("has_model", &self.model.is_some())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create orchestrator without a model capability
    #[must_use]
    pub fn new(config: PipelineConfig, traces: Arc<dyn TraceStore>) -> Self {
        let retriever = TwoStageRetriever::new(config.retrieval.clone());
        Self {
            extractor: Extractor::new(),
            optimizer: PriorityOptimizer::new(config.optimizer.clone()),
            planner: LayoutPlanner::new(config.screen.clone()),
            reviewer: LayoutReviewer::new(config.review.clone()),
            repairer: LayoutRepairer::new(retriever.clone(), config.review.clone()),
            retriever,
            model: None,
            traces,
            config,
        }
    }

    /// Build trace store and model client from configuration
    ///
    /// # Errors
    /// `PipelineError::ModelClient` when the HTTP client cannot be built.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let traces: Arc<dyn TraceStore> = match &config.trace.directory {
            Some(dir) => Arc::new(FileTraceStore::new(dir.clone())),
            None => Arc::new(InMemoryTraceStore::new()),
        };
        let model = config
            .model
            .clone()
            .map(HttpModelClient::new)
            .transpose()?;
        let orchestrator = Self::new(config, traces);
        Ok(match model {
            Some(client) => orchestrator.with_model(Arc::new(client)),
            None => orchestrator,
        })
    }

    /// With model capability
    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn ModelCapability>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn traces(&self) -> &Arc<dyn TraceStore> {
        &self.traces
    }

    fn model(&self) -> Option<&dyn ModelCapability> {
        self.model.as_deref()
    }

    /// Extraction → normalization → priority balancing → retrieval
    ///
    /// # Errors
    /// Input errors only: empty document text or no library in the context.
    pub async fn run_pipeline(&self, ctx: &RunContext, document: &str) -> Result<PipelineRun> {
        let library = ctx.library().ok_or(PipelineError::MissingLibrary)?;
        let mut recorder = TraceRecorder::new(TraceKind::Pipeline);
        let mut warnings = Vec::new();
        tracing::info!(trace_id = %recorder.id(), "pipeline run started");

        let timer = recorder.start_step("extraction");
        let extraction = self.extractor.extract(self.model(), document).await?;
        let completeness = Completeness::of(extraction.model());
        let extraction_used_llm = extraction.used_llm();
        recorder.finish_step(
            timer,
            StepReport {
                warning: extraction.warning().map(str::to_string),
                input_summary: format!(
                    "{} chars, {} lines",
                    document.chars().count(),
                    document.lines().count()
                ),
                output_summary: format!(
                    "{} info items, {} pages",
                    completeness.info_items, completeness.pages
                ),
                detail: serde_json::to_value(&completeness)?,
            },
        );
        warnings.extend(extraction.warning().map(|w| format!("extraction: {w}")));
        let extracted = extraction.into_model();

        let timer = recorder.start_step("normalizer");
        let normalized = normalize_priorities(&extracted);
        recorder.finish_step(
            timer,
            StepReport {
                warning: None,
                input_summary: format!("{} pages", extracted.pages.len()),
                output_summary: format!("{} pages auto-filled", normalized.auto_filled.len()),
                detail: json!({ "autoFilled": normalized.auto_filled }),
            },
        );
        let auto_filled = normalized.auto_filled;
        let mut requirement = normalized.model;

        let timer = recorder.start_step("optimizer");
        let optimizations = self.optimizer.optimize_requirement(&requirement);
        apply_winners(&mut requirement, &optimizations);
        recorder.finish_step(
            timer,
            StepReport {
                warning: None,
                input_summary: format!("{} pages", requirement.pages.len()),
                output_summary: format!(
                    "{} candidates evaluated, {} pages bypassed",
                    optimizations.iter().map(PageOptimization::evaluated_count).sum::<usize>(),
                    optimizations.iter().filter(|o| o.bypassed).count()
                ),
                detail: serde_json::to_value(&optimizations)?,
            },
        );

        let timer = recorder.start_step("retrieval");
        let retrieval = self
            .retriever
            .retrieve(self.model(), &requirement, library)
            .await;
        recorder.finish_step(
            timer,
            StepReport {
                warning: retrieval.warning.clone(),
                input_summary: format!(
                    "{} info items, {} components",
                    requirement.info_items.len(),
                    library.len()
                ),
                output_summary: format!("{} bindings", retrieval.component_map().len()),
                detail: serde_json::to_value(&retrieval.bindings)?,
            },
        );
        warnings.extend(retrieval.warning.as_ref().map(|w| format!("retrieval: {w}")));

        let trace = recorder.finish();
        let trace_id = trace.id();
        self.persist(&trace, &mut warnings).await;

        Ok(PipelineRun {
            trace_id,
            used_llm: extraction_used_llm || retrieval.used_llm,
            requirement,
            auto_filled,
            completeness,
            optimizations,
            retrieval,
            warnings,
        })
    }

    /// Plan → review → repair for every page, in page order
    ///
    /// Pages share the context's anchor book, so later pages are aligned with
    /// earlier ones. Each page's repaired plan is recorded in the context.
    ///
    /// The anchor book is not cleared here: a second run on the same context
    /// keeps the roles pinned by the first. Call
    /// [`RunContext::reset_anchors`] before re-running with a changed
    /// requirement model.
    ///
    /// # Errors
    /// No library in the context, or a requirement model without pages.
    pub async fn run_closed_loop(
        &self,
        ctx: &mut RunContext,
        requirement: &RequirementModel,
        retrieval: &RetrievalOutcome,
    ) -> Result<ClosedLoopRun> {
        let library = ctx.library().cloned().ok_or(PipelineError::MissingLibrary)?;
        if requirement.pages.is_empty() {
            return Err(PipelineError::EmptyPages);
        }
        let bindings = retrieval.component_map();
        let mut recorder = TraceRecorder::new(TraceKind::ClosedLoop);
        let mut warnings = Vec::new();
        let mut pages = Vec::with_capacity(requirement.pages.len());
        tracing::info!(trace_id = %recorder.id(), pages = requirement.pages.len(), "closed loop started");

        for page in &requirement.pages {
            let timer = recorder.start_step("planner").for_page(&page.id);
            let outcome = self
                .planner
                .plan(
                    self.model(),
                    PlanInput {
                        requirement,
                        page,
                        library: &library,
                        bindings: &bindings,
                    },
                )
                .await;
            let model_assisted = outcome.is_model_assisted();
            let plan_warning = outcome.warning().map(str::to_string);
            let mut plan = outcome.into_plan();
            if let Some(background) = ctx.background() {
                plan.screen.background = Some(background.clone());
            }
            recorder.finish_step(
                timer,
                StepReport {
                    warning: plan_warning.clone(),
                    input_summary: format!("{} priorities", page.info_priorities.len()),
                    output_summary: format!(
                        "{} regions, {} items",
                        plan.regions.len(),
                        plan.item_count()
                    ),
                    detail: json!({ "modelAssisted": model_assisted }),
                },
            );
            warnings.extend(
                plan_warning
                    .as_ref()
                    .map(|w| format!("planner [{}]: {w}", page.id)),
            );

            let timer = recorder.start_step("reviewer").for_page(&page.id);
            let review = self.reviewer.review(ReviewInput {
                plan: &plan,
                requirement,
                page,
                library: &library,
                anchors: ctx.anchors(),
            });
            recorder.finish_step(
                timer,
                StepReport {
                    warning: None,
                    input_summary: format!("{} items", plan.item_count()),
                    output_summary: format!("{} issues", review.summary.total),
                    detail: serde_json::to_value(&review)?,
                },
            );

            let timer = recorder.start_step("repairer").for_page(&page.id);
            let repair = self.repairer.repair(
                RepairInput {
                    plan: &plan,
                    review: &review,
                    requirement,
                    page,
                    library: &library,
                },
                ctx.anchors_mut(),
            );
            recorder.finish_step(
                timer,
                StepReport {
                    warning: None,
                    input_summary: format!("{} issues", review.summary.total),
                    output_summary: format!("{} changes", repair.changes.len()),
                    detail: json!({
                        "changeLog": repair.change_log(),
                        "before": repair.before,
                        "after": repair.after,
                        "delta": repair.delta(),
                    }),
                },
            );

            ctx.record_plan(&page.id, repair.repaired.clone());
            pages.push(PageLayout {
                page_id: page.id.clone(),
                model_assisted,
                plan_warning,
                review,
                repair,
            });
        }

        let trace = recorder.finish();
        let trace_id = trace.id();
        self.persist(&trace, &mut warnings).await;
        Ok(ClosedLoopRun {
            trace_id,
            pages,
            warnings,
        })
    }

    /// Both entry points back to back
    ///
    /// # Errors
    /// Input errors of either entry point.
    pub async fn run_end_to_end(
        &self,
        ctx: &mut RunContext,
        document: &str,
    ) -> Result<(PipelineRun, ClosedLoopRun)> {
        let run = self.run_pipeline(ctx, document).await?;
        let layouts = self
            .run_closed_loop(ctx, &run.requirement, &run.retrieval)
            .await?;
        Ok((run, layouts))
    }

    /// Closed loop over a requirement model kept in a [`RequirementStore`]
    ///
    /// Retrieval is recomputed against the context's library; its warning, if
    /// any, leads the returned warnings.
    ///
    /// # Errors
    /// `PipelineError::MissingRequirement` for an unknown key, plus the input
    /// errors of [`Orchestrator::run_closed_loop`].
    pub async fn run_closed_loop_stored(
        &self,
        ctx: &mut RunContext,
        requirements: &dyn RequirementStore,
        key: &str,
    ) -> Result<ClosedLoopRun> {
        let requirement = requirements
            .get(key)
            .await?
            .ok_or_else(|| PipelineError::MissingRequirement(key.to_string()))?;
        let library = ctx.library().ok_or(PipelineError::MissingLibrary)?;
        let retrieval = self
            .retriever
            .retrieve(self.model(), &requirement, library)
            .await;
        let mut run = self.run_closed_loop(ctx, &requirement, &retrieval).await?;
        if let Some(warning) = retrieval.warning {
            run.warnings.insert(0, format!("retrieval: {warning}"));
        }
        Ok(run)
    }

    /// Fetch a stored trace
    ///
    /// # Errors
    /// Storage failures.
    pub async fn trace(&self, id: TraceId) -> Result<Option<Trace>> {
        self.traces.load(id).await
    }

    async fn persist(&self, trace: &Trace, warnings: &mut Vec<String>) {
        match self.traces.save(trace).await {
            Ok(()) => tracing::info!(trace_id = %trace.id(), steps = trace.steps().len(), "trace persisted"),
            Err(e) => {
                tracing::warn!(trace_id = %trace.id(), error = %e, "trace not persisted");
                warnings.push(format!("trace {} not persisted: {e}", trace.id()));
            }
        }
    }
}
