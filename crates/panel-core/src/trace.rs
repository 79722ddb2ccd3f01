//! Audit traces of orchestrated runs
//!
//! A [`TraceRecorder`] collects steps while a run is in progress and is
//! consumed into an immutable [`Trace`] when the run ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;
use ulid::Ulid;

/// Unique trace identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TraceId(pub Ulid);

impl TraceId {
    /// Generate new trace ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TraceId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Which entry point produced the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceKind {
    /// Extraction through retrieval
    Pipeline,
    /// Plan, review and repair per page
    ClosedLoop,
}

/// Outcome of one agent step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    /// Agent fell back to its deterministic path
    Degraded { warning: String },
}

/// One agent step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub agent: String,
    /// Page the step worked on, if page-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub status: StepStatus,
    pub input_summary: String,
    pub output_summary: String,
    /// Agent-specific payload (e.g. optimizer generation history)
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Immutable record of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    id: TraceId,
    kind: TraceKind,
    created_at: DateTime<Utc>,
    steps: Vec<TraceStep>,
}

impl Trace {
    #[must_use]
    pub fn id(&self) -> TraceId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> TraceKind {
        self.kind
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Warnings of all degraded steps, in order
    #[must_use]
    pub fn warnings(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match &s.status {
                StepStatus::Degraded { warning } => Some(warning.as_str()),
                StepStatus::Ok => None,
            })
            .collect()
    }
}

/// A step in progress
#[derive(Debug)]
pub struct StepTimer {
    agent: String,
    page_id: Option<String>,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl StepTimer {
    /// Scope the step to a page
    #[must_use]
    pub fn for_page(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }
}

/// Step summaries handed to [`TraceRecorder::finish_step`]
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub warning: Option<String>,
    pub input_summary: String,
    pub output_summary: String,
    pub detail: serde_json::Value,
}

/// Collects steps for one run
#[derive(Debug)]
pub struct TraceRecorder {
    id: TraceId,
    kind: TraceKind,
    created_at: DateTime<Utc>,
    steps: Vec<TraceStep>,
}

impl TraceRecorder {
    #[must_use]
    pub fn new(kind: TraceKind) -> Self {
        Self {
            id: TraceId::new(),
            kind,
            created_at: Utc::now(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TraceId {
        self.id
    }

    /// Start timing an agent step
    #[must_use]
    pub fn start_step(&self, agent: &str) -> StepTimer {
        tracing::debug!(trace_id = %self.id, agent, "step started");
        StepTimer {
            agent: agent.to_string(),
            page_id: None,
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    /// Close a step
    pub fn finish_step(&mut self, timer: StepTimer, report: StepReport) {
        let duration_ms = u64::try_from(timer.clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status = match report.warning {
            Some(warning) => {
                tracing::warn!(trace_id = %self.id, agent = %timer.agent, %warning, "step degraded");
                StepStatus::Degraded { warning }
            }
            None => StepStatus::Ok,
        };
        self.steps.push(TraceStep {
            agent: timer.agent,
            page_id: timer.page_id,
            started_at: timer.started_at,
            duration_ms,
            status,
            input_summary: report.input_summary,
            output_summary: report.output_summary,
            detail: report.detail,
        });
    }

    /// Freeze into an immutable trace
    #[must_use]
    pub fn finish(self) -> Trace {
        Trace {
            id: self.id,
            kind: self.kind,
            created_at: self.created_at,
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recorder_freezes_steps_in_order() {
        let mut recorder = TraceRecorder::new(TraceKind::Pipeline);
        let timer = recorder.start_step("extraction");
        recorder.finish_step(
            timer,
            StepReport {
                warning: Some("no model capability".to_string()),
                input_summary: "12 lines".to_string(),
                ..StepReport::default()
            },
        );
        let timer = recorder.start_step("optimizer").for_page("p1");
        recorder.finish_step(timer, StepReport::default());

        let id = recorder.id();
        let trace = recorder.finish();
        assert_eq!(trace.id(), id);
        assert_eq!(trace.steps().len(), 2);
        assert_eq!(trace.steps()[1].page_id.as_deref(), Some("p1"));
        assert_eq!(trace.warnings(), vec!["no model capability"]);
    }

    #[test]
    fn trace_json_has_id_and_steps() {
        let mut recorder = TraceRecorder::new(TraceKind::ClosedLoop);
        let timer = recorder.start_step("planner");
        recorder.finish_step(timer, StepReport::default());
        let trace = recorder.finish();

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["id"], trace.id().to_string());
        assert_eq!(json["kind"], "closed-loop");
        assert_eq!(json["steps"][0]["status"], "ok");

        let back: Trace = serde_json::from_value(json).unwrap();
        assert_eq!(back, trace);
    }

    #[test]
    fn trace_id_parses_from_display() {
        let id = TraceId::new();
        assert_eq!(id.to_string().parse::<TraceId>().unwrap(), id);
        assert!("not-a-ulid".parse::<TraceId>().is_err());
    }
}
