//! Pipeline configuration
//!
//! One TOML document configures every agent. Missing keys fall back to the
//! defaults, so an empty file is a valid configuration.

use crate::error::Result;
use panel_layout::{ReviewConfig, ScreenConfig};
use panel_llm::HttpModelConfig;
use panel_priority::OptimizerConfig;
use panel_retrieval::RetrievalWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trace persistence settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Directory for JSON trace files; traces stay in memory when unset
    pub directory: Option<PathBuf>,
}

/// Configuration for a whole pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub screen: ScreenConfig,
    pub optimizer: OptimizerConfig,
    pub retrieval: RetrievalWeights,
    pub review: ReviewConfig,
    pub trace: TraceConfig,
    /// Model endpoint; no model capability when unset
    pub model: Option<HttpModelConfig>,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With optimizer settings
    #[inline]
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// With reviewer thresholds
    #[inline]
    #[must_use]
    pub fn with_review(mut self, review: ReviewConfig) -> Self {
        self.review = review;
        self
    }

    /// With target screen
    #[inline]
    #[must_use]
    pub fn with_screen(mut self, screen: ScreenConfig) -> Self {
        self.screen = screen;
        self
    }

    /// With trace directory
    #[inline]
    #[must_use]
    pub fn with_trace_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.trace.directory = Some(directory.into());
        self
    }

    /// With model endpoint
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: HttpModelConfig) -> Self {
        self.model = Some(model);
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `PipelineError::Config` when the text is not valid TOML for this shape.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `PipelineError::Io` when the file cannot be read, `Config` when it
    /// cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// `PipelineError::ConfigRender` when serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config.optimizer, OptimizerConfig::default());
        assert_eq!(config.review.max_items_per_region, 6);
        assert_eq!(config.screen.width, 1920);
        assert!(config.model.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [optimizer]
            generations = 5

            [review]
            hero_priority_threshold = 2

            [model]
            base_url = "http://llm.internal/v1"
            "#,
        )
        .unwrap();
        assert_eq!(config.optimizer.generations, 5);
        assert_eq!(config.optimizer.population_size, 12);
        assert_eq!(config.review.hero_priority_threshold, 2);
        assert_eq!(config.review.max_items_per_region, 6);
        let model = config.model.unwrap();
        assert_eq!(model.base_url, "http://llm.internal/v1");
        assert_eq!(model.timeout_secs, HttpModelConfig::default().timeout_secs);
    }

    #[test]
    fn rendered_config_parses_back() {
        let config = PipelineConfig::new().with_trace_dir("/tmp/traces");
        let text = config.to_toml_string().unwrap();
        let parsed = PipelineConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.trace, config.trace);
        assert_eq!(parsed.retrieval, config.retrieval);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.toml");
        std::fs::write(&path, "[screen]\nwidth = 2560\n").unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.screen.width, 2560);
        assert_eq!(config.screen.height, 1080);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = PipelineConfig::from_toml_str("[optimizer\n").unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::Config(_)));
    }
}
