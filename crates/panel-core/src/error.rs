//! Error types for Panel Core
//!
//! Only input and infrastructure problems surface as errors. Model
//! capability failures never do; they degrade to deterministic fallbacks
//! and are reported as warnings on the run.

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Document text missing or malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No requirement model where one is needed
    #[error("requirement model missing: {0}")]
    MissingRequirement(String),

    /// No component library in the run context
    #[error("component library missing")]
    MissingLibrary,

    /// Requirement model declares no pages
    #[error("requirement model has no pages")]
    EmptyPages,

    /// Trace or requirement storage failed
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("configuration render error: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// Model client could not be constructed from configuration
    #[error("model client setup failed: {0}")]
    ModelClient(#[from] panel_llm::LlmError),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the caller supplied bad input (as opposed to an environment failure)
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::MissingRequirement(_) | Self::MissingLibrary | Self::EmptyPages
        )
    }
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
