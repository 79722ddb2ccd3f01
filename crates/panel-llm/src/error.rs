//! Error types for model calls

/// Failure of the model-backed capability
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// No model configured
    #[error("model capability unavailable: {0}")]
    Unavailable(String),

    /// Connection or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("model endpoint returned status {code}")]
    Status { code: u16 },

    /// Request exceeded its deadline
    #[error("model call timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Response could not be decoded into the expected shape
    #[error("undecodable model response: {reason}")]
    Decode { reason: String },
}

impl LlmError {
    /// Whether a later call could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { code } => *code == 429 || *code >= 500,
            Self::Unavailable(_) | Self::Decode { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(LlmError::Timeout { duration_secs: 30 }.is_transient());
        assert!(LlmError::Status { code: 503 }.is_transient());
        assert!(LlmError::Status { code: 429 }.is_transient());
        assert!(!LlmError::Status { code: 400 }.is_transient());
        assert!(!LlmError::Unavailable("off".into()).is_transient());
    }

    #[test]
    fn error_display() {
        let err = LlmError::Status { code: 502 };
        assert_eq!(err.to_string(), "model endpoint returned status 502");
    }
}
