//! The model-backed capability seam

use crate::decode::resilient_decode;
use crate::error::LlmError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// "Ask a model for structured JSON given a prompt"
///
/// Implementations return the raw completion text. Callers must tolerate
/// non-JSON or truncated text; see [`request_json`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelCapability: Send + Sync {
    /// Complete a system + user prompt pair
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

/// Capability used when no model is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModel;

#[async_trait]
impl ModelCapability for NoModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        Err(LlmError::Unavailable("no model configured".to_string()))
    }
}

/// Call the model and decode its answer into `T`
///
/// # Errors
/// The transport error from the capability, or `LlmError::Decode` when no
/// decode strategy recovers a `T` from the text.
pub async fn request_json<T: DeserializeOwned>(
    model: &dyn ModelCapability,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<T, LlmError> {
    let raw = model.complete(system_prompt, user_prompt).await?;
    tracing::debug!(response_len = raw.len(), "model responded");
    resilient_decode(&raw).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Answer {
        value: u32,
    }

    #[tokio::test]
    async fn request_json_decodes_noisy_response() {
        let mut model = MockModelCapability::new();
        model
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("The answer is {\"value\": 7}.".to_string()));

        let answer: Answer = request_json(&model, "sys", "user").await.unwrap();
        assert_eq!(answer.value, 7);
    }

    #[tokio::test]
    async fn request_json_propagates_transport_error() {
        let mut model = MockModelCapability::new();
        model
            .expect_complete()
            .returning(|_, _| Err(LlmError::Status { code: 503 }));

        let result: Result<Answer, _> = request_json(&model, "sys", "user").await;
        assert_eq!(result.unwrap_err(), LlmError::Status { code: 503 });
    }

    #[tokio::test]
    async fn request_json_reports_decode_failure() {
        let mut model = MockModelCapability::new();
        model
            .expect_complete()
            .returning(|_, _| Ok("I cannot help with that".to_string()));

        let result: Result<Answer, _> = request_json(&model, "sys", "user").await;
        assert!(matches!(result, Err(LlmError::Decode { .. })));
    }

    #[tokio::test]
    async fn no_model_is_unavailable() {
        let result = NoModel.complete("a", "b").await;
        assert!(matches!(result, Err(LlmError::Unavailable(_))));
    }
}
