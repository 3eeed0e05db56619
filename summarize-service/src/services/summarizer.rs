//! Batch summarization: one provider call per email, all in flight at once.

use crate::models::{EmailRequest, SummaryResult};
use crate::services::prompt::build_summary_prompt;
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use futures::future::join_all;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Gemini API not configured. Check GEMINI_API_KEY.")]
    NotConfigured,

    #[error("Error parsing Gemini's response: {0}")]
    MalformedResponse(String),

    #[error("An error occurred with the Gemini API: {0}")]
    Provider(#[from] ProviderError),
}

impl From<SummarizeError> for AppError {
    fn from(err: SummarizeError) -> Self {
        match err {
            SummarizeError::NotConfigured => {
                AppError::ConfigError(anyhow::anyhow!(err.to_string()))
            }
            SummarizeError::MalformedResponse(_) | SummarizeError::Provider(_) => {
                AppError::UpstreamError(err.to_string())
            }
        }
    }
}

/// Summarizes email batches through an optional provider.
///
/// The provider is `None` when startup could not configure one; every batch then fails.
#[derive(Clone)]
pub struct Summarizer {
    provider: Option<Arc<dyn TextProvider>>,
}

impl Summarizer {
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self { provider }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Summarize every email, returning results in input order.
    ///
    /// All calls are started before any is awaited. The batch fails as a whole if any call
    /// errors or returns something other than a `summary`/`reply_draft` object.
    #[instrument(skip_all, fields(batch_size = emails.len()))]
    pub async fn summarize_batch(
        &self,
        emails: &[EmailRequest],
    ) -> Result<Vec<SummaryResult>, SummarizeError> {
        let provider = self.provider.as_deref().ok_or(SummarizeError::NotConfigured)?;

        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let params = GenerationParams::json();
        let calls = emails
            .iter()
            .map(|email| summarize_one(provider, email, &params));

        let results = join_all(calls).await;

        let summaries = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        tracing::info!(count = summaries.len(), "Batch summarized");
        Ok(summaries)
    }
}

async fn summarize_one(
    provider: &dyn TextProvider,
    email: &EmailRequest,
    params: &GenerationParams,
) -> Result<SummaryResult, SummarizeError> {
    let prompt = build_summary_prompt(email);
    let response = provider.generate(&prompt, params).await?;

    tracing::debug!(
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        finish_reason = ?response.finish_reason,
        "Provider call completed"
    );

    // A blocked prompt or empty candidate list is a failed call, not a malformed answer.
    let text = response
        .text
        .ok_or_else(|| ProviderError::ApiError("response contained no text".to_string()))?;
    parse_summary(&text)
}

/// Parse the model's JSON text into a [`SummaryResult`].
pub fn parse_summary(text: &str) -> Result<SummaryResult, SummarizeError> {
    serde_json::from_str(text).map_err(|e| SummarizeError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockTextProvider;
    use crate::services::providers::ProviderResponse;
    use axum::http::StatusCode;

    fn email(subject: &str) -> EmailRequest {
        EmailRequest {
            sender: "a@x.com".to_string(),
            subject: subject.to_string(),
            body: "body".to_string(),
        }
    }

    /// Echoes the subject line back as the summary so results can be matched to inputs.
    fn echo_provider() -> Arc<MockTextProvider> {
        Arc::new(MockTextProvider::new(|prompt| {
            let subject = prompt
                .lines()
                .find_map(|l| l.strip_prefix("Subject: "))
                .unwrap_or_default();
            Ok(ProviderResponse::text(
                serde_json::json!({ "summary": subject, "reply_draft": "ok" }).to_string(),
            ))
        }))
    }

    #[tokio::test]
    async fn results_follow_input_order() {
        let provider = echo_provider();
        let summarizer = Summarizer::new(Some(provider.clone()));
        let emails = vec![email("one"), email("two"), email("three")];

        let results = summarizer.summarize_batch(&emails).await.unwrap();

        let summaries: Vec<_> = results.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(summaries, ["one", "two", "three"]);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let provider = echo_provider();
        let summarizer = Summarizer::new(Some(provider.clone()));

        let results = summarizer.summarize_batch(&[]).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn missing_provider_is_a_configuration_error() {
        let summarizer = Summarizer::new(None);
        assert!(!summarizer.is_configured());

        let err = summarizer.summarize_batch(&[email("x")]).await.unwrap_err();
        assert!(matches!(err, SummarizeError::NotConfigured));

        let app_err = AppError::from(err);
        assert_eq!(app_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app_err.detail(), "Gemini API not configured. Check GEMINI_API_KEY.");
    }

    #[tokio::test]
    async fn one_malformed_item_fails_the_batch() {
        let provider = Arc::new(MockTextProvider::new(|prompt| {
            if prompt.contains("Subject: bad") {
                Ok(ProviderResponse::text(r#"{"summary":"only half"}"#))
            } else {
                Ok(ProviderResponse::text(r#"{"summary":"s","reply_draft":"r"}"#))
            }
        }));
        let summarizer = Summarizer::new(Some(provider.clone()));

        let err = summarizer
            .summarize_batch(&[email("good"), email("bad"), email("good")])
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::MalformedResponse(_)));
        assert!(err.to_string().starts_with("Error parsing Gemini's response:"));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn provider_error_fails_the_batch() {
        let provider = Arc::new(MockTextProvider::new(|prompt| {
            if prompt.contains("Subject: second") {
                Err(ProviderError::RateLimited)
            } else {
                Ok(ProviderResponse::text(r#"{"summary":"s","reply_draft":"r"}"#))
            }
        }));
        let summarizer = Summarizer::new(Some(provider));

        let err = summarizer
            .summarize_batch(&[email("first"), email("second")])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "An error occurred with the Gemini API: Rate limited");
    }

    #[tokio::test]
    async fn response_without_text_is_a_provider_error() {
        let provider = Arc::new(MockTextProvider::new(|_| {
            Ok(ProviderResponse {
                text: None,
                ..ProviderResponse::text("")
            })
        }));
        let summarizer = Summarizer::new(Some(provider));

        let err = summarizer.summarize_batch(&[email("x")]).await.unwrap_err();
        assert!(matches!(err, SummarizeError::Provider(ProviderError::ApiError(_))));
        assert_eq!(
            err.to_string(),
            "An error occurred with the Gemini API: API error: response contained no text"
        );
    }

    #[test]
    fn parse_summary_rejects_non_json() {
        assert!(parse_summary("Sure! Here is your summary").is_err());
        assert!(parse_summary(r#"{"summary": 1, "reply_draft": "r"}"#).is_err());
    }
}
