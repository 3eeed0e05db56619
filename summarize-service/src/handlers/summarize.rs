use crate::models::{EmailRequest, SummaryResult};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use service_core::error::AppError;

/// `POST /summarize`: summarize a batch of emails, preserving order.
pub async fn summarize_emails(
    State(state): State<AppState>,
    payload: Result<Json<Vec<EmailRequest>>, JsonRejection>,
) -> Result<Json<Vec<SummaryResult>>, AppError> {
    let Json(emails) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected summarize payload");
        AppError::ValidationError(rejection.body_text())
    })?;

    tracing::info!(batch_size = emails.len(), "Summarizing email batch");

    let summaries = state.summarizer.summarize_batch(&emails).await?;

    Ok(Json(summaries))
}
