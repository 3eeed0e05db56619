use serde::{Deserialize, Serialize};

/// One email submitted for summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub sender: String,
    pub subject: String,
    pub body: String,
}

/// Summary and reply draft produced for a single email.
///
/// Parsed straight from the model output: unknown keys are ignored, both fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub reply_draft: String,
}
