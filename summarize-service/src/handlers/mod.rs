//! HTTP handlers for the summarization gateway.

pub mod health;
pub mod summarize;
