//! Domain models for the summarization gateway.

pub mod email;

pub use email::{EmailRequest, SummaryResult};
