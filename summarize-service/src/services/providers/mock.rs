//! Mock provider implementation for testing.

use super::{GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Responder = dyn Fn(&str) -> Result<ProviderResponse, ProviderError> + Send + Sync;

/// Mock text provider whose answer is computed from the prompt.
pub struct MockTextProvider {
    responder: Arc<Responder>,
    calls: AtomicUsize,
}

impl MockTextProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<ProviderResponse, ProviderError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer with the same text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(ProviderResponse::text(text.clone())))
    }

    /// Number of `generate` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(prompt)
    }
}
