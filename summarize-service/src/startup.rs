//! Application startup and lifecycle management.
//!
//! Builds the provider once, injects it into the router state and serves
//! `/health` and `/summarize` until a shutdown signal arrives.

use crate::config::SummarizeConfig;
use crate::handlers::{health::health_check, summarize::summarize_emails};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::Summarizer;
use axum::{
    body::Body,
    http::{header, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub summarizer: Summarizer,
}

impl AppState {
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self {
            summarizer: Summarizer::new(provider),
        }
    }
}

/// Build the Gemini provider, or `None` if it cannot be used.
///
/// A missing key or a client that fails to build only disables `/summarize`.
pub fn init_provider(config: &SummarizeConfig) -> Option<Arc<dyn TextProvider>> {
    let Some(gemini_config) = GeminiConfig::from_settings(&config.gemini) else {
        tracing::warn!("GEMINI_API_KEY not set; /summarize will return configuration errors");
        return None;
    };

    match GeminiTextProvider::new(gemini_config) {
        Ok(provider) => {
            tracing::info!(model = %provider.model(), "Initialized Gemini text provider");
            let text_provider: Arc<dyn TextProvider> = Arc::new(provider);
            Some(text_provider)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Gemini text provider");
            None
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/summarize", post(summarize_emails))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: SummarizeConfig) -> Result<Self, AppError> {
        let state = AppState::new(init_provider(&config));
        Self::build_with_state(&config, state).await
    }

    /// Build with an already constructed state (port 0 = random port for testing).
    pub async fn build_with_state(
        config: &SummarizeConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        let address = config.common.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            summarize_enabled = state.summarizer.is_configured(),
            "Summarize service listening"
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal is received.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
