use service_core::observability::init_tracing;
use summarize_service::config::SummarizeConfig;
use summarize_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = SummarizeConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("summarize-service", "info", otlp_endpoint.as_deref());

    let app = Application::build(config)
        .await
        .map_err(|e| std::io::Error::other(format!("Startup error: {}", e)))?;

    app.run_until_stopped().await
}
