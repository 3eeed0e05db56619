#![allow(dead_code)]

use secrecy::Secret;
use service_core::config::Config;
use std::time::Duration;
use summarize_service::config::{GeminiSettings, SummarizeConfig};
use summarize_service::startup::Application;

pub const TEST_MODEL: &str = "gemini-test";

/// Config bound to a random local port.
pub fn test_config(api_key: Option<&str>, api_base: &str) -> SummarizeConfig {
    SummarizeConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        gemini: GeminiSettings {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            model: TEST_MODEL.to_string(),
            api_base: api_base.to_string(),
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the full application built from `config`.
    pub async fn spawn(config: SummarizeConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    async fn run(app: Application) -> Self {
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();

        // Wait for the server to accept connections
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self { address, client }
    }

    pub async fn summarize(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/summarize", self.address))
            .json(&body)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// A Gemini `generateContent` response whose only candidate carries `text`.
pub fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 42, "candidatesTokenCount": 17, "totalTokenCount": 59 }
    })
}

pub fn email(sender: &str, subject: &str, body: &str) -> serde_json::Value {
    serde_json::json!({ "sender": sender, "subject": subject, "body": body })
}
