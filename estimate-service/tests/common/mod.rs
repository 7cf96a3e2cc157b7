//! Test helper module for estimate-service integration tests.

#![allow(dead_code)]

use estimate_service::config::EstimateConfig;
use estimate_service::services::init_metrics;
use estimate_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(EstimateConfig::default()).await
    }

    pub async fn spawn_with(mut config: EstimateConfig) -> Self {
        init_metrics();
        config.common.port = 0; // Random port for testing

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn summarize(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/cost-estimates/summary", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
