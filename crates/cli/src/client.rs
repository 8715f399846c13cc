//! API client for communicating with the price server

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the price server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // Prefer the server's error message over the raw body
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn predict(&self, request: &PredictRequest) -> Result<PredictionResponse> {
        self.post("predict", request).await
    }

    pub async fn schema(&self) -> Result<SchemaResponse> {
        self.get("schema").await
    }

    /// Health is reported even when the server answers 503
    pub async fn health(&self) -> Result<HealthStatus> {
        let health_url = self.base_url.join("healthz").context("Invalid path")?;
        let ready_url = self.base_url.join("readyz").context("Invalid path")?;

        let health: HealthResponse = self
            .client
            .get(health_url)
            .send()
            .await
            .context("Failed to send request")?
            .json()
            .await
            .context("Failed to parse health response")?;

        let readiness: ReadinessResponse = self
            .client
            .get(ready_url)
            .send()
            .await
            .context("Failed to send request")?
            .json()
            .await
            .context("Failed to parse readiness response")?;

        Ok(HealthStatus { health, readiness })
    }
}

// API request and response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub sqft: u32,
    pub floors: f64,
    pub age: u32,
    pub waterfront: bool,
    pub garage: bool,
    pub garden: bool,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub version: String,
    pub kind: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelHealth {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub columns: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: ModelHealth,
    pub checked_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub health: HealthResponse,
    pub readiness: ReadinessResponse,
}
