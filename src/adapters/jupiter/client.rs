//! Jupiter API Client
//!
//! HTTP client for the Jupiter swap API (`/quote`, `/swap`).
//! Rate-limited requests are backed off and replayed here; every other
//! failure is returned to the caller, whose retry policy decides.

use std::time::Duration;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::quote::{QuoteRequest, QuoteResponse};
use super::swap::{SwapRequest, SwapResponse};

pub const DEFAULT_JUPITER_API_URL: &str = "https://api.jup.ag/swap/v1";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JupiterError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),
    #[error("Invalid swap transaction: {0}")]
    InvalidTransaction(String),
}

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    pub api_base_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Replays allowed after a 429
    pub rate_limit_retries: u32,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_JUPITER_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            rate_limit_retries: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    pub fn new() -> Result<Self, JupiterError> {
        Self::with_config(JupiterConfig::default())
    }

    pub fn with_config(config: JupiterConfig) -> Result<Self, JupiterError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JupiterError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    /// Get a quote for a token swap
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, JupiterError> {
        let url = format!("{}/quote", self.config.api_base_url);
        let req = self.http.get(&url).query(&request.query_pairs());

        tracing::debug!(
            "Requesting quote {} -> {} amount={}",
            request.input_mint, request.output_mint, request.amount
        );
        let response = self.send(req).await?;
        Self::handle_response(response).await
    }

    /// Build the unsigned swap transaction for a quote
    pub async fn get_swap_transaction(&self, request: &SwapRequest) -> Result<SwapResponse, JupiterError> {
        let url = format!("{}/swap", self.config.api_base_url);
        let req = self.http.post(&url).json(request);

        let response = self.send(req).await?;
        Self::handle_response(response).await
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, JupiterError> {
        let req = match self.config.api_key {
            Some(ref api_key) => req.header("x-api-key", api_key),
            None => req,
        };

        let mut attempt = 0;
        loop {
            let response = req
                .try_clone()
                .ok_or_else(|| JupiterError::Http("Failed to clone request".into()))?
                .send()
                .await
                .map_err(|e| JupiterError::Http(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS
                || attempt >= self.config.rate_limit_retries
            {
                return Ok(response);
            }

            attempt += 1;
            let backoff = Duration::from_secs(2u64.pow(attempt)); // 2s, 4s, ...
            tracing::warn!(
                "Rate limited (429), backing off for {:?} (attempt {}/{})",
                backoff, attempt, self.config.rate_limit_retries
            );
            tokio::time::sleep(backoff).await;
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, JupiterError> {
        let status = response.status();
        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| JupiterError::Http(e.to_string()))?;
            return parse_body(&body);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, body))
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, JupiterError> {
    serde_json::from_str(body).map_err(|e| JupiterError::InvalidResponse(e.to_string()))
}

fn classify_failure(status: StatusCode, body: String) -> JupiterError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return JupiterError::RateLimited;
    }
    // 6001 is the on-chain slippage error code
    if body.contains("SlippageToleranceExceeded") || body.contains("6001") {
        return JupiterError::SlippageExceeded;
    }
    JupiterError::Api {
        status: status.as_u16(),
        body,
    }
}
