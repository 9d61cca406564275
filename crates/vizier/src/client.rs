// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use async_trait::async_trait;
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ClientError;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| Client::builder().build().expect("HTTP client"));

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub database_id: String,
    pub natural_language_query: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInsights {
    #[serde(default)]
    pub insight_text: Option<String>,
    #[serde(default)]
    pub chart_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub sql_query: Option<String>,
    #[serde(default)]
    pub insights: Option<ServiceInsights>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Seam to the external query-execution service, so the engine can be driven
/// by a scripted implementation in tests.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn execute(&self, request: &QueryRequest) -> Result<ServiceResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        dotenv().ok();
        Self {
            endpoint: std::env::var("VIZIER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/queries/execute".to_string()),
            api_token: std::env::var("VIZIER_SERVICE_TOKEN").ok(),
            timeout: Duration::from_secs(
                std::env::var("VIZIER_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

/// HTTP implementation of [`QueryService`]. One bounded request per call; the
/// timeout is the only cap on worst-case latency, and cancellation is not
/// supported.
#[derive(Debug, Clone)]
pub struct HttpQueryService {
    config: ServiceConfig,
}

impl HttpQueryService {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(ServiceConfig::default())
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn execute(&self, request: &QueryRequest) -> Result<ServiceResponse, ClientError> {
        debug!(endpoint = %self.config.endpoint, query = %request.natural_language_query, "Sending query to insight service");

        let mut builder = HTTP_CLIENT
            .post(&self.config.endpoint)
            .timeout(self.config.timeout)
            .json(request);
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        info!(%status, "Received response from insight service");

        let body: Value = response.json().await?;

        if !status.is_success() {
            // Error bodies may be a plain {detail} rather than the full contract.
            let message = body
                .get("message")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("query service returned status {status}"));
            let guidance = body
                .pointer("/insights/insight_text")
                .and_then(Value::as_str)
                .map(str::to_string);
            return Err(ClientError::Service { message, guidance });
        }

        let decoded: ServiceResponse = serde_json::from_value(body)?;
        if !decoded.success {
            let guidance = decoded
                .insights
                .as_ref()
                .and_then(|i| i.insight_text.clone());
            return Err(ClientError::Service {
                message: decoded
                    .message
                    .unwrap_or_else(|| "query execution failed".to_string()),
                guidance,
            });
        }

        Ok(decoded)
    }
}
