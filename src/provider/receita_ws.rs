//! ReceitaWS company lookup (primary provider)
//!
//! Resolves a CNPJ through the ReceitaWS API:
//! `GET {base}/v1/cnpj/{cnpj}`. The free tier enforces a strict
//! requests-per-minute quota, so every call goes through the injected
//! [`RateLimiter`] before touching the upstream. A commercial API token, when
//! configured, is sent as a bearer credential.
//!
//! ReceitaWS reports missing or rejected identifiers as HTTP 200 with
//! `status: "ERROR"` in the body; normalization maps that back into the
//! regular error taxonomy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cnpj::Cnpj;
use crate::config::ProviderConfig;
use crate::error::LookupError;
use crate::models::{Address, CompanyRecord};
use crate::sync::RateLimiter;

use super::{require_legal_name, transport_error, CompanyDataProvider};

/// Wait hint used when a 429 response carries no Retry-After header
const RATE_LIMIT_WAIT_SECS: u64 = 60;

/// Response body shape of the ReceitaWS CNPJ endpoint
#[derive(Debug, Deserialize)]
struct ReceitaWsResponse {
    status: Option<String>,
    message: Option<String>,
    nome: Option<String>,
    logradouro: Option<String>,
    numero: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    municipio: Option<String>,
    uf: Option<String>,
    cep: Option<String>,
}

/// ReceitaWS-backed company data provider
pub struct ReceitaWsProvider {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    limiter: Arc<RateLimiter>,
}

impl ReceitaWsProvider {
    /// Create a provider from configuration and its dedicated rate limiter
    pub fn new(config: &ProviderConfig, limiter: Arc<RateLimiter>) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            limiter,
        })
    }
}

#[async_trait]
impl CompanyDataProvider for ReceitaWsProvider {
    fn name(&self) -> &str {
        "receitaws"
    }

    async fn resolve(&self, cnpj: &Cnpj) -> Result<CompanyRecord, LookupError> {
        // Quota is consumed before the request is even built; the limiter
        // blocks rather than erroring when the window is exhausted.
        self.limiter.acquire().await;

        let url = format!("{}/v1/cnpj/{}", self.base_url, cnpj.digits());
        debug!(url = %url, cnpj = %cnpj, "Querying ReceitaWS");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => {
                let body: ReceitaWsResponse = response
                    .json()
                    .await
                    .map_err(|e| LookupError::InvalidData(e.to_string()))?;
                normalize(body)
            }
            StatusCode::NOT_FOUND => {
                debug!(cnpj = %cnpj, "ReceitaWS has no record (404)");
                Err(LookupError::NotFound)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let wait = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(RATE_LIMIT_WAIT_SECS);

                warn!(cnpj = %cnpj, retry_after = wait, "Rate limited by ReceitaWS");
                Err(LookupError::RateLimited(wait))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(cnpj = %cnpj, status = ?response.status(), "ReceitaWS rejected credentials");
                Err(LookupError::Unauthorized)
            }
            status => {
                warn!(cnpj = %cnpj, status = status.as_u16(), "ReceitaWS error response");
                Err(LookupError::ServerError(status.as_u16()))
            }
        }
    }
}

/// Normalize the ReceitaWS body into a [`CompanyRecord`]
fn normalize(body: ReceitaWsResponse) -> Result<CompanyRecord, LookupError> {
    // A 200 with status ERROR is how ReceitaWS reports failures
    if body.status.as_deref() == Some("ERROR") {
        let message = body.message.unwrap_or_else(|| "unknown error".to_string());
        if message.to_lowercase().contains("inval") {
            return Err(LookupError::InvalidData(format!("CNPJ rejected: {}", message)));
        }
        debug!(message = %message, "ReceitaWS returned status ERROR");
        return Err(LookupError::NotFound);
    }

    let legal_name = require_legal_name(body.nome)?;

    Ok(CompanyRecord {
        legal_name,
        address: Address {
            street: body.logradouro.unwrap_or_default(),
            number: body.numero.unwrap_or_default(),
            complement: body.complemento.unwrap_or_default(),
            district: body.bairro.unwrap_or_default(),
            municipality: body.municipio.unwrap_or_default(),
            state: body.uf.unwrap_or_default(),
            // ReceitaWS formats the CEP as 00.000-000; store bare digits
            postal_code: strip_cep(body.cep),
        },
    })
}

/// Strip formatting from the upstream CEP value
fn strip_cep(cep: Option<String>) -> String {
    cep.map(|c| c.chars().filter(|ch| ch.is_ascii_digit()).collect())
        .unwrap_or_default()
}
