//! BrasilAPI company lookup (fallback provider)
//!
//! Resolves a CNPJ through the public BrasilAPI gateway:
//! `GET {base}/cnpj/v1/{cnpj}`. The endpoint is unauthenticated and imposes
//! no per-client quota, so no rate limiter is involved; it is only consulted
//! after the primary provider has failed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cnpj::Cnpj;
use crate::config::ProviderConfig;
use crate::error::LookupError;
use crate::models::{Address, CompanyRecord};

use super::{require_legal_name, transport_error, CompanyDataProvider};

/// Response body shape of the BrasilAPI CNPJ endpoint
#[derive(Debug, Deserialize)]
struct BrasilApiResponse {
    razao_social: Option<String>,
    logradouro: Option<String>,
    numero: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    municipio: Option<String>,
    uf: Option<String>,
    cep: Option<String>,
}

/// Error body returned by BrasilAPI on 4xx responses
#[derive(Debug, Deserialize)]
struct BrasilApiError {
    message: Option<String>,
}

/// BrasilAPI-backed company data provider
pub struct BrasilApiProvider {
    client: Client,
    base_url: String,
}

impl BrasilApiProvider {
    /// Create a provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompanyDataProvider for BrasilApiProvider {
    fn name(&self) -> &str {
        "brasilapi"
    }

    async fn resolve(&self, cnpj: &Cnpj) -> Result<CompanyRecord, LookupError> {
        let url = format!("{}/cnpj/v1/{}", self.base_url, cnpj.digits());
        debug!(url = %url, cnpj = %cnpj, "Querying BrasilAPI");

        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => {
                let body: BrasilApiResponse = response
                    .json()
                    .await
                    .map_err(|e| LookupError::InvalidData(e.to_string()))?;
                normalize(body)
            }
            StatusCode::BAD_REQUEST => {
                let message = response
                    .json::<BrasilApiError>()
                    .await
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| "bad request".to_string());

                debug!(cnpj = %cnpj, message = %message, "BrasilAPI rejected the request");
                Err(LookupError::InvalidData(message))
            }
            StatusCode::NOT_FOUND => {
                debug!(cnpj = %cnpj, "BrasilAPI has no record (404)");
                Err(LookupError::NotFound)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let wait = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                warn!(cnpj = %cnpj, retry_after = wait, "Rate limited by BrasilAPI");
                Err(LookupError::RateLimited(wait))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(cnpj = %cnpj, status = ?response.status(), "BrasilAPI rejected credentials");
                Err(LookupError::Unauthorized)
            }
            status => {
                warn!(cnpj = %cnpj, status = status.as_u16(), "BrasilAPI error response");
                Err(LookupError::ServerError(status.as_u16()))
            }
        }
    }
}

/// Normalize the BrasilAPI body into a [`CompanyRecord`]
fn normalize(body: BrasilApiResponse) -> Result<CompanyRecord, LookupError> {
    let legal_name = require_legal_name(body.razao_social)?;

    Ok(CompanyRecord {
        legal_name,
        address: Address {
            street: body.logradouro.unwrap_or_default(),
            number: body.numero.unwrap_or_default(),
            complement: body.complemento.unwrap_or_default(),
            district: body.bairro.unwrap_or_default(),
            municipality: body.municipio.unwrap_or_default(),
            state: body.uf.unwrap_or_default(),
            postal_code: body.cep.unwrap_or_default(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_cnpj() -> Cnpj {
        Cnpj::parse("11222333000181").unwrap()
    }

    fn provider(base_url: &str) -> BrasilApiProvider {
        BrasilApiProvider::new(&ProviderConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            api_token: None,
        })
        .unwrap()
    }

    // Test 1: Successful lookup normalizes the full response
    #[tokio::test]
    async fn test_successful_lookup() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "razao_social": "Empresa Exemplo LTDA",
                "logradouro": "Rua das Flores",
                "numero": "42",
                "complemento": "Sala 3",
                "bairro": "Centro",
                "municipio": "Curitiba",
                "uf": "PR",
                "cep": "80010000"
            })))
            .mount(&mock_server)
            .await;

        let record = provider(&mock_server.uri())
            .resolve(&test_cnpj())
            .await
            .unwrap();

        assert_eq!(record.legal_name, "Empresa Exemplo LTDA");
        assert_eq!(record.address.street, "Rua das Flores");
        assert_eq!(record.address.number, "42");
        assert_eq!(record.address.state, "PR");
        assert_eq!(record.address.postal_code, "80010000");
    }

    // Test 2: 404 maps to NotFound
    #[tokio::test]
    async fn test_404_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri()).resolve(&test_cnpj()).await;
        assert_eq!(result.unwrap_err(), LookupError::NotFound);
    }

    // Test 3: 400 carries the upstream message as InvalidData
    #[tokio::test]
    async fn test_400_invalid_data_with_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "message": "CNPJ invalido"
            })))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri()).resolve(&test_cnpj()).await;
        assert_eq!(
            result.unwrap_err(),
            LookupError::InvalidData("CNPJ invalido".to_string())
        );
    }

    // Test 4: 400 without a body still maps to InvalidData
    #[tokio::test]
    async fn test_400_without_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri()).resolve(&test_cnpj()).await;
        assert!(matches!(result.unwrap_err(), LookupError::InvalidData(_)));
    }

    // Test 5: Missing legal name is treated as NotFound
    #[tokio::test]
    async fn test_missing_legal_name_is_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logradouro": "Rua das Flores"
            })))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri()).resolve(&test_cnpj()).await;
        assert_eq!(result.unwrap_err(), LookupError::NotFound);
    }

    // Test 6: 403 maps to Unauthorized
    #[tokio::test]
    async fn test_403_unauthorized() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri()).resolve(&test_cnpj()).await;
        assert_eq!(result.unwrap_err(), LookupError::Unauthorized);
    }

    // Test 7: 5xx maps to ServerError
    #[tokio::test]
    async fn test_5xx_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri()).resolve(&test_cnpj()).await;
        assert_eq!(result.unwrap_err(), LookupError::ServerError(502));
    }

    // Test 8: 429 maps to RateLimited
    #[tokio::test]
    async fn test_429_rate_limited() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cnpj/v1/11222333000181"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri()).resolve(&test_cnpj()).await;
        assert_eq!(result.unwrap_err(), LookupError::RateLimited(30));
    }
}
