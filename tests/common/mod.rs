//! Shared helpers for integration tests
//!
//! Each test wires the real resolver against two wiremock servers standing in
//! for ReceitaWS and BrasilAPI, and an in-memory SQLite store. Sync configs
//! use zero delays so runs complete instantly on the real clock.

#![allow(dead_code)]

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seller_sync::config::{ProviderConfig, RateLimitConfig, SyncConfig};
use seller_sync::models::NewSeller;
use seller_sync::provider::{BrasilApiProvider, ReceitaWsProvider};
use seller_sync::resolver::LookupResolver;
use seller_sync::store::{SellerStore, SqliteSellerStore};
use seller_sync::sync::RateLimiter;

pub fn provider_config(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        api_token: None,
    }
}

/// Real resolver over two mock upstreams, with an effectively unlimited quota
pub fn resolver(receita: &MockServer, brasil: &MockServer) -> Arc<LookupResolver> {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: 10_000,
        window_secs: 60,
    }));
    let primary = Arc::new(
        ReceitaWsProvider::new(&provider_config(&receita.uri()), limiter).unwrap(),
    );
    let fallback = Arc::new(BrasilApiProvider::new(&provider_config(&brasil.uri())).unwrap());
    Arc::new(LookupResolver::new(primary, fallback))
}

/// Sync config with all pacing removed
pub fn zero_delay_sync_config() -> SyncConfig {
    SyncConfig {
        full_batch_size: 60,
        remaining_batch_size: 100,
        item_delay_secs: 0,
        batch_delay_secs: 0,
        retry_delay_secs: 0,
        max_attempts: 3,
    }
}

/// In-memory store seeded with one seller per CNPJ
pub async fn seed_store(cnpjs: &[&str]) -> Arc<SqliteSellerStore> {
    let store = SqliteSellerStore::in_memory().await.unwrap();
    for cnpj in cnpjs {
        store
            .insert(NewSeller {
                cnpj: cnpj.to_string(),
                email: format!("{}@example.com", cnpj),
                phone: Some("+55 11 99999-0000".to_string()),
            })
            .await
            .unwrap();
    }
    Arc::new(store)
}

/// ReceitaWS-shaped success body
pub fn receita_body(legal_name: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "nome": legal_name,
        "logradouro": "Avenida Paulista",
        "numero": "1000",
        "bairro": "Bela Vista",
        "municipio": "Sao Paulo",
        "uf": "SP",
        "cep": "01.310-100"
    })
}

/// BrasilAPI-shaped success body
pub fn brasil_body(legal_name: &str) -> serde_json::Value {
    serde_json::json!({
        "razao_social": legal_name,
        "logradouro": "Rua das Flores",
        "numero": "42",
        "bairro": "Centro",
        "municipio": "Curitiba",
        "uf": "PR",
        "cep": "80010000"
    })
}

pub async fn mount_receita_ok(server: &MockServer, cnpj: &str, legal_name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/cnpj/{}", cnpj)))
        .respond_with(ResponseTemplate::new(200).set_body_json(receita_body(legal_name)))
        .mount(server)
        .await;
}

pub async fn mount_receita_status(server: &MockServer, cnpj: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/cnpj/{}", cnpj)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub async fn mount_brasil_ok(server: &MockServer, cnpj: &str, legal_name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/cnpj/v1/{}", cnpj)))
        .respond_with(ResponseTemplate::new(200).set_body_json(brasil_body(legal_name)))
        .mount(server)
        .await;
}

pub async fn mount_brasil_status(server: &MockServer, cnpj: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/cnpj/v1/{}", cnpj)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
