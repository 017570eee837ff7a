//! Company-data lookup providers
//!
//! Each provider resolves a CNPJ against one upstream registry API and
//! normalizes that upstream's response shape into a [`CompanyRecord`].
//! Providers are independent: no partial merge ever happens between them.

use async_trait::async_trait;

use crate::cnpj::Cnpj;
use crate::error::LookupError;
use crate::models::CompanyRecord;

pub mod brasil_api;
pub mod receita_ws;

pub use brasil_api::BrasilApiProvider;
pub use receita_ws::ReceitaWsProvider;

/// A source capable of resolving a CNPJ to canonical company data
#[async_trait]
pub trait CompanyDataProvider: Send + Sync {
    /// Short provider name used in logs and reports
    fn name(&self) -> &str;

    /// Resolve the identifier to a fresh company record
    async fn resolve(&self, cnpj: &Cnpj) -> Result<CompanyRecord, LookupError>;
}

/// Map a reqwest transport error to the lookup taxonomy
pub(crate) fn transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::NetworkTimeout
    } else if err.is_connect() {
        LookupError::ConnectionRefused
    } else {
        LookupError::Network(err.to_string())
    }
}

/// Treat an absent or blank legal name as "not found"
///
/// Registries occasionally return a shell record with address fragments but
/// no legal name; such a record is useless downstream.
pub(crate) fn require_legal_name(name: Option<String>) -> Result<String, LookupError> {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(LookupError::NotFound)
}
