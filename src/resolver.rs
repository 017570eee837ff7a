//! Primary/fallback company lookup resolution
//!
//! A [`LookupResolver`] chains two providers: the primary is always tried
//! first, and the fallback only runs once the primary has failed, whatever
//! the failure was. The two results are never merged; a terminal error
//! carries both providers' failures so callers can classify the outcome.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cnpj::Cnpj;
use crate::error::ResolveError;
use crate::models::CompanyRecord;
use crate::provider::CompanyDataProvider;

/// Resolves a CNPJ through a primary provider with a fallback
pub struct LookupResolver {
    primary: Arc<dyn CompanyDataProvider>,
    fallback: Arc<dyn CompanyDataProvider>,
}

impl LookupResolver {
    /// Create a resolver over the given provider pair
    pub fn new(primary: Arc<dyn CompanyDataProvider>, fallback: Arc<dyn CompanyDataProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Resolve the identifier, falling back on any primary failure
    pub async fn resolve(&self, cnpj: &Cnpj) -> Result<CompanyRecord, ResolveError> {
        let primary_err = match self.primary.resolve(cnpj).await {
            Ok(record) => {
                debug!(cnpj = %cnpj, provider = self.primary.name(), "Resolved via primary provider");
                return Ok(record);
            }
            Err(err) => {
                warn!(
                    cnpj = %cnpj,
                    provider = self.primary.name(),
                    error = %err,
                    "Primary provider failed, trying fallback"
                );
                err
            }
        };

        match self.fallback.resolve(cnpj).await {
            Ok(record) => {
                info!(cnpj = %cnpj, provider = self.fallback.name(), "Resolved via fallback provider");
                Ok(record)
            }
            Err(fallback_err) => {
                warn!(
                    cnpj = %cnpj,
                    provider = self.fallback.name(),
                    error = %fallback_err,
                    "Fallback provider failed, resolution is terminal"
                );
                Err(ResolveError {
                    cnpj: cnpj.digits().to_string(),
                    primary: primary_err,
                    fallback: fallback_err,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::models::Address;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider stub returning a fixed outcome and counting calls
    struct StubProvider {
        name: &'static str,
        outcome: Result<CompanyRecord, LookupError>,
        calls: AtomicU32,
    }

    impl StubProvider {
        fn ok(name: &'static str, legal_name: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: Ok(CompanyRecord {
                    legal_name: legal_name.to_string(),
                    address: Address::default(),
                }),
                calls: AtomicU32::new(0),
            })
        }

        fn err(name: &'static str, err: LookupError) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: Err(err),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompanyDataProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn resolve(&self, _cnpj: &Cnpj) -> Result<CompanyRecord, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn test_cnpj() -> Cnpj {
        Cnpj::parse("11222333000181").unwrap()
    }

    // Test 1: A primary success never consults the fallback
    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = StubProvider::ok("primary", "Empresa Primaria LTDA");
        let fallback = StubProvider::ok("fallback", "Empresa Reserva LTDA");
        let resolver = LookupResolver::new(primary.clone(), fallback.clone());

        let record = resolver.resolve(&test_cnpj()).await.unwrap();

        assert_eq!(record.legal_name, "Empresa Primaria LTDA");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    // Test 2: Any primary failure triggers the fallback
    #[tokio::test]
    async fn test_primary_failure_uses_fallback() {
        let primary = StubProvider::err("primary", LookupError::ServerError(500));
        let fallback = StubProvider::ok("fallback", "Empresa Reserva LTDA");
        let resolver = LookupResolver::new(primary.clone(), fallback.clone());

        let record = resolver.resolve(&test_cnpj()).await.unwrap();

        assert_eq!(record.legal_name, "Empresa Reserva LTDA");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    // Test 3: Primary NotFound still consults the fallback
    #[tokio::test]
    async fn test_primary_not_found_still_falls_back() {
        let primary = StubProvider::err("primary", LookupError::NotFound);
        let fallback = StubProvider::ok("fallback", "Empresa Reserva LTDA");
        let resolver = LookupResolver::new(primary, fallback.clone());

        let record = resolver.resolve(&test_cnpj()).await.unwrap();

        assert_eq!(record.legal_name, "Empresa Reserva LTDA");
        assert_eq!(fallback.calls(), 1);
    }

    // Test 4: Both failing yields a terminal error carrying both causes
    #[tokio::test]
    async fn test_both_failing_is_terminal() {
        let primary = StubProvider::err("primary", LookupError::NetworkTimeout);
        let fallback = StubProvider::err("fallback", LookupError::NotFound);
        let resolver = LookupResolver::new(primary, fallback);

        let err = resolver.resolve(&test_cnpj()).await.unwrap_err();

        assert_eq!(err.cnpj, "11222333000181");
        assert_eq!(err.primary, LookupError::NetworkTimeout);
        assert_eq!(err.fallback, LookupError::NotFound);
    }

    // Test 5: The terminal error message names both failures
    #[tokio::test]
    async fn test_terminal_error_message_names_both() {
        let primary = StubProvider::err("primary", LookupError::RateLimited(60));
        let fallback = StubProvider::err("fallback", LookupError::ServerError(502));
        let resolver = LookupResolver::new(primary, fallback);

        let err = resolver.resolve(&test_cnpj()).await.unwrap_err();
        let message = err.to_string();

        assert!(message.contains("11222333000181"));
        assert!(message.contains("primary"));
        assert!(message.contains("fallback"));
    }
}
