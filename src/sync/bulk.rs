//! Chunked bulk synchronization over the seller store
//!
//! A run loads its candidate set once, splits it into fixed-size chunks and
//! processes every item strictly sequentially. Pacing is deliberate: a delay
//! after each successful item, a longer delay between chunks, and a fixed
//! delay before retrying a transient failure. Per-item failures are recorded
//! in the [`SyncReport`] and never stop the run; only an unreadable candidate
//! set or credentials rejected by both providers abort it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cnpj::Cnpj;
use crate::config::SyncConfig;
use crate::error::{BulkSyncError, RetryableError};
use crate::models::{FailureKind, SellerPatch, StoredSeller, SyncReport};
use crate::resolver::LookupResolver;
use crate::store::SellerStore;

/// Candidate selection mode for a bulk run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Every stored seller
    Full,
    /// Only sellers whose address is still the pending sentinel
    Remaining,
}

impl SyncMode {
    /// Chunk size this mode uses
    pub fn batch_size(&self, config: &SyncConfig) -> usize {
        match self {
            SyncMode::Full => config.full_batch_size,
            SyncMode::Remaining => config.remaining_batch_size,
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Full => write!(f, "full"),
            SyncMode::Remaining => write!(f, "remaining"),
        }
    }
}

/// Outcome of one candidate, after all retries
enum ItemOutcome {
    Success,
    Failure { message: String, kind: FailureKind },
    /// Both providers rejected credentials; the whole run must stop
    CredentialsRejected,
}

/// Sequential, paced synchronization of stored sellers
pub struct BulkSynchronizer {
    store: Arc<dyn SellerStore>,
    resolver: Arc<LookupResolver>,
    config: SyncConfig,
}

impl BulkSynchronizer {
    /// Create a synchronizer over the given store and resolver
    pub fn new(
        store: Arc<dyn SellerStore>,
        resolver: Arc<LookupResolver>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            config,
        }
    }

    /// Synchronize every stored seller
    pub async fn run_full(&self) -> Result<SyncReport, BulkSyncError> {
        self.run(SyncMode::Full).await
    }

    /// Synchronize only sellers with a pending address
    pub async fn run_remaining(&self) -> Result<SyncReport, BulkSyncError> {
        self.run(SyncMode::Remaining).await
    }

    /// Execute one bulk run in the given mode
    pub async fn run(&self, mode: SyncMode) -> Result<SyncReport, BulkSyncError> {
        let candidates = match mode {
            SyncMode::Full => self.store.find_all().await?,
            SyncMode::Remaining => self.store.find_with_pending_address().await?,
        };

        let batch_size = mode.batch_size(&self.config).max(1);
        let mut report = SyncReport::new(candidates.len() as u64);
        info!(
            mode = %mode,
            total = report.total,
            batch_size,
            "Starting bulk synchronization"
        );

        let chunk_count = candidates.chunks(batch_size).len();
        for (chunk_index, chunk) in candidates.chunks(batch_size).enumerate() {
            debug!(
                chunk = chunk_index + 1,
                of = chunk_count,
                size = chunk.len(),
                "Processing chunk"
            );

            for (item_index, seller) in chunk.iter().enumerate() {
                match self.sync_item(seller).await {
                    ItemOutcome::Success => {
                        report.record_success();
                        // Pace successive upstream lookups within a chunk
                        if item_index + 1 < chunk.len() {
                            sleep(Duration::from_secs(self.config.item_delay_secs)).await;
                        }
                    }
                    ItemOutcome::Failure { message, kind } => {
                        warn!(
                            cnpj = %seller.cnpj,
                            kind = ?kind,
                            message = %message,
                            "Seller failed to synchronize"
                        );
                        report.record_failure(seller.cnpj.clone(), message, kind);
                    }
                    ItemOutcome::CredentialsRejected => {
                        error!(
                            cnpj = %seller.cnpj,
                            processed = report.processed(),
                            "Both providers rejected credentials, aborting run"
                        );
                        return Err(BulkSyncError::Unauthorized { report });
                    }
                }
            }

            if chunk_index + 1 < chunk_count {
                sleep(Duration::from_secs(self.config.batch_delay_secs)).await;
            }
        }

        info!(
            mode = %mode,
            success = report.success,
            failed = report.failed,
            "Bulk synchronization finished"
        );
        Ok(report)
    }

    /// Resolve and persist one candidate, retrying transient failures
    async fn sync_item(&self, seller: &StoredSeller) -> ItemOutcome {
        // Validation happens before any upstream call; a malformed stored
        // identifier costs no quota.
        let cnpj = match Cnpj::parse(&seller.cnpj) {
            Ok(cnpj) => cnpj,
            Err(err) => {
                return ItemOutcome::Failure {
                    message: err.to_string(),
                    kind: FailureKind::InvalidId,
                }
            }
        };

        let mut attempt = 1;
        loop {
            match self.resolver.resolve(&cnpj).await {
                Ok(record) => {
                    let patch = SellerPatch {
                        legal_name: Some(record.legal_name),
                        address: Some(record.address.to_line()),
                    };
                    return match self.store.update(seller.id, patch).await {
                        Ok(updated) => {
                            debug!(
                                id = updated.id,
                                cnpj = %updated.cnpj,
                                attempt,
                                "Seller synchronized"
                            );
                            ItemOutcome::Success
                        }
                        Err(err) => ItemOutcome::Failure {
                            message: err.to_string(),
                            kind: FailureKind::Other,
                        },
                    };
                }
                Err(err) if err.credentials_rejected() => {
                    return ItemOutcome::CredentialsRejected;
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    warn!(
                        cnpj = %cnpj,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %err,
                        "Transient failure, will retry"
                    );
                    attempt += 1;
                    sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
                }
                Err(err) => {
                    return ItemOutcome::Failure {
                        kind: FailureKind::from_resolve(&err),
                        message: err.to_string(),
                    };
                }
            }
        }
    }
}
