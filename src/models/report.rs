//! Bulk synchronization report types
//!
//! A [`SyncReport`] is the sole artifact of a bulk run: aggregate counts plus
//! an ordered list of classified per-item failures. It is built up while the
//! run executes and immutable once returned; it is never persisted.

use serde::{Deserialize, Serialize};

use crate::error::{LookupError, ResolveError, RetryableError};

/// Classified failure category for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Identifier failed structural validation; no upstream call was made
    InvalidId,
    /// No registry has a record for the identifier
    NotFound,
    /// Upstream rejected the request as invalid (400-style)
    ValidationError,
    /// Transient failure that exhausted the retry budget
    Transient,
    /// Anything else
    Other,
}

impl FailureKind {
    /// Classify a single provider error
    pub fn from_lookup(err: &LookupError) -> Self {
        match err {
            LookupError::NotFound => FailureKind::NotFound,
            LookupError::InvalidData(message) => {
                // Upstreams report a malformed identifier as a 400 with a
                // message naming the CNPJ; everything else is a plain
                // validation rejection.
                if message.to_lowercase().contains("cnpj") {
                    FailureKind::InvalidId
                } else {
                    FailureKind::ValidationError
                }
            }
            LookupError::ServerError(code) if (400..500).contains(code) => {
                FailureKind::ValidationError
            }
            err if err.is_retryable() => FailureKind::Transient,
            _ => FailureKind::Other,
        }
    }

    /// Classify a terminal resolution error
    ///
    /// The fallback saw the identifier last, so its verdict wins unless it
    /// only failed transiently, in which case the primary's verdict is used.
    pub fn from_resolve(err: &ResolveError) -> Self {
        let fallback = Self::from_lookup(&err.fallback);
        if fallback != FailureKind::Transient {
            return fallback;
        }
        let primary = Self::from_lookup(&err.primary);
        if primary != FailureKind::Transient {
            return primary;
        }
        FailureKind::Transient
    }
}

/// One classified per-item failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    /// The seller's registry identifier as stored
    pub cnpj: String,
    /// Human-readable failure description
    pub message: String,
    /// Classified category
    pub kind: FailureKind,
}

/// Aggregate outcome of one bulk synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Number of candidate records considered
    pub total: u64,
    /// Successfully updated records
    pub success: u64,
    /// Records that terminally failed
    pub failed: u64,
    /// Per-item failures, in processing order
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Create a report for a candidate set of the given size
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Record one successful update
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    /// Record one terminal failure
    pub fn record_failure(
        &mut self,
        cnpj: impl Into<String>,
        message: impl Into<String>,
        kind: FailureKind,
    ) {
        self.failed += 1;
        self.failures.push(SyncFailure {
            cnpj: cnpj.into(),
            message: message.into(),
            kind,
        });
    }

    /// Items accounted for so far (success or failure)
    pub fn processed(&self) -> u64 {
        self.success + self.failed
    }
}
