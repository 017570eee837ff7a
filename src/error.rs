//! Application error types for seller-sync
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::models::SyncReport;

/// Errors surfaced by a single company-data provider
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LookupError {
    /// Network timeout
    #[error("Network timeout")]
    NetworkTimeout,

    /// Connection refused
    #[error("Connection refused")]
    ConnectionRefused,

    /// Rate limited by upstream
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Server error
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Invalid or rejected request data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Upstream has no record for the identifier
    #[error("Company not found")]
    NotFound,

    /// Credentials missing or rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// Generic network error
    #[error("Network error: {0}")]
    Network(String),
}

/// Terminal resolution error: both providers were tried and both failed
///
/// Carries the two underlying failures so a report reader can tell a genuine
/// miss from an outage without replaying the lookup.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Resolution failed for {cnpj}: primary: {primary}; fallback: {fallback}")]
pub struct ResolveError {
    /// The identifier that failed to resolve
    pub cnpj: String,
    /// Error from the primary provider
    pub primary: LookupError,
    /// Error from the fallback provider
    pub fallback: LookupError,
}

impl ResolveError {
    /// True when both providers rejected credentials
    ///
    /// Every subsequent lookup would fail identically, so a bulk run stops
    /// early and surfaces this as a configuration error.
    pub fn credentials_rejected(&self) -> bool {
        self.primary == LookupError::Unauthorized && self.fallback == LookupError::Unauthorized
    }
}

/// Seller store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    /// Seller record not found
    #[error("Seller not found: {0}")]
    NotFound(i64),

    /// Stored value could not be decoded
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// Errors that abort an entire bulk synchronization run
///
/// Per-item failures never surface here; they are recorded in the
/// [`SyncReport`]. Only a failure to read the candidate set, or credentials
/// rejected by both providers, stops a run.
#[derive(Debug, Error)]
pub enum BulkSyncError {
    /// The candidate set could not be read
    #[error("Failed to load sync candidates: {0}")]
    CandidateLoad(#[from] StoreError),

    /// Both providers rejected credentials mid-run
    #[error("Upstream credentials rejected, aborting run")]
    Unauthorized {
        /// Progress made before the abort; already-written updates stand
        report: SyncReport,
    },
}

/// Trait for determining if an error is retryable
pub trait RetryableError {
    /// Returns true if the error is retryable
    fn is_retryable(&self) -> bool;
}

impl RetryableError for LookupError {
    fn is_retryable(&self) -> bool {
        match self {
            // Retryable errors
            LookupError::NetworkTimeout => true,
            LookupError::ConnectionRefused => true,
            LookupError::RateLimited(_) => true,
            LookupError::ServerError(code) if *code >= 500 => true,
            LookupError::Network(_) => true,

            // Non-retryable errors
            LookupError::InvalidData(_) => false,
            LookupError::NotFound => false,
            LookupError::Unauthorized => false,
            LookupError::ServerError(_) => false, // 4xx errors
        }
    }
}

impl RetryableError for ResolveError {
    /// A resolution is worth retrying if either provider failed transiently:
    /// the retry may succeed through whichever side recovers first.
    fn is_retryable(&self) -> bool {
        self.primary.is_retryable() || self.fallback.is_retryable()
    }
}
