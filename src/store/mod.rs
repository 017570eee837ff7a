//! Seller persistence
//!
//! The store is the single collaborator synchronization talks to. It hands
//! out candidate sets and applies per-seller patches; it knows nothing about
//! providers or reports.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{NewSeller, SellerPatch, StoredSeller};

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteSellerStore;

/// Seller record storage
#[async_trait]
pub trait SellerStore: Send + Sync {
    /// Insert a new seller; the address starts as the pending sentinel
    async fn insert(&self, seller: NewSeller) -> Result<StoredSeller, StoreError>;

    /// All sellers, ordered by id
    async fn find_all(&self) -> Result<Vec<StoredSeller>, StoreError>;

    /// Sellers whose address is still the pending sentinel, ordered by id
    async fn find_with_pending_address(&self) -> Result<Vec<StoredSeller>, StoreError>;

    /// Fetch one seller by id
    async fn find_by_id(&self, id: i64) -> Result<StoredSeller, StoreError>;

    /// Apply a patch to one seller and return the updated record
    ///
    /// Absent patch fields leave the stored values untouched. Contact fields
    /// are not representable in a patch and therefore can never change here.
    async fn update(&self, id: i64, patch: SellerPatch) -> Result<StoredSeller, StoreError>;

    /// Number of stored sellers
    async fn count(&self) -> Result<u64, StoreError>;
}
