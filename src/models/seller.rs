//! Seller record models
//!
//! A seller is created with contact data and a CNPJ; its legal name and
//! address are filled in later by lookups against the company registries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel stored in the address field until a lookup resolves it
pub const PENDING_ADDRESS: &str = "address pending";

/// A persisted seller record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSeller {
    /// Row id
    pub id: i64,

    /// Registry identifier, stored as the bare 14-digit string
    pub cnpj: String,

    /// Contact email; never written by synchronization
    pub email: String,

    /// Contact phone; never written by synchronization
    pub phone: Option<String>,

    /// Legal name resolved from the registry, if any lookup has succeeded
    pub legal_name: Option<String>,

    /// Resolved address line, or [`PENDING_ADDRESS`]
    pub address: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoredSeller {
    /// Whether this seller still carries the pending-address sentinel
    pub fn has_pending_address(&self) -> bool {
        self.address == PENDING_ADDRESS
    }
}

/// Payload for creating a seller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeller {
    pub cnpj: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Fields a synchronization run is allowed to write
///
/// Contact fields are deliberately absent: bulk sync must never touch them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerPatch {
    pub legal_name: Option<String>,
    pub address: Option<String>,
}
