//! Domain models for seller-sync

pub mod company;
pub mod report;
pub mod seller;

pub use company::{Address, CompanyRecord};
pub use report::{FailureKind, SyncFailure, SyncReport};
pub use seller::{NewSeller, SellerPatch, StoredSeller, PENDING_ADDRESS};
