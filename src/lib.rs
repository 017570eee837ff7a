//! seller-sync: CNPJ resolution and bulk seller data synchronization
//!
//! Sellers are registered with contact data and a CNPJ; their legal name and
//! address are filled in by lookups against two public company registries.
//! The primary registry (ReceitaWS) sits behind a fixed-window rate limiter;
//! BrasilAPI serves as the fallback whenever the primary fails. Bulk runs
//! walk the stored sellers in paced chunks and produce a [`models::SyncReport`].

pub mod cnpj;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod store;
pub mod sync;
