//! SQLite-backed seller store
//!
//! Single-connection store over `tokio_rusqlite`; all statements run on the
//! connection's worker thread via `call`. Timestamps are stored as RFC 3339
//! text in UTC.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{NewSeller, SellerPatch, StoredSeller};
use crate::store::{migrations, SellerStore};

/// SQLite implementation of [`SellerStore`]
pub struct SqliteSellerStore {
    conn: Connection,
}

impl SqliteSellerStore {
    /// Open (or create) the database at the given path and apply the schema
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).await?;
        conn.call(|conn| migrations::apply(conn).map_err(Into::into))
            .await?;

        info!(path = %path, "Seller database ready");
        Ok(Self { conn })
    }

    /// In-memory store, used by tests
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().await?;
        conn.call(|conn| migrations::apply(conn).map_err(Into::into))
            .await?;
        Ok(Self { conn })
    }
}

/// Map one sellers row to the model
fn row_to_seller(row: &Row<'_>) -> rusqlite::Result<StoredSeller> {
    Ok(StoredSeller {
        id: row.get(0)?,
        cnpj: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        legal_name: row.get(4)?,
        address: row.get(5)?,
        created_at: parse_timestamp(row.get(6)?, 6)?,
        updated_at: parse_timestamp(row.get(7)?, 7)?,
    })
}

fn parse_timestamp(value: String, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
}

const SELECT_COLUMNS: &str =
    "SELECT id, cnpj, email, phone, legal_name, address, created_at, updated_at FROM sellers";

#[async_trait]
impl SellerStore for SqliteSellerStore {
    async fn insert(&self, seller: NewSeller) -> Result<StoredSeller, StoreError> {
        let now = Utc::now().to_rfc3339();
        let stored = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO sellers (cnpj, email, phone, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![seller.cnpj, seller.email, seller.phone, now],
                )?;
                let id = conn.last_insert_rowid();
                let stored = conn.query_row(
                    &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                    params![id],
                    row_to_seller,
                )?;
                Ok(stored)
            })
            .await?;

        debug!(id = stored.id, cnpj = %stored.cnpj, "Inserted seller");
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<StoredSeller>, StoreError> {
        let sellers = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
                let rows = stmt
                    .query_map([], row_to_seller)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;
        Ok(sellers)
    }

    async fn find_with_pending_address(&self) -> Result<Vec<StoredSeller>, StoreError> {
        let sellers = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE address = ?1 ORDER BY id",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![crate::models::PENDING_ADDRESS], row_to_seller)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;
        Ok(sellers)
    }

    async fn find_by_id(&self, id: i64) -> Result<StoredSeller, StoreError> {
        let seller = self
            .conn
            .call(move |conn| {
                let seller = conn
                    .query_row(
                        &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                        params![id],
                        row_to_seller,
                    )
                    .optional()?;
                Ok(seller)
            })
            .await?;

        seller.ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: SellerPatch) -> Result<StoredSeller, StoreError> {
        let now = Utc::now().to_rfc3339();
        let updated = self
            .conn
            .call(move |conn| {
                // COALESCE keeps the stored value wherever the patch is silent
                let changed = conn.execute(
                    "UPDATE sellers SET \
                     legal_name = COALESCE(?1, legal_name), \
                     address = COALESCE(?2, address), \
                     updated_at = ?3 \
                     WHERE id = ?4",
                    params![patch.legal_name, patch.address, now, id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                let seller = conn.query_row(
                    &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                    params![id],
                    row_to_seller,
                )?;
                Ok(Some(seller))
            })
            .await?;

        let seller = updated.ok_or(StoreError::NotFound(id))?;
        debug!(id = seller.id, cnpj = %seller.cnpj, "Updated seller");
        Ok(seller)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .call(|conn| {
                let count = conn.query_row("SELECT COUNT(*) FROM sellers", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count as u64)
    }
}
