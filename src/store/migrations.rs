//! Database schema
//!
//! The schema is applied idempotently on every startup; there is no
//! versioned migration history yet.

/// Full schema, safe to re-run
pub const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sellers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cnpj TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    phone TEXT,
    legal_name TEXT,
    address TEXT NOT NULL DEFAULT 'address pending',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sellers_address ON sellers(address);
"#;

/// Apply the schema to an open connection
pub fn apply(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_SCHEMA)
}
