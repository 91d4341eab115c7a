// src/repositories/mod.rs

pub mod postgres;
pub mod sqlite;

pub use postgres::codes::PostgresCodeRepository;
pub use sqlite::codes::SqliteCodeRepository;

/// Both backends funnel key conflicts through here so the trait surfaces
/// one `DuplicateKey` error kind instead of engine-specific codes.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// 1-based page number to row offset.
pub(crate) fn page_offset(page_size: i64, page_number: i64) -> i64 {
    (page_number.max(1) - 1) * page_size.max(0)
}
