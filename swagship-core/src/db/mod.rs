// swagship-core/src/db/mod.rs

use std::str::FromStr;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Postgres, Sqlite};
use tracing::info;

use swagship_common::error::Error;

const POSTGRES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS redemption_codes (
    redeem_code  TEXT PRIMARY KEY,
    product_ref  TEXT NOT NULL,
    first_name   TEXT,
    last_name    TEXT,
    address1     TEXT,
    address2     TEXT,
    city         TEXT,
    state        TEXT,
    postal_code  TEXT,
    country      TEXT,
    phone        TEXT,
    email        TEXT,
    tracking     TEXT,
    created      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated      TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const SQLITE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS redemption_codes (
    redeem_code  TEXT PRIMARY KEY,
    product_ref  TEXT NOT NULL,
    first_name   TEXT,
    last_name    TEXT,
    address1     TEXT,
    address2     TEXT,
    city         TEXT,
    state        TEXT,
    postal_code  TEXT,
    country      TEXT,
    phone        TEXT,
    email        TEXT,
    tracking     TEXT,
    created      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Networked store: a Postgres connection pool.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        info!("connected to Postgres store");
        Ok(Self { pool })
    }

    /// The schema is a single table; DDL is embedded rather than run
    /// through a migrations tool.
    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::query(POSTGRES_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// File-based store: SQLite behind the same repository contract.
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: Pool<Sqlite>,
}

impl SqliteDatabase {
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A second connection to a `:memory:` database sees an empty schema.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        info!("opened SQLite store at {}", database_url);
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::query(SQLITE_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}
