// File: swagship-core/src/repositories/sqlite/codes.rs

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use swagship_common::error::Error;
use swagship_common::models::{ContactInfo, NewCode, RedemptionCode};
use swagship_common::traits::CodeRepository;

use crate::repositories::{is_unique_violation, page_offset};

pub struct SqliteCodeRepository {
    pub pool: Pool<Sqlite>,
}

impl SqliteCodeRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn map_row(r: &SqliteRow) -> Result<RedemptionCode, Error> {
    Ok(RedemptionCode {
        redeem_code: r.try_get("redeem_code")?,
        product_ref: r.try_get("product_ref")?,
        first_name: r.try_get("first_name")?,
        last_name: r.try_get("last_name")?,
        address1: r.try_get("address1")?,
        address2: r.try_get("address2")?,
        city: r.try_get("city")?,
        state: r.try_get("state")?,
        postal_code: r.try_get("postal_code")?,
        country: r.try_get("country")?,
        phone: r.try_get("phone")?,
        email: r.try_get("email")?,
        tracking: r.try_get("tracking")?,
        created: r.try_get("created")?,
        updated: r.try_get("updated")?,
    })
}

#[async_trait]
impl CodeRepository for SqliteCodeRepository {
    async fn get_by_code(&self, code: &str) -> Result<Option<RedemptionCode>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT
                redeem_code, product_ref,
                first_name, last_name, address1, address2,
                city, state, postal_code, country, phone, email,
                tracking, created, updated
            FROM redemption_codes
            WHERE redeem_code = ?
            "#,
        )
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(map_row(&r)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, code: &str, product_ref: &str) -> Result<RedemptionCode, Error> {
        let res = sqlx::query(
            r#"
            INSERT INTO redemption_codes (redeem_code, product_ref)
            VALUES (?, ?)
            "#,
        )
            .bind(code)
            .bind(product_ref)
            .execute(&self.pool)
            .await;

        if let Err(e) = res {
            return if is_unique_violation(&e) {
                Err(Error::DuplicateKey(code.to_string()))
            } else {
                Err(e.into())
            };
        }

        self.get_by_code(code)
            .await?
            .ok_or_else(|| Error::NotFound(code.to_string()))
    }

    async fn batch_create(&self, rows: &[NewCode]) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let res = sqlx::query(
                r#"
                INSERT INTO redemption_codes (redeem_code, product_ref)
                VALUES (?, ?)
                "#,
            )
                .bind(&row.redeem_code)
                .bind(&row.product_ref)
                .execute(&mut *tx)
                .await;

            if let Err(e) = res {
                tx.rollback().await?;
                return if is_unique_violation(&e) {
                    Err(Error::DuplicateKey(row.redeem_code.clone()))
                } else {
                    Err(e.into())
                };
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, rec: &RedemptionCode) -> Result<RedemptionCode, Error> {
        let done = sqlx::query(
            r#"
            UPDATE redemption_codes SET
                product_ref = ?,
                first_name = ?,
                last_name = ?,
                address1 = ?,
                address2 = ?,
                city = ?,
                state = ?,
                postal_code = ?,
                country = ?,
                phone = ?,
                email = ?,
                tracking = ?,
                updated = CURRENT_TIMESTAMP
            WHERE redeem_code = ?
            "#,
        )
            .bind(&rec.product_ref)
            .bind(&rec.first_name)
            .bind(&rec.last_name)
            .bind(&rec.address1)
            .bind(&rec.address2)
            .bind(&rec.city)
            .bind(&rec.state)
            .bind(&rec.postal_code)
            .bind(&rec.country)
            .bind(&rec.phone)
            .bind(&rec.email)
            .bind(&rec.tracking)
            .bind(&rec.redeem_code)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            return Err(Error::NotFound(rec.redeem_code.clone()));
        }

        self.get_by_code(&rec.redeem_code)
            .await?
            .ok_or_else(|| Error::NotFound(rec.redeem_code.clone()))
    }

    async fn delete(&self, code: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM redemption_codes WHERE redeem_code = ?")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_redeemed(
        &self,
        code: &str,
        contact: &ContactInfo,
    ) -> Result<RedemptionCode, Error> {
        // Same conditional-update guard as the Postgres backend: a row
        // that already carries an email is left untouched.
        let done = sqlx::query(
            r#"
            UPDATE redemption_codes SET
                first_name = ?,
                last_name = ?,
                address1 = ?,
                address2 = ?,
                city = ?,
                state = ?,
                postal_code = ?,
                country = ?,
                phone = ?,
                email = ?,
                updated = CURRENT_TIMESTAMP
            WHERE redeem_code = ? AND email IS NULL
            "#,
        )
            .bind(&contact.first_name)
            .bind(&contact.last_name)
            .bind(&contact.address1)
            .bind(&contact.address2)
            .bind(&contact.city)
            .bind(&contact.state)
            .bind(&contact.postal_code)
            .bind(&contact.country)
            .bind(&contact.phone)
            .bind(&contact.email)
            .bind(code)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            return match self.get_by_code(code).await? {
                Some(_) => Err(Error::AlreadyRedeemed(code.to_string())),
                None => Err(Error::InvalidCode(code.to_string())),
            };
        }

        self.get_by_code(code)
            .await?
            .ok_or_else(|| Error::NotFound(code.to_string()))
    }

    async fn list_unused(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<(Vec<RedemptionCode>, i64), Error> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM redemption_codes
            WHERE email IS NULL AND first_name IS NULL AND city IS NULL
              AND state IS NULL AND tracking IS NULL
            "#,
        )
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT
                redeem_code, product_ref,
                first_name, last_name, address1, address2,
                city, state, postal_code, country, phone, email,
                tracking, created, updated
            FROM redemption_codes
            WHERE email IS NULL AND first_name IS NULL AND city IS NULL
              AND state IS NULL AND tracking IS NULL
            ORDER BY product_ref, redeem_code
            LIMIT ? OFFSET ?
            "#,
        )
            .bind(page_size)
            .bind(page_offset(page_size, page_number))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(map_row(&r)?);
        }
        Ok((list, total))
    }

    async fn list_pending_shipping(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<(Vec<RedemptionCode>, i64), Error> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM redemption_codes
            WHERE email IS NOT NULL AND (tracking IS NULL OR tracking = '')
            "#,
        )
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT
                redeem_code, product_ref,
                first_name, last_name, address1, address2,
                city, state, postal_code, country, phone, email,
                tracking, created, updated
            FROM redemption_codes
            WHERE email IS NOT NULL AND (tracking IS NULL OR tracking = '')
            ORDER BY created, redeem_code
            LIMIT ? OFFSET ?
            "#,
        )
            .bind(page_size)
            .bind(page_offset(page_size, page_number))
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(map_row(&r)?);
        }
        Ok((list, total))
    }

    async fn list_shipped(&self) -> Result<Vec<RedemptionCode>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                redeem_code, product_ref,
                first_name, last_name, address1, address2,
                city, state, postal_code, country, phone, email,
                tracking, created, updated
            FROM redemption_codes
            WHERE tracking IS NOT NULL AND tracking <> ''
            ORDER BY created, redeem_code
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(map_row(&r)?);
        }
        Ok(list)
    }

    async fn list_all_redeemed(&self) -> Result<Vec<RedemptionCode>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                redeem_code, product_ref,
                first_name, last_name, address1, address2,
                city, state, postal_code, country, phone, email,
                tracking, created, updated
            FROM redemption_codes
            WHERE email IS NOT NULL
            ORDER BY created, redeem_code
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let mut list = Vec::with_capacity(rows.len());
        for r in rows {
            list.push(map_row(&r)?);
        }
        Ok(list)
    }
}
