// File: swagship-common/src/traits/repository_traits.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::{ContactInfo, NewCode, RedemptionCode};

/// Uniform contract over the redemption-code table, regardless of the
/// backing engine. Both the Postgres and the SQLite store implement this;
/// the binary picks one at startup.
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Missing rows are `Ok(None)`, never an error.
    async fn get_by_code(&self, code: &str) -> Result<Option<RedemptionCode>, Error>;

    /// Inserts a fresh, unredeemed code. `DuplicateKey` if the code exists.
    async fn create(&self, code: &str, product_ref: &str) -> Result<RedemptionCode, Error>;

    /// Inserts many rows in one transaction. Any key conflict rolls the
    /// whole batch back and surfaces as `DuplicateKey` for that code.
    async fn batch_create(&self, rows: &[NewCode]) -> Result<(), Error>;

    /// Full-row update keyed by `redeem_code`; `updated` is rewritten
    /// server-side. `NotFound` if the code does not exist.
    async fn update(&self, rec: &RedemptionCode) -> Result<RedemptionCode, Error>;

    /// Idempotent; deleting an absent code is not an error.
    async fn delete(&self, code: &str) -> Result<(), Error>;

    /// Atomically fills the contact columns of a still-unredeemed row
    /// (`... WHERE redeem_code = ? AND email IS NULL`). Exactly one of
    /// three outcomes: the updated row, `InvalidCode` when no such code
    /// exists, or `AlreadyRedeemed` when the row already carries an email.
    async fn mark_redeemed(
        &self,
        code: &str,
        contact: &ContactInfo,
    ) -> Result<RedemptionCode, Error>;

    /// Codes with no contact details and no tracking, ordered by
    /// `(product_ref, redeem_code)`. `page_number` is 1-based; the count
    /// covers the whole filtered set.
    async fn list_unused(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<(Vec<RedemptionCode>, i64), Error>;

    /// Redeemed codes still waiting on a tracking number, ascending
    /// `created`. Same pagination contract as `list_unused`.
    async fn list_pending_shipping(
        &self,
        page_size: i64,
        page_number: i64,
    ) -> Result<(Vec<RedemptionCode>, i64), Error>;

    /// Codes with a non-empty tracking number, ascending `created`.
    async fn list_shipped(&self) -> Result<Vec<RedemptionCode>, Error>;

    /// Everything redeemed: pending plus shipped, ascending `created`.
    async fn list_all_redeemed(&self) -> Result<Vec<RedemptionCode>, Error>;
}
