// File: swagship-common/src/models/code.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One promotional redemption code, keyed by the code token itself.
/// Contact columns stay NULL until the code is redeemed; `tracking`
/// stays NULL until the shipment goes out.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionCode {
    pub redeem_code: String,
    pub product_ref: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tracking: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl RedemptionCode {
    /// A non-null `email` is the canonical "this code was redeemed" marker.
    pub fn is_redeemed(&self) -> bool {
        self.email.is_some()
    }

    pub fn is_shipped(&self) -> bool {
        self.tracking.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Derived lifecycle state; never stored.
    pub fn status(&self) -> CodeStatus {
        if self.is_shipped() {
            CodeStatus::Shipped
        } else if self.is_redeemed() {
            CodeStatus::PendingShipping
        } else {
            CodeStatus::Unused
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeStatus {
    Unused,
    PendingShipping,
    Shipped,
}

impl CodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeStatus::Unused => "UNUSED",
            CodeStatus::PendingShipping => "PENDING_SHIPPING",
            CodeStatus::Shipped => "SHIPPED",
        }
    }
}

impl std::fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(code, productRef)` pair accepted for bulk insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCode {
    pub redeem_code: String,
    pub product_ref: String,
}

/// Contact/shipping details captured at redemption time. Required fields
/// are plain strings (validated non-empty upstream); `address2` and
/// `country` are genuinely optional and persist as NULL when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
    pub phone: String,
    pub email: String,
}

/// Wire-shaped redemption request. Missing JSON fields deserialize to
/// empty strings so the validator can report every absent field instead
/// of the decoder rejecting the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedeemRequest {
    pub redeem_code: String,
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

impl RedeemRequest {
    pub fn contact_info(&self) -> ContactInfo {
        fn opt(s: &str) -> Option<String> {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        ContactInfo {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address1: self.address1.clone(),
            address2: opt(&self.address2),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: opt(&self.country),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}
