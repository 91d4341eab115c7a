// File: swagship-common/src/models/mod.rs
pub mod code;

pub use code::{CodeStatus, ContactInfo, NewCode, RedeemRequest, RedemptionCode};
