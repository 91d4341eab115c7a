// File: swagship-core/src/lib.rs

pub mod auth;
pub mod db;
pub mod mailer;
pub mod repositories;
pub mod services;
pub mod validate;

pub use swagship_common::error::Error;
pub use swagship_common::models;
pub use swagship_common::traits::CodeRepository;

pub use db::{PostgresDatabase, SqliteDatabase};
