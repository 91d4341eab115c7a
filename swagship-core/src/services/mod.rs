// File: swagship-core/src/services/mod.rs

pub mod export_service;
pub mod ingest_service;
pub mod redemption_service;

pub use export_service::ExportService;
pub use ingest_service::{IngestReport, IngestService, TrackingReport};
pub use redemption_service::RedemptionService;
