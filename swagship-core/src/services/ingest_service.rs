// File: swagship-core/src/services/ingest_service.rs

use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

use tracing::info;

use swagship_common::error::Error;
use swagship_common::models::NewCode;
use swagship_common::traits::CodeRepository;

use crate::services::redemption_service::RedemptionService;

pub const CODE_COLUMN: &str = "RedemptionCode";
pub const PRODUCT_COLUMN: &str = "ProductRef";
pub const TRACKING_COLUMN: &str = "Tracking";

#[derive(Debug, Default)]
pub struct IngestReport {
    pub inserted: usize,
    /// Codes that were already persisted before this upload.
    pub duplicates: Vec<String>,
}

impl IngestReport {
    pub fn message(&self) -> String {
        if self.duplicates.is_empty() {
            "Upload completed!".to_string()
        } else {
            format!(
                "Upload completed! Duplicate codes detected: {}",
                self.duplicates.join(", ")
            )
        }
    }
}

#[derive(Debug, Default)]
pub struct TrackingReport {
    pub updated: usize,
    pub failures: Vec<String>,
}

impl TrackingReport {
    pub fn message(&self) -> String {
        if self.failures.is_empty() {
            "Upload completed!".to_string()
        } else {
            format!(
                "Upload completed! {} row(s) failed: {}",
                self.failures.len(),
                self.failures.join("; ")
            )
        }
    }
}

/// Bulk ingestion of uploaded CSV files: code batches and tracking
/// batches. Malformed files are rejected whole; per-row business
/// failures in a tracking batch are collected into the report.
pub struct IngestService {
    repo: Arc<dyn CodeRepository>,
    redemption: Arc<RedemptionService>,
}

impl IngestService {
    pub fn new(repo: Arc<dyn CodeRepository>, redemption: Arc<RedemptionService>) -> Self {
        Self { repo, redemption }
    }

    /// Scans the upload against the store, then bulk-inserts the
    /// survivors in one transaction. First occurrence wins inside a
    /// single upload; codes already persisted land in `duplicates`.
    pub async fn ingest_codes<R: Read>(&self, reader: R) -> Result<IngestReport, Error> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let (code_idx, ref_idx) = {
            let headers = csv_reader.headers()?;
            (
                column_index(headers, CODE_COLUMN)?,
                column_index(headers, PRODUCT_COLUMN)?,
            )
        };

        let mut batch: Vec<NewCode> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();

        for (line, result) in csv_reader.records().enumerate() {
            let record = result?;
            let code = field(&record, code_idx, CODE_COLUMN, line)?;
            let product_ref = field(&record, ref_idx, PRODUCT_COLUMN, line)?;

            if !seen.insert(code.to_string()) {
                continue;
            }
            if self.repo.get_by_code(code).await?.is_some() {
                duplicates.push(code.to_string());
            } else {
                batch.push(NewCode {
                    redeem_code: code.to_string(),
                    product_ref: product_ref.to_string(),
                });
            }
        }

        if !batch.is_empty() {
            self.repo.batch_create(&batch).await?;
        }
        info!(
            inserted = batch.len(),
            duplicates = duplicates.len(),
            "code upload ingested"
        );
        Ok(IngestReport {
            inserted: batch.len(),
            duplicates,
        })
    }

    /// Applies a `RedemptionCode, Tracking` upload row by row. Unknown
    /// codes fail their row, not the file; transport errors abort.
    pub async fn ingest_tracking<R: Read>(&self, reader: R) -> Result<TrackingReport, Error> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let (code_idx, tracking_idx) = {
            let headers = csv_reader.headers()?;
            (
                column_index(headers, CODE_COLUMN)?,
                column_index(headers, TRACKING_COLUMN)?,
            )
        };

        let mut report = TrackingReport::default();
        for (line, result) in csv_reader.records().enumerate() {
            let record = result?;
            let code = field(&record, code_idx, CODE_COLUMN, line)?;
            let tracking = field(&record, tracking_idx, TRACKING_COLUMN, line)?;

            match self.redemption.assign_tracking(code, tracking).await {
                Ok(_) => report.updated += 1,
                Err(e @ (Error::InvalidCode(_) | Error::Validation(_))) => {
                    report.failures.push(format!("{code}: {e}"));
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            updated = report.updated,
            failures = report.failures.len(),
            "tracking upload ingested"
        );
        Ok(report)
    }
}

/// Header columns are matched by name, order-independent. The first
/// header may carry a UTF-8 BOM from spreadsheet exports; strip it
/// before comparing.
fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, Error> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == name)
        .ok_or_else(|| Error::Parse(format!("upload is missing the {name} column")))
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, Error> {
    let value = record.get(idx).map(str::trim).unwrap_or("");
    if value.is_empty() {
        return Err(Error::Parse(format!(
            "row {} is missing a {name} value",
            line + 1
        )));
    }
    Ok(value)
}
