// File: swagship-core/src/services/export_service.rs

use std::sync::Arc;

use swagship_common::error::Error;
use swagship_common::models::{CodeStatus, RedemptionCode};
use swagship_common::traits::CodeRepository;

/// Fixed export column order; `country` is deliberately absent from the
/// admin export.
pub const EXPORT_COLUMNS: [&str; 15] = [
    "productRef",
    "redeemCode",
    "firstName",
    "lastName",
    "address1",
    "address2",
    "city",
    "state",
    "postalCode",
    "phone",
    "email",
    "tracking",
    "created",
    "updated",
    "status",
];

pub struct ExportService {
    repo: Arc<dyn CodeRepository>,
}

impl ExportService {
    pub fn new(repo: Arc<dyn CodeRepository>) -> Self {
        Self { repo }
    }

    /// `pending` and `shipped` select those views; any other selector
    /// falls back to the full redeemed set. The fetch is never paginated.
    pub async fn export_csv(&self, selector: &str) -> Result<Vec<u8>, Error> {
        let rows = self.rows_for(selector).await?;

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(EXPORT_COLUMNS)?;
        for rec in &rows {
            write_row(&mut wtr, rec)?;
        }
        wtr.into_inner().map_err(|e| Error::Parse(e.to_string()))
    }

    async fn rows_for(&self, selector: &str) -> Result<Vec<RedemptionCode>, Error> {
        match selector {
            "pending" => {
                // all-redeemed = pending + shipped; keep the pending half.
                let mut rows = self.repo.list_all_redeemed().await?;
                rows.retain(|r| r.status() == CodeStatus::PendingShipping);
                Ok(rows)
            }
            "shipped" => self.repo.list_shipped().await,
            _ => self.repo.list_all_redeemed().await,
        }
    }
}

fn write_row(wtr: &mut csv::Writer<Vec<u8>>, rec: &RedemptionCode) -> Result<(), Error> {
    let created = rec.created.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated = rec.updated.format("%Y-%m-%d %H:%M:%S").to_string();
    let status = rec.status().to_string();
    wtr.write_record([
        rec.product_ref.as_str(),
        rec.redeem_code.as_str(),
        rec.first_name.as_deref().unwrap_or(""),
        rec.last_name.as_deref().unwrap_or(""),
        rec.address1.as_deref().unwrap_or(""),
        rec.address2.as_deref().unwrap_or(""),
        rec.city.as_deref().unwrap_or(""),
        rec.state.as_deref().unwrap_or(""),
        rec.postal_code.as_deref().unwrap_or(""),
        rec.phone.as_deref().unwrap_or(""),
        rec.email.as_deref().unwrap_or(""),
        rec.tracking.as_deref().unwrap_or(""),
        created.as_str(),
        updated.as_str(),
        status.as_str(),
    ])?;
    Ok(())
}
