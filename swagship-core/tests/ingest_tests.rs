// tests/ingest_tests.rs

use std::sync::Arc;

use swagship_common::error::Error;
use swagship_common::traits::CodeRepository;
use swagship_core::db::SqliteDatabase;
use swagship_core::mailer::NullMailer;
use swagship_core::repositories::SqliteCodeRepository;
use swagship_core::services::{IngestService, RedemptionService};

async fn setup() -> (Arc<SqliteCodeRepository>, IngestService) {
    let db = SqliteDatabase::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    let repo = Arc::new(SqliteCodeRepository::new(db.pool().clone()));
    let redemption = Arc::new(RedemptionService::new(
        repo.clone(),
        Arc::new(NullMailer),
        "tracking-update",
    ));
    let ingest = IngestService::new(repo.clone(), redemption);
    (repo, ingest)
}

#[tokio::test]
async fn test_ingest_into_empty_store_first_occurrence_wins() -> Result<(), Error> {
    let (repo, ingest) = setup().await;

    let csv = "RedemptionCode,ProductRef\nA1,P1\nA1,P2\nA2,P1\n";
    let report = ingest.ingest_codes(csv.as_bytes()).await?;

    // The in-file repeat of A1 is dropped silently; it is not a
    // "duplicate" in the report, which only names codes already stored.
    assert_eq!(report.inserted, 2);
    assert!(report.duplicates.is_empty());
    assert_eq!(report.message(), "Upload completed!");

    assert_eq!(repo.get_by_code("A1").await?.unwrap().product_ref, "P1");
    assert_eq!(repo.get_by_code("A2").await?.unwrap().product_ref, "P1");
    Ok(())
}

#[tokio::test]
async fn test_ingest_reports_codes_already_stored() -> Result<(), Error> {
    let (repo, ingest) = setup().await;
    repo.create("A1", "P1").await?;

    let report = ingest
        .ingest_codes("RedemptionCode,ProductRef\nA1,P9\n".as_bytes())
        .await?;

    assert_eq!(report.inserted, 0);
    assert_eq!(report.duplicates, vec!["A1".to_string()]);
    assert!(report.message().contains("Duplicate codes detected"));
    assert!(report.message().contains("A1"));

    // The stored row keeps its original product ref.
    assert_eq!(repo.get_by_code("A1").await?.unwrap().product_ref, "P1");
    Ok(())
}

#[tokio::test]
async fn test_ingest_headers_are_order_independent() -> Result<(), Error> {
    let (repo, ingest) = setup().await;

    let report = ingest
        .ingest_codes("ProductRef,RedemptionCode\nP9,Z1\n".as_bytes())
        .await?;
    assert_eq!(report.inserted, 1);
    assert_eq!(repo.get_by_code("Z1").await?.unwrap().product_ref, "P9");
    Ok(())
}

#[tokio::test]
async fn test_ingest_strips_spreadsheet_bom() -> Result<(), Error> {
    let (repo, ingest) = setup().await;

    let csv = "\u{feff}RedemptionCode,ProductRef\nB1,P1\n";
    let report = ingest.ingest_codes(csv.as_bytes()).await?;
    assert_eq!(report.inserted, 1);
    assert!(repo.get_by_code("B1").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_ingest_missing_column_rejects_the_file() -> Result<(), Error> {
    let (repo, ingest) = setup().await;

    let err = ingest
        .ingest_codes("RedemptionCode\nA1\n".as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(ref m) if m.contains("ProductRef")));
    assert!(repo.get_by_code("A1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_ingest_headers_are_case_sensitive() -> Result<(), Error> {
    let (_repo, ingest) = setup().await;

    let err = ingest
        .ingest_codes("redemptioncode,productref\nA1,P1\n".as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    Ok(())
}

#[tokio::test]
async fn test_ingest_ragged_row_rejects_the_file() -> Result<(), Error> {
    let (repo, ingest) = setup().await;

    let err = ingest
        .ingest_codes("RedemptionCode,ProductRef\nA1,P1\nA2\n".as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Csv(_)));
    // The whole upload is rejected, including the well-formed row.
    assert!(repo.get_by_code("A1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_ingest_blank_value_rejects_the_file() -> Result<(), Error> {
    let (repo, ingest) = setup().await;

    let err = ingest
        .ingest_codes("RedemptionCode,ProductRef\nA1,\n".as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(ref m) if m.contains("ProductRef")));
    assert!(repo.get_by_code("A1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_ingest_header_only_upload_is_a_noop() -> Result<(), Error> {
    let (_repo, ingest) = setup().await;

    let report = ingest
        .ingest_codes("RedemptionCode,ProductRef\n".as_bytes())
        .await?;
    assert_eq!(report.inserted, 0);
    assert!(report.duplicates.is_empty());
    assert_eq!(report.message(), "Upload completed!");
    Ok(())
}

#[tokio::test]
async fn test_tracking_upload_collects_row_failures() -> Result<(), Error> {
    let (repo, ingest) = setup().await;
    repo.create("A1", "P1").await?;
    repo.mark_redeemed(
        "A1",
        &swagship_common::models::ContactInfo {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            address1: "123 Main St".to_string(),
            address2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62704".to_string(),
            country: None,
            phone: "555-0100".to_string(),
            email: "jane@example.com".to_string(),
        },
    )
    .await?;

    let csv = "RedemptionCode,Tracking\nA1,1Z999\nNOPE,1Z000\n";
    let report = ingest.ingest_tracking(csv.as_bytes()).await?;

    assert_eq!(report.updated, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].starts_with("NOPE:"));
    assert!(report.message().contains("1 row(s) failed"));

    let rec = repo.get_by_code("A1").await?.unwrap();
    assert_eq!(rec.tracking.as_deref(), Some("1Z999"));
    Ok(())
}
