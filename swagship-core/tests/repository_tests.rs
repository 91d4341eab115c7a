// tests/repository_tests.rs

use swagship_common::error::Error;
use swagship_common::models::{CodeStatus, ContactInfo, NewCode};
use swagship_common::traits::CodeRepository;
use swagship_core::db::SqliteDatabase;
use swagship_core::repositories::SqliteCodeRepository;

async fn setup_test_repo() -> SqliteCodeRepository {
    let db = SqliteDatabase::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    SqliteCodeRepository::new(db.pool().clone())
}

fn contact(email: &str) -> ContactInfo {
    ContactInfo {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        address1: "123 Main St".to_string(),
        address2: None,
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        postal_code: "62704".to_string(),
        country: Some("US".to_string()),
        phone: "555-0100".to_string(),
        email: email.to_string(),
    }
}

#[tokio::test]
async fn test_create_and_get_round_trip() -> Result<(), Error> {
    let repo = setup_test_repo().await;

    let created = repo.create("A1", "P1").await?;
    assert_eq!(created.redeem_code, "A1");
    assert_eq!(created.product_ref, "P1");

    let fetched = repo.get_by_code("A1").await?.expect("row should exist");
    assert_eq!(fetched.redeem_code, "A1");
    assert_eq!(fetched.product_ref, "P1");
    assert!(fetched.first_name.is_none());
    assert!(fetched.email.is_none());
    assert!(fetched.tracking.is_none());
    assert_eq!(fetched.status(), CodeStatus::Unused);
    Ok(())
}

#[tokio::test]
async fn test_get_missing_is_none() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    assert!(repo.get_by_code("NOPE").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_create_rejected() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    repo.create("A1", "P1").await?;

    let err = repo.create("A1", "P2").await.unwrap_err();
    assert!(matches!(err, Error::DuplicateKey(ref c) if c == "A1"));

    // The original row is untouched.
    let rec = repo.get_by_code("A1").await?.unwrap();
    assert_eq!(rec.product_ref, "P1");
    Ok(())
}

#[tokio::test]
async fn test_batch_create_rolls_back_on_conflict() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    repo.create("A1", "P1").await?;

    let batch = vec![
        NewCode {
            redeem_code: "B1".to_string(),
            product_ref: "P1".to_string(),
        },
        NewCode {
            redeem_code: "A1".to_string(),
            product_ref: "P1".to_string(),
        },
    ];
    let err = repo.batch_create(&batch).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateKey(ref c) if c == "A1"));

    // The conflict aborts the whole batch: B1 never landed.
    assert!(repo.get_by_code("B1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_batch_create_inserts_all() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    let batch = vec![
        NewCode {
            redeem_code: "A1".to_string(),
            product_ref: "P1".to_string(),
        },
        NewCode {
            redeem_code: "A2".to_string(),
            product_ref: "P2".to_string(),
        },
    ];
    repo.batch_create(&batch).await?;
    assert!(repo.get_by_code("A1").await?.is_some());
    assert!(repo.get_by_code("A2").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_update_missing_is_not_found() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    let mut rec = repo.create("A1", "P1").await?;
    rec.redeem_code = "GHOST".to_string();

    let err = repo.update(&rec).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref c) if c == "GHOST"));
    Ok(())
}

#[tokio::test]
async fn test_delete_is_idempotent() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    repo.create("A1", "P1").await?;

    repo.delete("A1").await?;
    assert!(repo.get_by_code("A1").await?.is_none());
    // Deleting again, or deleting something that never existed, is fine.
    repo.delete("A1").await?;
    repo.delete("NEVER").await?;
    Ok(())
}

#[tokio::test]
async fn test_mark_redeemed_fills_contact_exactly_once() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    repo.create("A1", "P1").await?;

    let rec = repo.mark_redeemed("A1", &contact("jane@example.com")).await?;
    assert_eq!(rec.email.as_deref(), Some("jane@example.com"));
    assert_eq!(rec.first_name.as_deref(), Some("Jane"));
    assert!(rec.address2.is_none());
    assert_eq!(rec.status(), CodeStatus::PendingShipping);

    let err = repo
        .mark_redeemed("A1", &contact("mallory@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyRedeemed(ref c) if c == "A1"));

    // The losing writer did not overwrite anything.
    let rec = repo.get_by_code("A1").await?.unwrap();
    assert_eq!(rec.email.as_deref(), Some("jane@example.com"));
    Ok(())
}

#[tokio::test]
async fn test_mark_redeemed_unknown_code() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    let err = repo
        .mark_redeemed("NOPE", &contact("jane@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCode(ref c) if c == "NOPE"));
    Ok(())
}

#[tokio::test]
async fn test_list_unused_pagination() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    for i in 1..=25 {
        repo.create(&format!("C{i:02}"), "P1").await?;
    }

    let (rows, total) = repo.list_unused(10, 2).await?;
    assert_eq!(total, 25);
    assert_eq!(rows.len(), 10);
    // Unused listing orders by (product_ref, redeem_code): page 2 of 10
    // is C11..C20.
    assert_eq!(rows.first().unwrap().redeem_code, "C11");
    assert_eq!(rows.last().unwrap().redeem_code, "C20");

    let (rows, total) = repo.list_unused(10, 3).await?;
    assert_eq!(total, 25);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.last().unwrap().redeem_code, "C25");
    Ok(())
}

#[tokio::test]
async fn test_list_filters_track_the_lifecycle() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    repo.create("UNUSED1", "P1").await?;
    repo.create("PENDING1", "P1").await?;
    repo.create("SHIPPED1", "P1").await?;

    repo.mark_redeemed("PENDING1", &contact("p@example.com")).await?;
    let mut shipped = repo.mark_redeemed("SHIPPED1", &contact("s@example.com")).await?;
    shipped.tracking = Some("1Z999".to_string());
    repo.update(&shipped).await?;

    let (unused, unused_total) = repo.list_unused(50, 1).await?;
    assert_eq!(unused_total, 1);
    assert_eq!(unused[0].redeem_code, "UNUSED1");

    let (pending, pending_total) = repo.list_pending_shipping(50, 1).await?;
    assert_eq!(pending_total, 1);
    assert_eq!(pending[0].redeem_code, "PENDING1");

    let shipped_rows = repo.list_shipped().await?;
    assert_eq!(shipped_rows.len(), 1);
    assert_eq!(shipped_rows[0].redeem_code, "SHIPPED1");
    assert_eq!(shipped_rows[0].status(), CodeStatus::Shipped);

    let redeemed = repo.list_all_redeemed().await?;
    let mut codes: Vec<_> = redeemed.iter().map(|r| r.redeem_code.as_str()).collect();
    codes.sort();
    assert_eq!(codes, vec!["PENDING1", "SHIPPED1"]);
    Ok(())
}

#[tokio::test]
async fn test_empty_tracking_still_counts_as_pending() -> Result<(), Error> {
    let repo = setup_test_repo().await;
    repo.create("A1", "P1").await?;
    let mut rec = repo.mark_redeemed("A1", &contact("j@example.com")).await?;
    rec.tracking = Some(String::new());
    repo.update(&rec).await?;

    let (pending, total) = repo.list_pending_shipping(50, 1).await?;
    assert_eq!(total, 1);
    assert_eq!(pending[0].redeem_code, "A1");
    assert!(repo.list_shipped().await?.is_empty());
    Ok(())
}
