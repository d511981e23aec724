//! Repository tests against a real Postgres

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serial_test::serial;
use KarmaHub::models::{
    AppRole, CheckInRequest, ListingFilter, ListingSort, ListingStatus, RegistrationStatus,
    TransactionStatus,
};
use KarmaHub::utils::errors::KarmaHubError;

#[tokio::test]
#[serial]
async fn test_purchase_marks_listing_sold_once() {
    let test_db = require_db!();
    let db = test_db.service();

    let seller = helpers::create_profile(&db, AppRole::Student).await;
    let first = helpers::create_profile(&db, AppRole::Student).await;
    let second = helpers::create_profile(&db, AppRole::Student).await;
    let listing = helpers::create_listing(&db, &seller, 450.0).await;

    let tx1 = db.transactions.create(listing.id, first.id, listing.expected_price).await.unwrap();
    let tx2 = db.transactions.create(listing.id, second.id, listing.expected_price).await.unwrap();
    assert_eq!(tx1.status, TransactionStatus::Pending);

    let (paid, sold) = db.transactions.complete_purchase(tx1.id).await.unwrap();
    assert_eq!(paid.status, TransactionStatus::Paid);
    assert_eq!(sold.status, ListingStatus::Sold);
    assert_eq!(sold.buyer_id, Some(first.id));

    let err = db.transactions.complete_purchase(tx2.id).await.unwrap_err();
    assert_matches!(err, KarmaHubError::Conflict(msg) if msg == "This item has already been sold");

    // the losing transaction was rolled back, not marked paid
    let tx2 = db.transactions.find_by_id(tx2.id).await.unwrap().unwrap();
    assert_eq!(tx2.status, TransactionStatus::Pending);

    let err = db.transactions.complete_purchase(tx1.id).await.unwrap_err();
    assert_matches!(err, KarmaHubError::Conflict(msg) if msg == "Transaction is no longer pending");

    let purchases = db.listings.list_by_buyer(first.id).await.unwrap();
    assert_eq!(purchases.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_transition_only_from_expected_status() {
    let test_db = require_db!();
    let db = test_db.service();

    let seller = helpers::create_profile(&db, AppRole::Student).await;
    let buyer = helpers::create_profile(&db, AppRole::Student).await;
    let listing = helpers::create_listing(&db, &seller, 100.0).await;
    let tx = db.transactions.create(listing.id, buyer.id, 100.0).await.unwrap();

    let failed = db
        .transactions
        .transition(tx.id, TransactionStatus::Pending, TransactionStatus::Failed)
        .await
        .unwrap();
    assert_eq!(failed.map(|t| t.status), Some(TransactionStatus::Failed));

    let again = db
        .transactions
        .transition(tx.id, TransactionStatus::Pending, TransactionStatus::Paid)
        .await
        .unwrap();
    assert!(again.is_none());
}

#[tokio::test]
#[serial]
async fn test_listing_filters_and_sort() {
    let test_db = require_db!();
    let db = test_db.service();

    let seller = helpers::create_profile(&db, AppRole::Student).await;
    helpers::create_listing(&db, &seller, 300.0).await;
    helpers::create_listing(&db, &seller, 100.0).await;
    helpers::create_listing(&db, &seller, 200.0).await;

    let filter = ListingFilter {
        status: Some(ListingStatus::Active),
        sort: ListingSort::PriceLow,
        ..Default::default()
    };
    let prices: Vec<f64> = db.listings.list(&filter).await.unwrap().iter().map(|l| l.expected_price).collect();
    assert_eq!(prices, vec![100.0, 200.0, 300.0]);

    assert_eq!(db.listings.count_by_status(ListingStatus::Sold).await.unwrap(), 0);
    assert_eq!(db.listings.count().await.unwrap(), 3);
}

#[tokio::test]
#[serial]
async fn test_repeat_check_in_resets_attendance() {
    let test_db = require_db!();
    let db = test_db.service();

    let admin = helpers::create_profile(&db, AppRole::Admin).await;
    let student = helpers::create_profile(&db, AppRole::Student).await;
    let event = helpers::create_event(&db, &admin, helpers::live_event_request()).await;
    assert_eq!(event.radius_meters, 100);

    let first_at = Utc::now() - Duration::minutes(30);
    let first = db
        .attendances
        .upsert_check_in(
            CheckInRequest {
                event_id: event.id,
                user_id: student.id,
                selfie_url: "http://files/a.jpg".to_string(),
                certificate_url: None,
            },
            first_at,
        )
        .await
        .unwrap();

    let checked_out = db.attendances.set_check_out(first.id, Utc::now()).await.unwrap().unwrap();
    assert!(checked_out.check_out_time.is_some());
    assert!(db.attendances.set_check_out(first.id, Utc::now()).await.unwrap().is_none());

    db.attendances
        .set_status(first.id, KarmaHub::models::AttendanceStatus::Approved)
        .await
        .unwrap();

    let second = db
        .attendances
        .upsert_check_in(
            CheckInRequest {
                event_id: event.id,
                user_id: student.id,
                selfie_url: "http://files/b.jpg".to_string(),
                certificate_url: Some("http://files/c.pdf".to_string()),
            },
            Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert!(second.check_out_time.is_none());
    assert_eq!(second.status, KarmaHub::models::AttendanceStatus::Pending);
    assert_eq!(second.selfie_url.as_deref(), Some("http://files/b.jpg"));

    let rows = db.attendances.list_for_event_with_profiles(event.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email, student.email);
}

#[tokio::test]
#[serial]
async fn test_registration_resubmit_only_after_rejection() {
    let test_db = require_db!();
    let db = test_db.service();

    let admin = helpers::create_profile(&db, AppRole::Admin).await;
    let student = helpers::create_profile(&db, AppRole::Student).await;
    let event = helpers::create_event(&db, &admin, helpers::live_event_request()).await;

    let registration = db
        .registrations
        .create(event.id, student.id, "http://files/proof.png", Some("team of 3".to_string()))
        .await
        .unwrap();
    assert_eq!(registration.status, RegistrationStatus::Pending);

    let duplicate = db
        .registrations
        .create(event.id, student.id, "http://files/other.png", None)
        .await
        .unwrap_err();
    assert_matches!(duplicate, KarmaHubError::Conflict(_));

    assert!(db
        .registrations
        .resubmit(registration.id, "http://files/new.png", None)
        .await
        .unwrap()
        .is_none());

    let rejected = db
        .registrations
        .review(registration.id, RegistrationStatus::Rejected, admin.id)
        .await
        .unwrap();
    assert_eq!(rejected.reviewed_by_id, Some(admin.id));

    let resubmitted = db
        .registrations
        .resubmit(registration.id, "http://files/new.png", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resubmitted.status, RegistrationStatus::Pending);
    assert_eq!(resubmitted.proof_url, "http://files/new.png");
    assert!(resubmitted.reviewed_by_id.is_none());
}

#[tokio::test]
#[serial]
async fn test_upcoming_events_exclude_finished() {
    let test_db = require_db!();
    let db = test_db.service();
    let admin = helpers::create_profile(&db, AppRole::Admin).await;

    let mut past = helpers::live_event_request();
    past.start_time = Utc::now() - Duration::days(2);
    past.end_time = Utc::now() - Duration::days(1);
    helpers::create_event(&db, &admin, past).await;
    let live = helpers::create_event(&db, &admin, helpers::live_event_request()).await;

    let upcoming = db.events.list_upcoming(Utc::now()).await.unwrap();
    assert_eq!(upcoming.iter().map(|e| e.id).collect::<Vec<_>>(), vec![live.id]);
    assert_eq!(db.events.list_all().await.unwrap().len(), 2);
    assert_eq!(db.events.count_upcoming(Utc::now()).await.unwrap(), 1);
}
