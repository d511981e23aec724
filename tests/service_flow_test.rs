//! End-to-end service flows against a real Postgres

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serial_test::serial;
use KarmaHub::models::{
    AppRole, CreateGeneratedPostRequest, CreateTemplateRequest, GeoPoint, ListingStatus, PostType,
    RegistrationStatus, TransactionStatus, UpdateListingRequest,
};
use KarmaHub::services::{CheckInSubmission, ServiceFactory, UploadedFile};
use KarmaHub::utils::errors::KarmaHubError;

fn selfie() -> UploadedFile {
    UploadedFile::new("me.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

#[tokio::test]
#[serial]
async fn test_marketplace_purchase_flow() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let market = &services.marketplace_service;

    let seller = helpers::create_profile(&db, AppRole::Student).await;
    let buyer = helpers::create_profile(&db, AppRole::Student).await;
    let listing = market.create_listing(&seller, helpers::listing_request(250.0)).await.unwrap();

    let own = market.start_purchase(&seller, listing.id).await.unwrap_err();
    assert_matches!(own, KarmaHubError::InvalidInput(msg) if msg == "You cannot buy your own listing");

    let tx = market.start_purchase(&buyer, listing.id).await.unwrap();
    assert_eq!(tx.amount, 250.0);

    let stranger = market.confirm_payment(&seller, tx.id).await.unwrap_err();
    assert_matches!(stranger, KarmaHubError::PermissionDenied(_));

    let (_, sold) = market.confirm_payment(&buyer, tx.id).await.unwrap();
    assert_eq!(sold.status, ListingStatus::Sold);

    assert!(market.browse(Default::default()).await.unwrap().is_empty());
    assert_eq!(market.my_purchases(&buyer).await.unwrap().len(), 1);

    let late = market.start_purchase(&buyer, listing.id).await.unwrap_err();
    assert_matches!(late, KarmaHubError::Conflict(_));
}

#[tokio::test]
#[serial]
async fn test_check_in_geofence_and_export() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let attendance = &services.attendance_service;

    let admin = helpers::create_profile(&db, AppRole::Admin).await;
    let student = helpers::create_profile(&db, AppRole::Student).await;
    let event = helpers::create_event(&db, &admin, helpers::live_event_request()).await;

    let far = CheckInSubmission {
        selfie: Some(selfie()),
        certificate: None,
        position: Some(GeoPoint { latitude: 13.05, longitude: 77.59 }),
    };
    let err = attendance.check_in(&student, event.id, far).await.unwrap_err();
    assert_matches!(err, KarmaHubError::InvalidInput(_));

    let no_selfie = CheckInSubmission { selfie: None, certificate: None, position: None };
    let err = attendance.check_in(&student, event.id, no_selfie).await.unwrap_err();
    assert_matches!(err, KarmaHubError::InvalidInput(msg) if msg == "Please upload a selfie to check in");

    let near = CheckInSubmission {
        selfie: Some(selfie()),
        certificate: None,
        position: Some(GeoPoint { latitude: 12.9717, longitude: 77.5946 }),
    };
    let row = attendance.check_in(&student, event.id, near).await.unwrap();
    assert!(row.selfie_url.as_deref().unwrap_or_default().contains("event-selfies"));

    attendance.check_out(&student, event.id).await.unwrap();
    let again = attendance.check_out(&student, event.id).await.unwrap_err();
    assert_matches!(again, KarmaHubError::Conflict(_));

    let csv = attendance.export_csv(event.id).await.unwrap();
    assert!(csv.filename.starts_with("Hack_Night"));
    assert_eq!(csv.body.lines().count(), 2);
    assert!(csv.body.contains(&student.email));
}

#[tokio::test]
#[serial]
async fn test_registration_review_and_resubmit() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let registrations = &services.registration_service;

    let admin = helpers::create_profile(&db, AppRole::Admin).await;
    let student = helpers::create_profile(&db, AppRole::Student).await;
    let event = helpers::create_event(&db, &admin, helpers::live_event_request()).await;
    let proof = || Some(UploadedFile::new("receipt.pdf", b"%PDF-1.4".to_vec()));

    let first = registrations.register(&student, event.id, proof(), None).await.unwrap();
    let dup = registrations.register(&student, event.id, proof(), None).await.unwrap_err();
    assert_matches!(dup, KarmaHubError::Conflict(_));

    let pending = registrations.review(&admin, first.id, RegistrationStatus::Pending).await.unwrap_err();
    assert_matches!(pending, KarmaHubError::InvalidInput(_));

    registrations.review(&admin, first.id, RegistrationStatus::Rejected).await.unwrap();
    let resubmitted = registrations
        .register(&student, event.id, proof(), Some("second try".to_string()))
        .await
        .unwrap();
    assert_eq!(resubmitted.id, first.id);
    assert_eq!(resubmitted.status, RegistrationStatus::Pending);
    assert_eq!(resubmitted.note.as_deref(), Some("second try"));

    let listed = registrations.event_registrations(event.id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_admin_cannot_demote_self() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let profiles = &services.profile_service;

    let admin = helpers::create_profile(&db, AppRole::Admin).await;
    let student = helpers::create_profile(&db, AppRole::Student).await;

    let err = profiles.set_role(&admin, admin.id, AppRole::Student).await.unwrap_err();
    assert_matches!(err, KarmaHubError::InvalidInput(msg) if msg == "You cannot remove your own admin role");
    assert_eq!(profiles.get_profile(admin.id).await.unwrap().role, AppRole::Admin);

    let promoted = profiles.set_role(&admin, student.id, AppRole::Admin).await.unwrap();
    assert_eq!(promoted.role, AppRole::Admin);
}

#[tokio::test]
#[serial]
async fn test_check_in_requires_live_event() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();

    let admin = helpers::create_profile(&db, AppRole::Admin).await;
    let student = helpers::create_profile(&db, AppRole::Student).await;

    let mut upcoming = helpers::live_event_request();
    upcoming.start_time = Utc::now() + Duration::days(1);
    upcoming.end_time = upcoming.start_time + Duration::hours(3);
    let event = helpers::create_event(&db, &admin, upcoming).await;

    let submission = CheckInSubmission {
        selfie: Some(selfie()),
        certificate: None,
        position: Some(GeoPoint { latitude: 12.9716, longitude: 77.5946 }),
    };
    let err = services.attendance_service.check_in(&student, event.id, submission).await.unwrap_err();
    assert_matches!(err, KarmaHubError::InvalidInput(msg) if msg == "Check-in is only open while the event is live");
    assert!(services.attendance_service.my_attendance(&student, event.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_listing_permissions_and_sold_lock() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let market = &services.marketplace_service;

    let seller = helpers::create_profile(&db, AppRole::Student).await;
    let stranger = helpers::create_profile(&db, AppRole::Student).await;
    let admin = helpers::create_profile(&db, AppRole::Admin).await;
    let listing = market.create_listing(&seller, helpers::listing_request(300.0)).await.unwrap();

    let rename = |title: &str| UpdateListingRequest { title: Some(title.to_string()), ..Default::default() };

    let err = market.update_listing(&stranger, listing.id, rename("Mine now")).await.unwrap_err();
    assert_matches!(err, KarmaHubError::PermissionDenied(_));
    let err = market.delete_listing(&stranger, listing.id).await.unwrap_err();
    assert_matches!(err, KarmaHubError::PermissionDenied(_));

    let updated = market.update_listing(&admin, listing.id, rename("Casio fx-991EX")).await.unwrap();
    assert_eq!(updated.title, "Casio fx-991EX");

    let tx = market.start_purchase(&stranger, listing.id).await.unwrap();
    market.confirm_payment(&stranger, tx.id).await.unwrap();

    let err = market.update_listing(&seller, listing.id, rename("Too late")).await.unwrap_err();
    assert_matches!(err, KarmaHubError::Conflict(msg) if msg == "Sold listings cannot be edited");

    let image = UploadedFile::new("after.png", vec![0x89, 0x50, 0x4E, 0x47]);
    let err = market.attach_listing_image(&seller, listing.id, image).await.unwrap_err();
    assert_matches!(err, KarmaHubError::Conflict(msg) if msg == "Sold listings cannot be edited");
    assert!(market.get_listing(listing.id).await.unwrap().images.is_empty());

    let other = market.create_listing(&seller, helpers::listing_request(80.0)).await.unwrap();
    market.delete_listing(&admin, other.id).await.unwrap();
    assert_matches!(
        market.get_listing(other.id).await.unwrap_err(),
        KarmaHubError::ListingNotFound { .. }
    );
}

#[tokio::test]
#[serial]
async fn test_cancel_payment_transitions() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let market = &services.marketplace_service;

    let seller = helpers::create_profile(&db, AppRole::Student).await;
    let buyer = helpers::create_profile(&db, AppRole::Student).await;
    let listing = market.create_listing(&seller, helpers::listing_request(150.0)).await.unwrap();

    let tx = market.start_purchase(&buyer, listing.id).await.unwrap();
    let cancelled = market.cancel_payment(&buyer, tx.id).await.unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Failed);

    let err = market.confirm_payment(&buyer, tx.id).await.unwrap_err();
    assert_matches!(err, KarmaHubError::InvalidStateTransition { from, to } if from == "failed" && to == "paid");

    let err = market.cancel_payment(&buyer, tx.id).await.unwrap_err();
    assert_matches!(err, KarmaHubError::InvalidStateTransition { .. });

    assert_eq!(market.get_listing(listing.id).await.unwrap().status, ListingStatus::Active);
}

#[tokio::test]
#[serial]
async fn test_posts_and_templates_are_owner_only() {
    let test_db = require_db!();
    let dir = tempfile::tempdir().unwrap();
    let settings = helpers::test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let posts = &services.post_service;

    let owner = helpers::create_profile(&db, AppRole::Student).await;
    let other = helpers::create_profile(&db, AppRole::Student).await;

    let post = db
        .posts
        .create(CreateGeneratedPostRequest {
            user_id: owner.id,
            event_id: None,
            post_type: PostType::Project,
            details: "Built a campus ride-share app".to_string(),
            content: "Excited to share our ride-share app!".to_string(),
        })
        .await
        .unwrap();
    let template = posts
        .create_template(
            &owner,
            CreateTemplateRequest { post_type: PostType::Project, base_text: "Shipped {project}".to_string() },
        )
        .await
        .unwrap();

    let err = posts.delete_post(&other, post.id).await.unwrap_err();
    assert_matches!(err, KarmaHubError::PermissionDenied(_));
    let err = posts.delete_template(&other, template.id).await.unwrap_err();
    assert_matches!(err, KarmaHubError::PermissionDenied(_));
    assert_eq!(posts.my_posts(&owner).await.unwrap().len(), 1);
    assert_eq!(posts.list_templates(&owner).await.unwrap().len(), 1);

    posts.delete_post(&owner, post.id).await.unwrap();
    posts.delete_template(&owner, template.id).await.unwrap();
    assert!(posts.my_posts(&owner).await.unwrap().is_empty());
    assert!(posts.list_templates(&owner).await.unwrap().is_empty());
}
