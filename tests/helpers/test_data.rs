//! Fake data for integration tests

use chrono::{Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use KarmaHub::config::Settings;
use KarmaHub::database::{DatabaseService, NewAccount};
use KarmaHub::models::{
    AppRole, CreateEventRequest, CreateListingRequest, Event, Listing, ListingCategory, ListingCondition,
    Profile,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Settings pointing at local test resources
pub fn test_settings(database_url: &str, upload_dir: &str) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = database_url.to_string();
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings.storage.root_dir = upload_dir.to_string();
    settings.redis.url = "redis://127.0.0.1:1".to_string();
    settings
}

pub async fn create_profile(db: &DatabaseService, role: AppRole) -> Profile {
    let (_, profile) = db
        .accounts
        .create_with_profile(NewAccount {
            email: SafeEmail().fake::<String>().to_lowercase(),
            password_hash: "not-a-real-hash".to_string(),
            email_confirmed: true,
            name: Name().fake(),
            role,
        })
        .await
        .expect("Failed to create test profile");
    profile
}

pub fn listing_request(price: f64) -> CreateListingRequest {
    CreateListingRequest {
        title: format!("Scientific calculator {}", (1..999).fake::<u32>()),
        description: Sentence(5..12).fake(),
        category: ListingCategory::Calculator,
        condition: ListingCondition::Used,
        original_price: price * 2.0,
        expected_price: price,
        images: vec![],
    }
}

pub async fn create_listing(db: &DatabaseService, seller: &Profile, price: f64) -> Listing {
    db.listings
        .create(seller.id, listing_request(price))
        .await
        .expect("Failed to create test listing")
}

/// An event that started an hour ago and ends in an hour
pub fn live_event_request() -> CreateEventRequest {
    let now = Utc::now();
    CreateEventRequest {
        title: "Hack Night".to_string(),
        description: Sentence(5..12).fake(),
        location_name: "Main Auditorium".to_string(),
        latitude: Some(12.9716),
        longitude: Some(77.5946),
        radius_meters: None,
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(1),
        banner_image_url: None,
    }
}

pub async fn create_event(db: &DatabaseService, admin: &Profile, request: CreateEventRequest) -> Event {
    db.events
        .create(admin.id, request)
        .await
        .expect("Failed to create test event")
}
