//! Event repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::event::{Event, CreateEventRequest, UpdateEventRequest};
use crate::utils::errors::KarmaHubError;

#[derive(Clone, Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, created_by_id: Uuid, request: CreateEventRequest) -> Result<Event, KarmaHubError> {
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (id, created_by_id, title, description, location_name, latitude, longitude, radius_meters, start_time, end_time, banner_image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING id, created_by_id, title, description, location_name, latitude, longitude, radius_meters, start_time, end_time, banner_image_url, created_at, updated_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(created_by_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location_name)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.radius_meters.unwrap_or(100))
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.banner_image_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, KarmaHubError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, created_by_id, title, description, location_name, latitude, longitude, radius_meters, start_time, end_time, banner_image_url, created_at, updated_at FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Replace the stored event with an already merged and validated value
    pub async fn update(&self, event: &Event) -> Result<Event, KarmaHubError> {
        let updated = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                location_name = $4,
                latitude = $5,
                longitude = $6,
                radius_meters = $7,
                start_time = $8,
                end_time = $9,
                banner_image_url = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING id, created_by_id, title, description, location_name, latitude, longitude, radius_meters, start_time, end_time, banner_image_url, created_at, updated_at
            "#
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location_name)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.radius_meters)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.banner_image_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(KarmaHubError::EventNotFound { event_id: event.id })
    }

    /// Delete event; returns false when nothing was deleted
    pub async fn delete(&self, id: Uuid) -> Result<bool, KarmaHubError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All events, latest start first
    pub async fn list_all(&self) -> Result<Vec<Event>, KarmaHubError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, created_by_id, title, description, location_name, latitude, longitude, radius_meters, start_time, end_time, banner_image_url, created_at, updated_at FROM events ORDER BY start_time DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Events that have not ended at `now`, soonest first
    pub async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, KarmaHubError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, created_by_id, title, description, location_name, latitude, longitude, radius_meters, start_time, end_time, banner_image_url, created_at, updated_at FROM events WHERE end_time > $1 ORDER BY start_time ASC"
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64, KarmaHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count events that have not ended at `now`
    pub async fn count_upcoming(&self, now: DateTime<Utc>) -> Result<i64, KarmaHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE end_time > $1")
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

/// Apply the present fields of an update request onto an event
pub fn merge_event_update(mut event: Event, request: UpdateEventRequest) -> Event {
    if let Some(title) = request.title {
        event.title = title;
    }
    if let Some(description) = request.description {
        event.description = description;
    }
    if let Some(location_name) = request.location_name {
        event.location_name = location_name;
    }
    if let Some(latitude) = request.latitude {
        event.latitude = latitude;
    }
    if let Some(longitude) = request.longitude {
        event.longitude = longitude;
    }
    if let Some(radius) = request.radius_meters {
        event.radius_meters = radius;
    }
    if let Some(start) = request.start_time {
        event.start_time = start;
    }
    if let Some(end) = request.end_time {
        event.end_time = end;
    }
    if let Some(banner) = request.banner_image_url {
        event.banner_image_url = banner;
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn event_with_location() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            created_by_id: Uuid::new_v4(),
            title: "Hack Night".to_string(),
            description: "Overnight build".to_string(),
            location_name: "Main Auditorium".to_string(),
            latitude: Some(12.9),
            longitude: Some(77.5),
            radius_meters: 100,
            start_time: now,
            end_time: now + Duration::hours(2),
            banner_image_url: Some("https://cdn.example/banner.png".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_explicit_null_clears_location_and_banner() {
        let request: UpdateEventRequest = serde_json::from_str(
            r#"{"latitude":null,"longitude":null,"banner_image_url":null}"#,
        )
        .unwrap();
        let merged = merge_event_update(event_with_location(), request);

        assert_eq!(merged.latitude, None);
        assert_eq!(merged.longitude, None);
        assert_eq!(merged.banner_image_url, None);
        assert!(merged.geofence().is_none());
    }

    #[test]
    fn test_absent_fields_are_kept() {
        let request: UpdateEventRequest = serde_json::from_str(r#"{"title":"Demo Day"}"#).unwrap();
        let merged = merge_event_update(event_with_location(), request);

        assert_eq!(merged.title, "Demo Day");
        assert_eq!(merged.latitude, Some(12.9));
        assert_eq!(merged.longitude, Some(77.5));
        assert!(merged.banner_image_url.is_some());
    }

    #[test]
    fn test_new_coordinates_replace_old() {
        let request: UpdateEventRequest =
            serde_json::from_str(r#"{"latitude":13.0,"longitude":77.6}"#).unwrap();
        let merged = merge_event_update(event_with_location(), request);

        assert_eq!(merged.latitude, Some(13.0));
        assert_eq!(merged.longitude, Some(77.6));
    }
}
