//! Event management service

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;
use crate::database::{merge_event_update, EventRepository};
use crate::models::{CreateEventRequest, Event, EventScope, GeoPoint, Profile, UpdateEventRequest};
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::logging::log_admin_action;

pub const DEFAULT_RADIUS_METERS: i32 = 100;

/// Borrowed view over the editable fields of an event
#[derive(Debug, Clone, Copy)]
pub struct EventFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub location_name: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl<'a> From<&'a Event> for EventFields<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            title: &event.title,
            description: &event.description,
            location_name: &event.location_name,
            latitude: event.latitude,
            longitude: event.longitude,
            radius_meters: event.radius_meters,
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

impl<'a> From<&'a CreateEventRequest> for EventFields<'a> {
    fn from(request: &'a CreateEventRequest) -> Self {
        Self {
            title: &request.title,
            description: &request.description,
            location_name: &request.location_name,
            latitude: request.latitude,
            longitude: request.longitude,
            radius_meters: request.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS),
            start_time: request.start_time,
            end_time: request.end_time,
        }
    }
}

/// Validate event fields before they are stored
pub fn validate_event(fields: EventFields<'_>) -> Result<()> {
    let required = [
        ("Title", fields.title),
        ("Description", fields.description),
        ("Location", fields.location_name),
    ];
    for (label, value) in required {
        if value.trim().is_empty() {
            return Err(KarmaHubError::InvalidInput(format!("{} is required", label)));
        }
    }
    if fields.end_time <= fields.start_time {
        return Err(KarmaHubError::InvalidInput("End time must be after start time".to_string()));
    }
    if fields.radius_meters <= 0 {
        return Err(KarmaHubError::InvalidInput("Radius must be positive".to_string()));
    }
    match (fields.latitude, fields.longitude) {
        (None, None) => {}
        (Some(latitude), Some(longitude)) => {
            if !(GeoPoint { latitude, longitude }).is_valid() {
                return Err(KarmaHubError::InvalidInput(
                    "Latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
                ));
            }
        }
        _ => {
            return Err(KarmaHubError::InvalidInput(
                "Latitude and longitude must be given together".to_string(),
            ))
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
}

impl EventService {
    pub fn new(events: EventRepository) -> Self {
        Self { events }
    }

    pub async fn list_events(&self, scope: EventScope) -> Result<Vec<Event>> {
        match scope {
            EventScope::All => self.events.list_all().await,
            EventScope::Upcoming => self.events.list_upcoming(Utc::now()).await,
        }
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or(KarmaHubError::EventNotFound { event_id: id })
    }

    pub async fn create_event(&self, admin: &Profile, request: CreateEventRequest) -> Result<Event> {
        validate_event(EventFields::from(&request))?;

        let event = self.events.create(admin.id, request).await?;
        log_admin_action(admin.id, "create_event", Some(&event.id.to_string()), Some(&event.title));
        info!(event_id = %event.id, "Event created");
        Ok(event)
    }

    pub async fn update_event(&self, admin: &Profile, id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        let current = self.get_event(id).await?;
        let merged = merge_event_update(current, request);
        validate_event(EventFields::from(&merged))?;

        let event = self.events.update(&merged).await?;
        log_admin_action(admin.id, "update_event", Some(&id.to_string()), None);
        Ok(event)
    }

    pub async fn delete_event(&self, admin: &Profile, id: Uuid) -> Result<()> {
        if !self.events.delete(id).await? {
            return Err(KarmaHubError::EventNotFound { event_id: id });
        }
        log_admin_action(admin.id, "delete_event", Some(&id.to_string()), None);
        Ok(())
    }
}
