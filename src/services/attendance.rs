//! Event check-in and attendance review service

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::database::{AttendanceRepository, EventRepository};
use crate::models::{
    Attendance, AttendanceStatus, AttendanceWithProfile, CheckInRequest, Event, GeoPoint, Profile,
};
use crate::services::storage::{StorageService, UploadedFile, CERTIFICATE_BUCKET, SELFIE_BUCKET};
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::helpers::{csv_quote, format_timestamp, underscore_whitespace};
use crate::utils::logging::{log_admin_action, log_user_action};

pub const CSV_HEADER: &str = "Name,Email,Check In,Check Out,Status";

/// Files and position submitted with a check-in
#[derive(Debug, Clone, Default)]
pub struct CheckInSubmission {
    pub selfie: Option<UploadedFile>,
    pub certificate: Option<UploadedFile>,
    pub position: Option<GeoPoint>,
}

/// Rendered attendance export
#[derive(Debug, Clone)]
pub struct AttendanceCsv {
    pub filename: String,
    pub body: String,
}

/// Check that `position` lies inside the event's geofence.
///
/// Events without coordinates accept any position.
pub fn check_geofence(event: &Event, position: Option<GeoPoint>) -> Result<()> {
    let Some(center) = event.geofence() else {
        return Ok(());
    };
    let position = position.ok_or_else(|| {
        KarmaHubError::InvalidInput("Your location is required to check in to this event".to_string())
    })?;
    if !position.is_valid() {
        return Err(KarmaHubError::InvalidInput("Location coordinates are out of range".to_string()));
    }

    let distance = center.distance_meters(&position);
    if distance > f64::from(event.radius_meters) {
        return Err(KarmaHubError::InvalidInput(format!(
            "You are {:.0} m from the venue; check-in is allowed within {} m",
            distance, event.radius_meters
        )));
    }
    Ok(())
}

/// Render attendance rows as CSV. Data cells are quoted, the header is not.
pub fn render_attendance_csv(event: &Event, rows: &[AttendanceWithProfile]) -> AttendanceCsv {
    let timestamp = |t: Option<DateTime<Utc>>| t.map(format_timestamp).unwrap_or_else(|| "N/A".to_string());

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for row in rows {
        let cells = [
            row.name.clone(),
            row.email.clone(),
            timestamp(row.check_in_time),
            timestamp(row.check_out_time),
            row.status.as_str().to_string(),
        ];
        lines.push(cells.iter().map(|c| csv_quote(c)).collect::<Vec<_>>().join(","));
    }

    AttendanceCsv {
        filename: format!("{}_attendance.csv", underscore_whitespace(&event.title)),
        body: lines.join("\n"),
    }
}

#[derive(Clone)]
pub struct AttendanceService {
    events: EventRepository,
    attendances: AttendanceRepository,
    storage: StorageService,
}

impl AttendanceService {
    pub fn new(events: EventRepository, attendances: AttendanceRepository, storage: StorageService) -> Self {
        Self { events, attendances, storage }
    }

    async fn event(&self, id: Uuid) -> Result<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or(KarmaHubError::EventNotFound { event_id: id })
    }

    /// Check the caller in to a live event
    pub async fn check_in(&self, user: &Profile, event_id: Uuid, submission: CheckInSubmission) -> Result<Attendance> {
        let selfie = submission
            .selfie
            .ok_or_else(|| KarmaHubError::InvalidInput("Please upload a selfie to check in".to_string()))?;

        let event = self.event(event_id).await?;
        let now = Utc::now();
        if !event.is_live(now) {
            return Err(KarmaHubError::InvalidInput("Check-in is only open while the event is live".to_string()));
        }
        check_geofence(&event, submission.position).map_err(|e| {
            warn!(user_id = %user.id, event_id = %event_id, error = %e, "Check-in outside geofence");
            e
        })?;

        let folder = event_id.to_string();
        let owner = user.id.to_string();
        let selfie_url = self.storage.store(SELFIE_BUCKET, &folder, &owner, &selfie).await?;
        let certificate_url = match &submission.certificate {
            Some(file) => Some(self.storage.store(CERTIFICATE_BUCKET, &folder, &owner, file).await?),
            None => None,
        };

        let request = CheckInRequest {
            event_id,
            user_id: user.id,
            selfie_url,
            certificate_url,
        };
        let attendance = self.attendances.upsert_check_in(request, now).await?;
        log_user_action(user.id, "check_in", Some(&event_id.to_string()));
        Ok(attendance)
    }

    /// Record the caller's check-out
    pub async fn check_out(&self, user: &Profile, event_id: Uuid) -> Result<Attendance> {
        let attendance = self
            .attendances
            .find_for_user(event_id, user.id)
            .await?
            .ok_or_else(|| KarmaHubError::InvalidInput("You have not checked in to this event".to_string()))?;

        let updated = self
            .attendances
            .set_check_out(attendance.id, Utc::now())
            .await?
            .ok_or_else(|| KarmaHubError::Conflict("You have already checked out".to_string()))?;
        log_user_action(user.id, "check_out", Some(&event_id.to_string()));
        Ok(updated)
    }

    pub async fn my_attendance(&self, user: &Profile, event_id: Uuid) -> Result<Option<Attendance>> {
        self.attendances.find_for_user(event_id, user.id).await
    }

    pub async fn my_attendances(&self, user: &Profile) -> Result<Vec<Attendance>> {
        self.attendances.list_for_user(user.id).await
    }

    /// Attendance sheet of an event for admins
    pub async fn event_attendance(&self, event_id: Uuid) -> Result<Vec<AttendanceWithProfile>> {
        self.event(event_id).await?;
        self.attendances.list_for_event_with_profiles(event_id).await
    }

    pub async fn set_status(&self, admin: &Profile, id: Uuid, status: AttendanceStatus) -> Result<Attendance> {
        let attendance = self.attendances.set_status(id, status).await?;
        log_admin_action(admin.id, "set_attendance_status", Some(&id.to_string()), Some(status.as_str()));
        debug!(attendance_id = %id, status = status.as_str(), "Attendance reviewed");
        Ok(attendance)
    }

    pub async fn export_csv(&self, event_id: Uuid) -> Result<AttendanceCsv> {
        let event = self.event(event_id).await?;
        let rows = self.attendances.list_for_event_with_profiles(event_id).await?;
        info!(event_id = %event_id, rows = rows.len(), "Attendance exported");
        Ok(render_attendance_csv(&event, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event_at(latitude: Option<f64>, longitude: Option<f64>) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            created_by_id: Uuid::new_v4(),
            title: "Tech  Fest 2025".to_string(),
            description: "Annual fest".to_string(),
            location_name: "Main Auditorium".to_string(),
            latitude,
            longitude,
            radius_meters: 100,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            banner_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_geofence_without_coordinates_accepts_anything() {
        let event = event_at(None, None);
        assert!(check_geofence(&event, None).is_ok());
        assert!(check_geofence(&event, Some(GeoPoint { latitude: 0.0, longitude: 0.0 })).is_ok());
    }

    #[test]
    fn test_geofence_radius() {
        let event = event_at(Some(12.9237), Some(77.5460));
        assert!(check_geofence(&event, None).is_err());

        let near = GeoPoint { latitude: 12.9240, longitude: 77.5462 };
        assert!(check_geofence(&event, Some(near)).is_ok());

        let far = GeoPoint { latitude: 12.9337, longitude: 77.5460 };
        assert!(check_geofence(&event, Some(far)).is_err());
    }

    #[test]
    fn test_render_csv() {
        let event = event_at(None, None);
        let check_in = Utc.with_ymd_and_hms(2025, 3, 14, 9, 5, 0).unwrap();
        let rows = vec![AttendanceWithProfile {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_id: Uuid::new_v4(),
            check_in_time: Some(check_in),
            check_out_time: None,
            selfie_url: None,
            certificate_url: None,
            status: AttendanceStatus::Approved,
            created_at: check_in,
            name: "Ravi \"RK\" Kumar".to_string(),
            email: "ravi@bnmit.in".to_string(),
        }];

        let csv = render_attendance_csv(&event, &rows);
        assert_eq!(csv.filename, "Tech_Fest_2025_attendance.csv");
        let mut lines = csv.body.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some("\"Ravi \"\"RK\"\" Kumar\",\"ravi@bnmit.in\",\"2025-03-14 09:05\",\"N/A\",\"approved\"")
        );
        assert_eq!(lines.next(), None);
    }
}
