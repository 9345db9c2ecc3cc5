//! Maintenance request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{Priority, RequestStatus, RequestType};

/// Maintenance request from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRequest {
    pub id: i32,
    pub subject: String,
    pub request_type: RequestType,
    pub equipment_id: i32,
    pub team_id: i32,
    /// Assigned technician
    pub technician_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub duration_hours: Option<f64>,
    pub status: RequestStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    /// Scheduled before `today` and still open
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        match self.scheduled_date {
            Some(date) if self.status.is_open() => date < today,
            _ => false,
        }
    }
}

/// Request with derived display fields
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestDetails {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub is_overdue: bool,
}

impl RequestDetails {
    pub fn new(request: MaintenanceRequest, today: NaiveDate) -> Self {
        let is_overdue = request.is_overdue_on(today);
        Self { request, is_overdue }
    }
}

/// Create or edit request body. There is no status field: new requests
/// always start in `New` and status only moves through a status update.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RequestInput {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,
    pub request_type: RequestType,
    pub equipment_id: i32,
    pub team_id: i32,
    pub technician_id: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub priority: Priority,
}

/// Request query filters; every set field must match
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams, ToSchema)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    /// Scheduled on or after this date (YYYY-MM-DD)
    pub scheduled_from: Option<NaiveDate>,
    /// Scheduled on or before this date (YYYY-MM-DD)
    pub scheduled_to: Option<NaiveDate>,
    pub equipment_id: Option<i32>,
    pub team_id: Option<i32>,
    /// `true` for New and In Progress only, `false` for Repaired and Scrap only
    pub open: Option<bool>,
}

impl RequestFilter {
    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn matches(&self, request: &MaintenanceRequest) -> bool {
        if self.status.is_some_and(|s| s != request.status) {
            return false;
        }
        if self.request_type.is_some_and(|t| t != request.request_type) {
            return false;
        }
        if self.equipment_id.is_some_and(|id| id != request.equipment_id) {
            return false;
        }
        if self.team_id.is_some_and(|id| id != request.team_id) {
            return false;
        }
        if self.open.is_some_and(|open| open != request.status.is_open()) {
            return false;
        }
        if self.scheduled_from.is_some() || self.scheduled_to.is_some() {
            let Some(date) = request.scheduled_date else {
                return false;
            };
            if self.scheduled_from.is_some_and(|from| date < from) {
                return false;
            }
            if self.scheduled_to.is_some_and(|to| date > to) {
                return false;
            }
        }
        true
    }
}

/// One atomic status transition, committed by the store as a unit
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub request_id: i32,
    pub status: RequestStatus,
    /// Also flag the request's current equipment as scrapped
    pub scrap: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(status: RequestStatus, scheduled: Option<NaiveDate>) -> MaintenanceRequest {
        MaintenanceRequest {
            id: 1,
            subject: "Leaking hydraulic hose".to_string(),
            request_type: RequestType::Corrective,
            equipment_id: 1,
            team_id: 1,
            technician_id: None,
            scheduled_date: scheduled,
            duration_hours: None,
            status,
            priority: Priority::Medium,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_overdue_yesterday_while_open() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let yesterday = today - Duration::days(1);

        assert!(sample(RequestStatus::New, Some(yesterday)).is_overdue_on(today));
        assert!(sample(RequestStatus::InProgress, Some(yesterday)).is_overdue_on(today));
        assert!(!sample(RequestStatus::Repaired, Some(yesterday)).is_overdue_on(today));
        assert!(!sample(RequestStatus::Scrap, Some(yesterday)).is_overdue_on(today));
    }

    #[test]
    fn test_not_overdue_today_or_unscheduled() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(!sample(RequestStatus::New, Some(today)).is_overdue_on(today));
        assert!(!sample(RequestStatus::New, None).is_overdue_on(today));
    }

    #[test]
    fn test_filter_date_range_is_inclusive() {
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let filter = RequestFilter {
            scheduled_from: Some(first),
            scheduled_to: Some(last),
            ..Default::default()
        };

        assert!(filter.matches(&sample(RequestStatus::New, Some(first))));
        assert!(filter.matches(&sample(RequestStatus::New, Some(last))));
        assert!(!filter.matches(&sample(RequestStatus::New, Some(last + Duration::days(1)))));
        assert!(!filter.matches(&sample(RequestStatus::New, None)));
    }

    #[test]
    fn test_filter_open_flag() {
        let open = RequestFilter {
            open: Some(true),
            ..Default::default()
        };
        let closed = RequestFilter {
            open: Some(false),
            ..Default::default()
        };

        assert!(open.matches(&sample(RequestStatus::InProgress, None)));
        assert!(!open.matches(&sample(RequestStatus::Repaired, None)));
        assert!(closed.matches(&sample(RequestStatus::Scrap, None)));
        assert!(!closed.matches(&sample(RequestStatus::New, None)));
    }

    #[test]
    fn test_details_serializes_flat() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let details = RequestDetails::new(sample(RequestStatus::InProgress, None), today);
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["status"], "In Progress");
        assert_eq!(value["is_overdue"], false);
        assert_eq!(value["subject"], "Leaking hydraulic hose");
    }
}
