//! Preventive maintenance month calendar

use std::{collections::BTreeMap, sync::Arc};

use chrono::{Datelike, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        calendar::{CalendarView, Week},
        RequestDetails, RequestFilter, RequestType,
    },
    repository::EntityStore,
};

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn EntityStore>,
}

impl CalendarService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Month grid plus the preventive requests scheduled in it
    pub async fn build_month(&self, year: i32, month: u32) -> AppResult<CalendarView> {
        let (first, last) = month_bounds(year, month)?;
        let (prev_month, prev_year) = previous_month(year, month)?;
        let (next_month, next_year) = next_month(year, month)?;

        let filter = RequestFilter {
            request_type: Some(RequestType::Preventive),
            scheduled_from: Some(first),
            scheduled_to: Some(last),
            ..Default::default()
        };
        let today = Utc::now().date_naive();

        let mut requests_by_day: BTreeMap<u32, Vec<RequestDetails>> = BTreeMap::new();
        for request in self.store.query_requests(&filter).await? {
            if let Some(date) = request.scheduled_date {
                requests_by_day
                    .entry(date.day())
                    .or_default()
                    .push(RequestDetails::new(request, today));
            }
        }

        tracing::debug!(
            "Calendar {}-{:02}: {} scheduled days",
            year, month, requests_by_day.len()
        );

        Ok(CalendarView {
            year,
            month,
            month_name: first.format("%B").to_string(),
            weeks: month_grid(first, last.day()),
            requests_by_day,
            prev_month,
            prev_year,
            next_month,
            next_year,
        })
    }
}

/// First and last day of a month
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::InvalidDate(format!("{}-{:02} is not a valid month", year, month));

    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (following_month, following_year) = next_month(year, month)?;
    let last = NaiveDate::from_ymd_opt(following_year, following_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// (month, year) before the given month
pub fn previous_month(year: i32, month: u32) -> AppResult<(u32, i32)> {
    match month {
        1 => year
            .checked_sub(1)
            .map(|y| (12, y))
            .ok_or_else(|| AppError::InvalidDate(format!("Year {} out of range", year))),
        2..=12 => Ok((month - 1, year)),
        _ => Err(AppError::InvalidDate(format!("Month {} out of range", month))),
    }
}

/// (month, year) after the given month
pub fn next_month(year: i32, month: u32) -> AppResult<(u32, i32)> {
    match month {
        12 => year
            .checked_add(1)
            .map(|y| (1, y))
            .ok_or_else(|| AppError::InvalidDate(format!("Year {} out of range", year))),
        1..=11 => Ok((month + 1, year)),
        _ => Err(AppError::InvalidDate(format!("Month {} out of range", month))),
    }
}

/// Sunday-first week rows; cells outside the month are `None`
pub fn month_grid(first: NaiveDate, days_in_month: u32) -> Vec<Week> {
    let mut weeks = Vec::with_capacity(6);
    let mut week: Week = [None; 7];
    let mut column = first.weekday().num_days_from_sunday() as usize;

    for day in 1..=days_in_month {
        week[column] = Some(day);
        column += 1;
        if column == 7 {
            weeks.push(week);
            week = [None; 7];
            column = 0;
        }
    }
    if column > 0 {
        weeks.push(week);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentInput, Priority, RequestInput, TeamInput};
    use crate::repository::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_february_2024_grid() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(last, date(2024, 2, 29));

        let weeks = month_grid(first, last.day());
        assert_eq!(weeks.len(), 5);
        // 1 Feb 2024 is a Thursday
        assert_eq!(weeks[0], [None, None, None, None, Some(1), Some(2), Some(3)]);
        assert_eq!(weeks[4], [Some(25), Some(26), Some(27), Some(28), Some(29), None, None]);
    }

    #[test]
    fn test_grid_cells_cover_each_day_once() {
        for (year, month) in [(2023, 2), (2024, 9), (2025, 6), (2026, 3)] {
            let (first, last) = month_bounds(year, month).unwrap();
            let weeks = month_grid(first, last.day());
            let days: Vec<u32> = weeks.iter().flatten().flatten().copied().collect();
            assert_eq!(days, (1..=last.day()).collect::<Vec<_>>());
            assert!(weeks.len() >= 4 && weeks.len() <= 6);
        }
    }

    #[test]
    fn test_month_wrap_around() {
        assert_eq!(previous_month(2024, 1).unwrap(), (12, 2023));
        assert_eq!(next_month(2024, 12).unwrap(), (1, 2025));
        assert_eq!(previous_month(2024, 7).unwrap(), (6, 2024));
        assert_eq!(next_month(2024, 7).unwrap(), (8, 2024));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(matches!(month_bounds(2024, 0), Err(AppError::InvalidDate(_))));
        assert!(matches!(month_bounds(2024, 13), Err(AppError::InvalidDate(_))));
        assert!(matches!(next_month(i32::MAX, 12), Err(AppError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_build_month_buckets_preventive_requests() {
        let store = Arc::new(MemoryStore::new());
        let team = store.insert_team(&TeamInput { name: "Mechanics".to_string() }).await.unwrap();
        let equipment = store
            .insert_equipment(&EquipmentInput {
                name: "Press".to_string(),
                serial_number: "PR-7".to_string(),
                department: None,
                assigned_employee: None,
                purchase_date: None,
                warranty_expiry: None,
                location: "Hall A".to_string(),
                team_id: team.id,
                default_technician_id: None,
            })
            .await
            .unwrap();

        let schedule = |subject: &str, kind: RequestType, day: Option<NaiveDate>| RequestInput {
            subject: subject.to_string(),
            request_type: kind,
            equipment_id: equipment.id,
            team_id: team.id,
            technician_id: None,
            scheduled_date: day,
            duration_hours: None,
            priority: Priority::Medium,
        };
        for input in [
            schedule("Oil change", RequestType::Preventive, Some(date(2024, 2, 10))),
            schedule("Filter swap", RequestType::Preventive, Some(date(2024, 2, 10))),
            schedule("Belt check", RequestType::Preventive, Some(date(2024, 2, 29))),
            schedule("Broken guard", RequestType::Corrective, Some(date(2024, 2, 10))),
            schedule("Next month", RequestType::Preventive, Some(date(2024, 3, 1))),
            schedule("Unscheduled", RequestType::Preventive, None),
        ] {
            store.insert_request(&input).await.unwrap();
        }

        let view = CalendarService::new(store).build_month(2024, 2).await.unwrap();

        assert_eq!(view.month_name, "February");
        assert_eq!((view.prev_month, view.prev_year), (1, 2024));
        assert_eq!((view.next_month, view.next_year), (3, 2024));
        assert_eq!(view.requests_by_day.keys().copied().collect::<Vec<_>>(), vec![10, 29]);
        let tenth: Vec<&str> = view.requests_by_day[&10]
            .iter()
            .map(|r| r.request.subject.as_str())
            .collect();
        assert_eq!(tenth, vec!["Oil change", "Filter swap"]);
    }
}
