//! Preventive maintenance calendar endpoint

use std::str::FromStr;

use axum::{extract::State, Json};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::CalendarView,
};

use super::{ApiQuery, AuthenticatedUser};

/// Month to display; each part defaults to the current UTC date
#[derive(Debug, Deserialize, IntoParams)]
pub struct CalendarQuery {
    #[param(value_type = Option<i32>)]
    pub year: Option<String>,
    /// 1-12
    #[param(value_type = Option<u32>)]
    pub month: Option<String>,
}

/// Parse one date part; anything non-numeric is an invalid date, not a bad request
fn date_part<T: FromStr>(name: &str, raw: Option<&str>, default: T) -> AppResult<T> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::InvalidDate(format!("Invalid {}: {}", name, value))),
    }
}

/// Month grid with scheduled preventive requests
#[utoipa::path(
    get,
    path = "/calendar",
    tag = "views",
    security(("bearer_auth" = [])),
    params(CalendarQuery),
    responses(
        (status = 200, description = "Month view", body = CalendarView),
        (status = 400, description = "Invalid year or month", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_calendar(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<CalendarQuery>,
) -> AppResult<Json<CalendarView>> {
    let today = Utc::now().date_naive();
    let year = date_part("year", query.year.as_deref(), today.year())?;
    let month = date_part("month", query.month.as_deref(), today.month())?;

    let view = state.services.calendar.build_month(year, month).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_part_parsing() {
        assert_eq!(date_part("month", None, 6u32).unwrap(), 6);
        assert_eq!(date_part("month", Some(" 2 "), 6u32).unwrap(), 2);
        assert_eq!(date_part("year", Some("-44"), 2024i32).unwrap(), -44);

        for raw in ["-1", "abc", "2.5"] {
            assert!(matches!(
                date_part("month", Some(raw), 6u32),
                Err(AppError::InvalidDate(_))
            ));
        }
    }
}
