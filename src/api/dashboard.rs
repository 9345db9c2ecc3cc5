//! Dashboard endpoint

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::RequestDetails};

use super::AuthenticatedUser;

/// Dashboard response
#[derive(Serialize, ToSchema)]
pub struct DashboardStats {
    pub equipment: EquipmentCounts,
    pub requests: RequestCounts,
    /// Open requests scheduled before today, earliest first
    pub overdue_requests: Vec<RequestDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct EquipmentCounts {
    pub total: i64,
    /// Not scrapped
    pub active: i64,
    pub scrapped: i64,
}

#[derive(Serialize, ToSchema)]
pub struct RequestCounts {
    pub total: i64,
    pub new: i64,
    pub in_progress: i64,
    pub repaired: i64,
    pub scrap: i64,
}

/// Registry and workload summary
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "views",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.dashboard.stats(Utc::now().date_naive()).await?;
    Ok(Json(stats))
}
