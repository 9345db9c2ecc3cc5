//! Maintenance request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::{RequestDetails, RequestFilter, RequestInput, RequestStatus, UserClaims},
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser};

/// Status change request body
#[derive(Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub request_id: i32,
    /// One of "New", "In Progress", "Repaired", "Scrap"
    pub status: String,
}

/// Status change result
#[derive(Serialize, ToSchema)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub message: String,
    pub request: RequestDetails,
}

/// Status change failure: the usual error body plus `success: false`
#[derive(Serialize, ToSchema)]
pub struct StatusUpdateFailure {
    pub success: bool,
    #[serde(flatten)]
    pub error: ErrorResponse,
}

/// List requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestFilter),
    responses(
        (status = 200, description = "Matching requests ordered by id", body = Vec<RequestDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(filter): ApiQuery<RequestFilter>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let today = Utc::now().date_naive();
    let requests = state.services.requests.list(&filter).await?;
    Ok(Json(
        requests
            .into_iter()
            .map(|r| RequestDetails::new(r, today))
            .collect(),
    ))
}

/// Get request by ID
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = RequestDetails),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<RequestDetails>> {
    let request = state.services.requests.get(id).await?;
    Ok(Json(RequestDetails::new(request, Utc::now().date_naive())))
}

/// Create a request (starts in status New)
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = RequestInput,
    responses(
        (status = 201, description = "Request created", body = RequestDetails),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Equipment, team or technician not found"),
        (status = 422, description = "Equipment is scrapped")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(data): ApiJson<RequestInput>,
) -> AppResult<(StatusCode, Json<RequestDetails>)> {
    let request = state.services.requests.create(&claims, &data).await?;
    Ok((
        StatusCode::CREATED,
        Json(RequestDetails::new(request, Utc::now().date_naive())),
    ))
}

/// Edit a request; status is unchanged
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = RequestInput,
    responses(
        (status = 200, description = "Request updated", body = RequestDetails),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Target equipment is scrapped")
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<RequestInput>,
) -> AppResult<Json<RequestDetails>> {
    let request = state.services.requests.update(&claims, id, &data).await?;
    Ok(Json(RequestDetails::new(request, Utc::now().date_naive())))
}

/// Delete a request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.requests.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a request to a new status. Scrap also scraps the equipment.
#[utoipa::path(
    post,
    path = "/requests/status",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusUpdateResponse),
        (status = 400, description = "Unknown status value or malformed body", body = StatusUpdateFailure),
        (status = 401, description = "Not authenticated", body = StatusUpdateFailure),
        (status = 404, description = "Request not found", body = StatusUpdateFailure),
        (status = 409, description = "Request references missing equipment", body = StatusUpdateFailure)
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: Result<AuthenticatedUser, AppError>,
    body: Result<ApiJson<StatusUpdateRequest>, AppError>,
) -> Response {
    let result = match (user, body) {
        (Ok(AuthenticatedUser(claims)), Ok(ApiJson(body))) => change_status(&state, &claims, body).await,
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let (status, error) = e.to_error_response();
            (status, Json(StatusUpdateFailure { success: false, error })).into_response()
        }
    }
}

async fn change_status(
    state: &AppState,
    claims: &UserClaims,
    body: StatusUpdateRequest,
) -> AppResult<StatusUpdateResponse> {
    let status: RequestStatus = body.status.parse()?;
    let request = state
        .services
        .requests
        .update_status(claims, body.request_id, status)
        .await?;

    let message = if status == RequestStatus::Scrap {
        format!("Status changed to {}; equipment marked as scrapped", status)
    } else {
        format!("Status changed to {}", status)
    };

    Ok(StatusUpdateResponse {
        success: true,
        message,
        request: RequestDetails::new(request, Utc::now().date_naive()),
    })
}
