//! Maintenance team and technician endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::team::{MaintenanceTeam, TeamDetails, TeamInput, Technician, TechnicianInput},
};

use super::{ApiJson, ApiPath, AuthenticatedUser};

/// List teams with their technicians
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Teams ordered by name", body = Vec<TeamDetails>)
    )
)]
pub async fn list_teams(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<TeamDetails>>> {
    let teams = state.services.teams.list().await?;
    Ok(Json(teams))
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamDetails),
        (status = 404, description = "Team not found")
    )
)]
pub async fn get_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<TeamDetails>> {
    let team = state.services.teams.get(id).await?;
    Ok(Json(team))
}

#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    request_body = TeamInput,
    responses(
        (status = 201, description = "Team created", body = MaintenanceTeam),
        (status = 409, description = "Team name already taken")
    )
)]
pub async fn create_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(data): ApiJson<TeamInput>,
) -> AppResult<(StatusCode, Json<MaintenanceTeam>)> {
    claims.require_admin()?;
    let team = state.services.teams.create(&data).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    put,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    request_body = TeamInput,
    responses(
        (status = 200, description = "Team renamed", body = MaintenanceTeam)
    )
)]
pub async fn rename_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<TeamInput>,
) -> AppResult<Json<MaintenanceTeam>> {
    claims.require_admin()?;
    let team = state.services.teams.rename(id, &data).await?;
    Ok(Json(team))
}

/// Delete a team and its technicians
#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 409, description = "Team still owns equipment or requests")
    )
)]
pub async fn delete_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.teams.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/teams/{id}/technicians",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team members", body = Vec<Technician>)
    )
)]
pub async fn list_technicians(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Vec<Technician>>> {
    let technicians = state.services.teams.technicians(id).await?;
    Ok(Json(technicians))
}

#[utoipa::path(
    post,
    path = "/teams/{id}/technicians",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    request_body = TechnicianInput,
    responses(
        (status = 201, description = "Technician added", body = Technician)
    )
)]
pub async fn add_technician(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<TechnicianInput>,
) -> AppResult<(StatusCode, Json<Technician>)> {
    claims.require_admin()?;
    let technician = state.services.teams.add_technician(id, &data).await?;
    Ok((StatusCode::CREATED, Json(technician)))
}

/// Remove a technician; their assignments are cleared
#[utoipa::path(
    delete,
    path = "/technicians/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Technician ID")),
    responses(
        (status = 204, description = "Technician removed")
    )
)]
pub async fn remove_technician(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.teams.remove_technician(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
