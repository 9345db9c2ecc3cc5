//! Equipment API endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::equipment::{
        Equipment, EquipmentDefaults, EquipmentDetails, EquipmentInput, EquipmentList, EquipmentQuery,
    },
};

use super::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser};

/// List equipment with filters
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list with facets", body = EquipmentList)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<EquipmentQuery>,
) -> AppResult<Json<EquipmentList>> {
    let equipment = state.services.equipment.list(query).await?;
    Ok(Json(equipment))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = EquipmentDetails),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<EquipmentDetails>> {
    let equipment = state.services.equipment.get_details(id).await?;
    Ok(Json(equipment))
}

/// Team and technician a new request on this equipment defaults to
#[utoipa::path(
    get,
    path = "/equipment/{id}/defaults",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Request defaults", body = EquipmentDefaults),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment_defaults(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<EquipmentDefaults>> {
    let defaults = state.services.equipment.defaults(id).await?;
    Ok(Json(defaults))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = EquipmentInput,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 409, description = "Serial number already registered")
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(data): ApiJson<EquipmentInput>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    claims.require_admin()?;
    let equipment = state.services.equipment.create(&data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = EquipmentInput,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<EquipmentInput>,
) -> AppResult<Json<Equipment>> {
    claims.require_admin()?;
    let equipment = state.services.equipment.update(id, &data).await?;
    Ok(Json(equipment))
}

/// Delete equipment without maintenance history
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 409, description = "Equipment has maintenance requests")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
