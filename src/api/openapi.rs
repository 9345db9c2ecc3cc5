//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{board, calendar, dashboard, equipment, health, requests, teams};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GearGuard API",
        version = "1.0.0",
        description = "Maintenance tracker REST API: equipment registry, maintenance teams and the request workflow"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::update_request,
        requests::delete_request,
        requests::update_status,
        // Views
        calendar::get_calendar,
        board::get_board,
        dashboard::get_dashboard,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::get_equipment_defaults,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Teams
        teams::list_teams,
        teams::get_team,
        teams::create_team,
        teams::rename_team,
        teams::delete_team,
        teams::list_technicians,
        teams::add_technician,
        teams::remove_technician,
    ),
    components(
        schemas(
            // Requests
            crate::models::MaintenanceRequest,
            crate::models::RequestDetails,
            crate::models::RequestInput,
            crate::models::RequestFilter,
            crate::models::RequestStatus,
            crate::models::RequestType,
            crate::models::Priority,
            requests::StatusUpdateRequest,
            requests::StatusUpdateResponse,
            requests::StatusUpdateFailure,
            // Views
            crate::models::CalendarView,
            crate::models::Board,
            dashboard::DashboardStats,
            dashboard::EquipmentCounts,
            dashboard::RequestCounts,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentDetails,
            crate::models::equipment::EquipmentDefaults,
            crate::models::equipment::EquipmentInput,
            crate::models::equipment::EquipmentList,
            // Teams
            crate::models::team::MaintenanceTeam,
            crate::models::team::TeamDetails,
            crate::models::team::TeamInput,
            crate::models::team::Technician,
            crate::models::team::TechnicianInput,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "requests", description = "Maintenance request lifecycle"),
        (name = "views", description = "Calendar, kanban board and dashboard"),
        (name = "equipment", description = "Equipment registry"),
        (name = "teams", description = "Maintenance teams and technicians")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by secured paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_workflow_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/requests/status", "/calendar", "/board", "/equipment/{id}/defaults"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
