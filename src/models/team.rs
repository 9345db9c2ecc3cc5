//! Maintenance team and technician models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A maintenance team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceTeam {
    pub id: i32,
    /// Team name (unique)
    pub name: String,
}

/// Team with its technicians
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamDetails {
    #[serde(flatten)]
    pub team: MaintenanceTeam,
    pub technicians: Vec<Technician>,
}

/// Create or rename team request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TeamInput {
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub name: String,
}

/// A technician, member of exactly one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Technician {
    pub id: i32,
    pub name: String,
    pub team_id: i32,
}

/// Add technician request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TechnicianInput {
    #[validate(length(min = 1, max = 100, message = "Technician name must be 1-100 characters"))]
    pub name: String,
}
