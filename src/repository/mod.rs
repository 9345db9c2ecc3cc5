//! Entity store contract and its implementations
//!
//! `Repository` persists to PostgreSQL through sqlx; `MemoryStore` keeps
//! everything in process and enforces the same constraints.

pub mod equipment;
pub mod memory;
pub mod requests;
pub mod teams;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        Equipment, EquipmentInput, EquipmentQuery, MaintenanceRequest, MaintenanceTeam,
        RequestFilter, RequestInput, RequestStatus, StatusChange, TeamInput, Technician,
        TechnicianInput,
    },
};

pub use memory::MemoryStore;

/// Everything the services need from persistence.
///
/// `update_*` and `delete_*` return `NotFound` for a missing id. Unique and
/// reference violations surface as `Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> AppResult<()>;

    // ---- Teams ----
    async fn list_teams(&self) -> AppResult<Vec<MaintenanceTeam>>;
    async fn find_team(&self, id: i32) -> AppResult<Option<MaintenanceTeam>>;
    async fn insert_team(&self, data: &TeamInput) -> AppResult<MaintenanceTeam>;
    async fn update_team(&self, id: i32, data: &TeamInput) -> AppResult<MaintenanceTeam>;
    /// Removes the team together with its technicians
    async fn delete_team(&self, id: i32) -> AppResult<()>;

    // ---- Technicians ----
    async fn list_technicians(&self, team_id: i32) -> AppResult<Vec<Technician>>;
    async fn find_technician(&self, id: i32) -> AppResult<Option<Technician>>;
    async fn insert_technician(&self, team_id: i32, data: &TechnicianInput) -> AppResult<Technician>;
    /// Removes the technician and clears it from equipment and requests
    async fn delete_technician(&self, id: i32) -> AppResult<()>;

    // ---- Equipment ----
    async fn list_equipment(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>>;
    async fn find_equipment(&self, id: i32) -> AppResult<Option<Equipment>>;
    async fn insert_equipment(&self, data: &EquipmentInput) -> AppResult<Equipment>;
    async fn update_equipment(&self, id: i32, data: &EquipmentInput) -> AppResult<Equipment>;
    async fn delete_equipment(&self, id: i32) -> AppResult<()>;
    /// Registry size as (total, scrapped)
    async fn count_equipment(&self) -> AppResult<(i64, i64)>;
    async fn count_team_equipment(&self, team_id: i32) -> AppResult<i64>;

    // ---- Requests ----
    async fn find_request(&self, id: i32) -> AppResult<Option<MaintenanceRequest>>;
    /// Matching requests ordered by id
    async fn query_requests(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>>;
    async fn count_requests(&self, filter: &RequestFilter) -> AppResult<i64>;
    /// Statuses without requests may be absent
    async fn count_requests_by_status(&self) -> AppResult<Vec<(RequestStatus, i64)>>;
    /// Open requests scheduled before `today`, ordered by scheduled date then id
    async fn overdue_requests(&self, today: NaiveDate) -> AppResult<Vec<MaintenanceRequest>>;
    /// Inserts in status `New`
    async fn insert_request(&self, data: &RequestInput) -> AppResult<MaintenanceRequest>;
    async fn update_request(&self, id: i32, data: &RequestInput) -> AppResult<MaintenanceRequest>;
    async fn delete_request(&self, id: i32) -> AppResult<()>;
    /// Applies the status and the optional scrap flag atomically. A missing
    /// request is `NotFound`, a missing equipment `InconsistentState`; in
    /// both cases nothing is written.
    async fn commit_status_change(&self, change: &StatusChange) -> AppResult<MaintenanceRequest>;
}

/// PostgreSQL-backed entity store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map unique and foreign key violations to `Conflict`
pub(crate) fn constraint_error(err: sqlx::Error, what: &str) -> AppError {
    if let Some(db) = err.as_database_error() {
        match db.code().as_deref() {
            Some("23505") => return AppError::Conflict(format!("{} already exists", what)),
            Some("23503") => {
                return AppError::Conflict(format!(
                    "{} conflicts with related records: {}",
                    what,
                    db.message()
                ))
            }
            _ => {}
        }
    }
    AppError::Store(err)
}

#[async_trait]
impl EntityStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_teams(&self) -> AppResult<Vec<MaintenanceTeam>> {
        self.teams_list().await
    }

    async fn find_team(&self, id: i32) -> AppResult<Option<MaintenanceTeam>> {
        self.teams_find(id).await
    }

    async fn insert_team(&self, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        self.teams_create(data).await
    }

    async fn update_team(&self, id: i32, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        self.teams_rename(id, data).await
    }

    async fn delete_team(&self, id: i32) -> AppResult<()> {
        self.teams_delete(id).await
    }

    async fn list_technicians(&self, team_id: i32) -> AppResult<Vec<Technician>> {
        self.technicians_list(team_id).await
    }

    async fn find_technician(&self, id: i32) -> AppResult<Option<Technician>> {
        self.technicians_find(id).await
    }

    async fn insert_technician(&self, team_id: i32, data: &TechnicianInput) -> AppResult<Technician> {
        self.technicians_create(team_id, data).await
    }

    async fn delete_technician(&self, id: i32) -> AppResult<()> {
        self.technicians_delete(id).await
    }

    async fn list_equipment(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        self.equipment_list(query).await
    }

    async fn find_equipment(&self, id: i32) -> AppResult<Option<Equipment>> {
        self.equipment_find(id).await
    }

    async fn insert_equipment(&self, data: &EquipmentInput) -> AppResult<Equipment> {
        self.equipment_create(data).await
    }

    async fn update_equipment(&self, id: i32, data: &EquipmentInput) -> AppResult<Equipment> {
        self.equipment_update(id, data).await
    }

    async fn delete_equipment(&self, id: i32) -> AppResult<()> {
        self.equipment_delete(id).await
    }

    async fn count_equipment(&self) -> AppResult<(i64, i64)> {
        self.equipment_count().await
    }

    async fn count_team_equipment(&self, team_id: i32) -> AppResult<i64> {
        self.equipment_count_for_team(team_id).await
    }

    async fn find_request(&self, id: i32) -> AppResult<Option<MaintenanceRequest>> {
        self.requests_find(id).await
    }

    async fn query_requests(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        self.requests_query(filter).await
    }

    async fn count_requests(&self, filter: &RequestFilter) -> AppResult<i64> {
        self.requests_count(filter).await
    }

    async fn count_requests_by_status(&self) -> AppResult<Vec<(RequestStatus, i64)>> {
        self.requests_count_by_status().await
    }

    async fn overdue_requests(&self, today: NaiveDate) -> AppResult<Vec<MaintenanceRequest>> {
        self.requests_overdue(today).await
    }

    async fn insert_request(&self, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        self.requests_create(data).await
    }

    async fn update_request(&self, id: i32, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        self.requests_update(id, data).await
    }

    async fn delete_request(&self, id: i32) -> AppResult<()> {
        self.requests_delete(id).await
    }

    async fn commit_status_change(&self, change: &StatusChange) -> AppResult<MaintenanceRequest> {
        self.requests_commit_status_change(change).await
    }
}
