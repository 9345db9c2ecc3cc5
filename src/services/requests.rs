//! Maintenance request lifecycle service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        Equipment, MaintenanceRequest, RequestFilter, RequestInput, RequestStatus, StatusChange,
        UserClaims,
    },
    repository::EntityStore,
};

#[derive(Clone)]
pub struct RequestsService {
    store: Arc<dyn EntityStore>,
}

impl RequestsService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i32) -> AppResult<MaintenanceRequest> {
        self.store
            .find_request(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    pub async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        self.store.query_requests(filter).await
    }

    /// Create a request in status `New`. Scrapped equipment is refused
    /// before anything is written.
    pub async fn create(&self, actor: &UserClaims, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        data.validate()?;

        let equipment = self.equipment(data.equipment_id).await?;
        if equipment.is_scrapped {
            return Err(AppError::InvalidOperation(format!(
                "Cannot create request for scrapped equipment '{}'",
                equipment.name
            )));
        }
        self.check_assignment(data).await?;

        let request = self.store.insert_request(data).await?;
        tracing::info!(
            "User {} created request {} on equipment {}",
            actor.user_id, request.id, request.equipment_id
        );
        Ok(request)
    }

    /// Edit request fields. Status is not editable here.
    pub async fn update(&self, actor: &UserClaims, id: i32, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        data.validate()?;

        let existing = self.get(id).await?;
        let equipment = self.equipment(data.equipment_id).await?;
        if equipment.id != existing.equipment_id && equipment.is_scrapped {
            return Err(AppError::InvalidOperation(format!(
                "Cannot move request to scrapped equipment '{}'",
                equipment.name
            )));
        }
        self.check_assignment(data).await?;

        let request = self.store.update_request(id, data).await?;
        tracing::info!("User {} edited request {}", actor.user_id, id);
        Ok(request)
    }

    pub async fn delete(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        self.store.delete_request(id).await?;
        tracing::info!("User {} deleted request {}", actor.user_id, id);
        Ok(())
    }

    /// Move a request to `status`. Moving to Scrap also marks the request's
    /// equipment as scrapped, in the same transaction.
    pub async fn update_status(
        &self,
        actor: &UserClaims,
        id: i32,
        status: RequestStatus,
    ) -> AppResult<MaintenanceRequest> {
        let request = self.get(id).await?;
        let scrap = status == RequestStatus::Scrap;

        let updated = self
            .store
            .commit_status_change(&StatusChange {
                request_id: id,
                status,
                scrap,
            })
            .await?;

        tracing::info!(
            "User {} moved request {} from '{}' to '{}'",
            actor.user_id, id, request.status, updated.status
        );
        if scrap {
            tracing::info!("Equipment {} scrapped by request {}", updated.equipment_id, id);
        }

        Ok(updated)
    }

    async fn equipment(&self, id: i32) -> AppResult<Equipment> {
        self.store
            .find_equipment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Team must exist; an assigned technician must exist and be a member
    async fn check_assignment(&self, data: &RequestInput) -> AppResult<()> {
        self.store
            .find_team(data.team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", data.team_id)))?;

        if let Some(technician_id) = data.technician_id {
            let technician = self
                .store
                .find_technician(technician_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Technician {} not found", technician_id)))?;
            if technician.team_id != data.team_id {
                return Err(AppError::Validation(format!(
                    "Technician {} is not a member of team {}",
                    technician_id, data.team_id
                )));
            }
        }
        Ok(())
    }
}
