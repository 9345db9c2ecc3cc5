//! Maintenance teams and their technicians

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        team::TeamDetails, MaintenanceTeam, RequestFilter, TeamInput, Technician,
        TechnicianInput,
    },
    repository::EntityStore,
};

#[derive(Clone)]
pub struct TeamsService {
    store: Arc<dyn EntityStore>,
}

impl TeamsService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<TeamDetails>> {
        let teams = self.store.list_teams().await?;
        let mut details = Vec::with_capacity(teams.len());
        for team in teams {
            let technicians = self.store.list_technicians(team.id).await?;
            details.push(TeamDetails { team, technicians });
        }
        Ok(details)
    }

    pub async fn get(&self, id: i32) -> AppResult<TeamDetails> {
        let team = self.find(id).await?;
        let technicians = self.store.list_technicians(id).await?;
        Ok(TeamDetails { team, technicians })
    }

    pub async fn create(&self, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        data.validate()?;
        let team = self.store.insert_team(data).await?;
        tracing::info!("Team {} '{}' created", team.id, team.name);
        Ok(team)
    }

    pub async fn rename(&self, id: i32, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        data.validate()?;
        self.store.update_team(id, data).await
    }

    /// Delete a team and its technicians. Teams still owning equipment or
    /// requests are kept.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.find(id).await?;

        let equipment = self.store.count_team_equipment(id).await?;
        if equipment > 0 {
            return Err(AppError::Conflict(format!(
                "Team {} still owns {} equipment record(s)",
                id, equipment
            )));
        }

        let filter = RequestFilter {
            team_id: Some(id),
            ..Default::default()
        };
        let requests = self.store.count_requests(&filter).await?;
        if requests > 0 {
            return Err(AppError::Conflict(format!(
                "Team {} is assigned to {} request(s)",
                id, requests
            )));
        }

        self.store.delete_team(id).await?;
        tracing::info!("Team {} deleted", id);
        Ok(())
    }

    pub async fn technicians(&self, team_id: i32) -> AppResult<Vec<Technician>> {
        self.find(team_id).await?;
        self.store.list_technicians(team_id).await
    }

    pub async fn add_technician(&self, team_id: i32, data: &TechnicianInput) -> AppResult<Technician> {
        data.validate()?;
        self.find(team_id).await?;
        let technician = self.store.insert_technician(team_id, data).await?;
        tracing::info!("Technician {} added to team {}", technician.id, team_id);
        Ok(technician)
    }

    /// Clears the technician from equipment defaults and request assignments
    pub async fn remove_technician(&self, id: i32) -> AppResult<()> {
        self.store.delete_technician(id).await?;
        tracing::info!("Technician {} removed", id);
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<MaintenanceTeam> {
        self.store
            .find_team(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EquipmentInput;
    use crate::repository::MemoryStore;

    fn service() -> (TeamsService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (TeamsService::new(store.clone()), store)
    }

    fn team(name: &str) -> TeamInput {
        TeamInput { name: name.to_string() }
    }

    #[tokio::test]
    async fn test_team_with_technicians() {
        let (service, _) = service();
        let created = service.create(&team("Electrical")).await.unwrap();
        service
            .add_technician(created.id, &TechnicianInput { name: "Eve".to_string() })
            .await
            .unwrap();

        let details = service.get(created.id).await.unwrap();
        assert_eq!(details.team.name, "Electrical");
        assert_eq!(details.technicians.len(), 1);

        let renamed = service.rename(created.id, &team("Electrical & Controls")).await.unwrap();
        assert_eq!(renamed.name, "Electrical & Controls");
    }

    #[tokio::test]
    async fn test_duplicate_and_blank_names() {
        let (service, _) = service();
        service.create(&team("Plumbing")).await.unwrap();
        assert!(matches!(service.create(&team("Plumbing")).await, Err(AppError::Conflict(_))));
        assert!(matches!(service.create(&team("")).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_refused_while_owning_equipment() {
        let (service, store) = service();
        let owner = service.create(&team("HVAC")).await.unwrap();
        store
            .insert_equipment(&EquipmentInput {
                name: "Air handler".to_string(),
                serial_number: "AH-3".to_string(),
                department: None,
                assigned_employee: None,
                purchase_date: None,
                warranty_expiry: None,
                location: "Roof".to_string(),
                team_id: owner.id,
                default_technician_id: None,
            })
            .await
            .unwrap();

        assert!(matches!(service.delete(owner.id).await, Err(AppError::Conflict(_))));
        assert!(service.get(owner.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_removes_technicians() {
        let (service, store) = service();
        let doomed = service.create(&team("Night shift")).await.unwrap();
        let tech = service
            .add_technician(doomed.id, &TechnicianInput { name: "Max".to_string() })
            .await
            .unwrap();

        service.delete(doomed.id).await.unwrap();

        assert!(store.find_technician(tech.id).await.unwrap().is_none());
        assert!(matches!(service.technicians(doomed.id).await, Err(AppError::NotFound(_))));
    }
}
