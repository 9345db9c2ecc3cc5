//! Equipment registry service

use std::{collections::BTreeSet, sync::Arc};

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentDefaults, EquipmentDetails, EquipmentList},
        Equipment, EquipmentInput, EquipmentQuery, RequestFilter,
    },
    repository::EntityStore,
};

#[derive(Clone)]
pub struct EquipmentService {
    store: Arc<dyn EntityStore>,
}

impl EquipmentService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Filtered equipment with department and employee facets taken from
    /// the whole registry
    pub async fn list(&self, query: EquipmentQuery) -> AppResult<EquipmentList> {
        let query = query.normalized();
        let items = self.store.list_equipment(&query).await?;

        let all = self.store.list_equipment(&EquipmentQuery::default()).await?;
        let departments: BTreeSet<String> = all.iter().filter_map(|e| e.department.clone()).collect();
        let employees: BTreeSet<String> = all.iter().filter_map(|e| e.assigned_employee.clone()).collect();

        Ok(EquipmentList {
            items,
            departments: departments.into_iter().collect(),
            employees: employees.into_iter().collect(),
        })
    }

    pub async fn get(&self, id: i32) -> AppResult<Equipment> {
        self.store
            .find_equipment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub async fn get_details(&self, id: i32) -> AppResult<EquipmentDetails> {
        let equipment = self.get(id).await?;
        let filter = RequestFilter {
            equipment_id: Some(id),
            open: Some(true),
            ..Default::default()
        };
        let open_requests = self.store.count_requests(&filter).await?;
        Ok(EquipmentDetails { equipment, open_requests })
    }

    /// Team and technician a new request on this equipment starts with
    pub async fn defaults(&self, id: i32) -> AppResult<EquipmentDefaults> {
        let equipment = self.get(id).await?;
        Ok(EquipmentDefaults {
            team_id: equipment.team_id,
            default_technician_id: equipment.default_technician_id,
            is_scrapped: equipment.is_scrapped,
        })
    }

    pub async fn create(&self, data: &EquipmentInput) -> AppResult<Equipment> {
        data.validate()?;
        self.check_assignment(data).await?;

        let equipment = self.store.insert_equipment(data).await?;
        tracing::info!("Equipment {} ({}) registered", equipment.id, equipment.serial_number);
        Ok(equipment)
    }

    pub async fn update(&self, id: i32, data: &EquipmentInput) -> AppResult<Equipment> {
        data.validate()?;
        self.get(id).await?;
        self.check_assignment(data).await?;
        self.store.update_equipment(id, data).await
    }

    /// Equipment with maintenance history cannot be removed
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get(id).await?;
        let filter = RequestFilter {
            equipment_id: Some(id),
            ..Default::default()
        };
        let history = self.store.count_requests(&filter).await?;
        if history > 0 {
            return Err(AppError::Conflict(format!(
                "Equipment {} has {} maintenance request(s)",
                id, history
            )));
        }
        self.store.delete_equipment(id).await?;
        tracing::info!("Equipment {} deleted", id);
        Ok(())
    }

    async fn check_assignment(&self, data: &EquipmentInput) -> AppResult<()> {
        self.store
            .find_team(data.team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", data.team_id)))?;

        if let Some(technician_id) = data.default_technician_id {
            let technician = self
                .store
                .find_technician(technician_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Technician {} not found", technician_id)))?;
            if technician.team_id != data.team_id {
                return Err(AppError::Validation(format!(
                    "Default technician {} is not a member of team {}",
                    technician_id, data.team_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, RequestInput, RequestType, TeamInput, TechnicianInput};
    use crate::repository::MemoryStore;

    fn input(name: &str, serial: &str, department: &str, employee: Option<&str>, team_id: i32) -> EquipmentInput {
        EquipmentInput {
            name: name.to_string(),
            serial_number: serial.to_string(),
            department: Some(department.to_string()),
            assigned_employee: employee.map(str::to_string),
            purchase_date: None,
            warranty_expiry: None,
            location: "Plant 1".to_string(),
            team_id,
            default_technician_id: None,
        }
    }

    async fn service_with_team() -> (EquipmentService, Arc<MemoryStore>, i32) {
        let store = Arc::new(MemoryStore::new());
        let team = store.insert_team(&TeamInput { name: "IT".to_string() }).await.unwrap();
        (EquipmentService::new(store.clone()), store, team.id)
    }

    #[tokio::test]
    async fn test_list_filters_and_facets() {
        let (service, _, team) = service_with_team().await;
        service.create(&input("Laptop", "LP-100", "Admin", Some("Ana"), team)).await.unwrap();
        service.create(&input("Printer", "PR-200", "Admin", None, team)).await.unwrap();
        service.create(&input("Lathe", "LT-300", "Production", Some("Ben"), team)).await.unwrap();

        let query = EquipmentQuery {
            department: Some("Admin".to_string()),
            employee: Some(String::new()),
            search: Some("pr-".to_string()),
        };
        let list = service.list(query).await.unwrap();

        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].serial_number, "PR-200");
        assert_eq!(list.departments, vec!["Admin", "Production"]);
        assert_eq!(list.employees, vec!["Ana", "Ben"]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let (service, _, team) = service_with_team().await;
        service.create(&input("Drill", "DR_01", "Workshop", None, team)).await.unwrap();
        service.create(&input("Saw", "SW-02", "Workshop", None, team)).await.unwrap();

        let search = |term: &str| EquipmentQuery {
            search: Some(term.to_string()),
            ..Default::default()
        };
        let list = service.list(search("_")).await.unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].serial_number, "DR_01");

        assert!(service.list(search("%")).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_default_technician_must_be_team_member() {
        let (service, store, team) = service_with_team().await;
        let other = store.insert_team(&TeamInput { name: "Fleet".to_string() }).await.unwrap();
        let driver = store
            .insert_technician(other.id, &TechnicianInput { name: "Dee".to_string() })
            .await
            .unwrap();

        let mut data = input("Forklift", "FL-1", "Logistics", None, team);
        data.default_technician_id = Some(driver.id);
        assert!(matches!(service.create(&data).await, Err(AppError::Validation(_))));

        data.team_id = other.id;
        let created = service.create(&data).await.unwrap();
        let defaults = service.defaults(created.id).await.unwrap();
        assert_eq!(defaults.team_id, other.id);
        assert_eq!(defaults.default_technician_id, Some(driver.id));
        assert!(!defaults.is_scrapped);
    }

    #[tokio::test]
    async fn test_delete_refused_with_history() {
        let (service, store, team) = service_with_team().await;
        let equipment = service.create(&input("Server", "SV-9", "IT", None, team)).await.unwrap();
        store
            .insert_request(&RequestInput {
                subject: "Disk failure".to_string(),
                request_type: RequestType::Corrective,
                equipment_id: equipment.id,
                team_id: team,
                technician_id: None,
                scheduled_date: None,
                duration_hours: None,
                priority: Priority::High,
            })
            .await
            .unwrap();

        let details = service.get_details(equipment.id).await.unwrap();
        assert_eq!(details.open_requests, 1);

        assert!(matches!(service.delete(equipment.id).await, Err(AppError::Conflict(_))));
        assert!(service.get(equipment.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_equipment_is_not_found() {
        let (service, _, _) = service_with_team().await;
        assert!(matches!(service.defaults(42).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(42).await, Err(AppError::NotFound(_))));
    }
}
