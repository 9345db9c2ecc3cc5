//! In-process entity store
//!
//! Mirrors the PostgreSQL schema constraints (unique names and serials,
//! RESTRICT / CASCADE / SET NULL references) so the services behave the
//! same against either backend. Every operation runs under one lock,
//! which makes multi-entity writes atomic.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::EntityStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        Equipment, EquipmentInput, EquipmentQuery, MaintenanceRequest, MaintenanceTeam,
        RequestFilter, RequestInput, RequestStatus, StatusChange, TeamInput, Technician,
        TechnicianInput,
    },
};

#[derive(Default)]
struct Tables {
    teams: BTreeMap<i32, MaintenanceTeam>,
    technicians: BTreeMap<i32, Technician>,
    equipment: BTreeMap<i32, Equipment>,
    requests: BTreeMap<i32, MaintenanceRequest>,
    last_id: i32,
    last_created: Option<DateTime<Utc>>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    /// Creation timestamps are strictly increasing so "newest first" is total
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_created {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_created = Some(now);
        now
    }

    fn check_team_exists(&self, team_id: i32) -> AppResult<()> {
        if self.teams.contains_key(&team_id) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!("Team {} does not exist", team_id)))
        }
    }

    fn check_technician_exists(&self, technician_id: Option<i32>) -> AppResult<()> {
        match technician_id {
            Some(id) if !self.technicians.contains_key(&id) => {
                Err(AppError::Conflict(format!("Technician {} does not exist", id)))
            }
            _ => Ok(()),
        }
    }

    fn check_equipment_refs(&self, data: &EquipmentInput, own_id: Option<i32>) -> AppResult<()> {
        self.check_team_exists(data.team_id)?;
        self.check_technician_exists(data.default_technician_id)?;
        let duplicate = self
            .equipment
            .values()
            .any(|e| e.serial_number == data.serial_number && Some(e.id) != own_id);
        if duplicate {
            return Err(AppError::Conflict(format!(
                "Equipment with serial '{}' already exists",
                data.serial_number
            )));
        }
        Ok(())
    }

    fn check_request_refs(&self, data: &RequestInput) -> AppResult<()> {
        if !self.equipment.contains_key(&data.equipment_id) {
            return Err(AppError::Conflict(format!(
                "Equipment {} does not exist",
                data.equipment_id
            )));
        }
        self.check_team_exists(data.team_id)?;
        self.check_technician_exists(data.technician_id)
    }

    fn check_team_name_free(&self, name: &str, own_id: Option<i32>) -> AppResult<()> {
        if self.teams.values().any(|t| t.name == name && Some(t.id) != own_id) {
            return Err(AppError::Conflict(format!("Team '{}' already exists", name)));
        }
        Ok(())
    }
}

/// Entity store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.tables().map(|_| ())
    }

    // ---- Teams ----

    async fn list_teams(&self) -> AppResult<Vec<MaintenanceTeam>> {
        let tables = self.tables()?;
        let mut teams: Vec<_> = tables.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn find_team(&self, id: i32) -> AppResult<Option<MaintenanceTeam>> {
        Ok(self.tables()?.teams.get(&id).cloned())
    }

    async fn insert_team(&self, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        let mut tables = self.tables()?;
        tables.check_team_name_free(&data.name, None)?;
        let team = MaintenanceTeam {
            id: tables.next_id(),
            name: data.name.clone(),
        };
        tables.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn update_team(&self, id: i32, data: &TeamInput) -> AppResult<MaintenanceTeam> {
        let mut tables = self.tables()?;
        if !tables.teams.contains_key(&id) {
            return Err(AppError::NotFound(format!("Team {} not found", id)));
        }
        tables.check_team_name_free(&data.name, Some(id))?;
        let team = tables
            .teams
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))?;
        team.name = data.name.clone();
        Ok(team.clone())
    }

    async fn delete_team(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables()?;
        if !tables.teams.contains_key(&id) {
            return Err(AppError::NotFound(format!("Team {} not found", id)));
        }
        let referenced = tables.equipment.values().any(|e| e.team_id == id)
            || tables.requests.values().any(|r| r.team_id == id);
        if referenced {
            return Err(AppError::Conflict(format!(
                "Team {} is still referenced by equipment or requests",
                id
            )));
        }

        let members: Vec<i32> = tables
            .technicians
            .values()
            .filter(|t| t.team_id == id)
            .map(|t| t.id)
            .collect();
        for technician_id in members {
            remove_technician(&mut tables, technician_id);
        }
        tables.teams.remove(&id);
        Ok(())
    }

    // ---- Technicians ----

    async fn list_technicians(&self, team_id: i32) -> AppResult<Vec<Technician>> {
        let tables = self.tables()?;
        let mut technicians: Vec<_> = tables
            .technicians
            .values()
            .filter(|t| t.team_id == team_id)
            .cloned()
            .collect();
        technicians.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(technicians)
    }

    async fn find_technician(&self, id: i32) -> AppResult<Option<Technician>> {
        Ok(self.tables()?.technicians.get(&id).cloned())
    }

    async fn insert_technician(&self, team_id: i32, data: &TechnicianInput) -> AppResult<Technician> {
        let mut tables = self.tables()?;
        tables.check_team_exists(team_id)?;
        let technician = Technician {
            id: tables.next_id(),
            name: data.name.clone(),
            team_id,
        };
        tables.technicians.insert(technician.id, technician.clone());
        Ok(technician)
    }

    async fn delete_technician(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables()?;
        if !remove_technician(&mut tables, id) {
            return Err(AppError::NotFound(format!("Technician {} not found", id)));
        }
        Ok(())
    }

    // ---- Equipment ----

    async fn list_equipment(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let tables = self.tables()?;
        let mut rows: Vec<_> = tables
            .equipment
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find_equipment(&self, id: i32) -> AppResult<Option<Equipment>> {
        Ok(self.tables()?.equipment.get(&id).cloned())
    }

    async fn insert_equipment(&self, data: &EquipmentInput) -> AppResult<Equipment> {
        let mut tables = self.tables()?;
        tables.check_equipment_refs(data, None)?;
        let equipment = Equipment {
            id: tables.next_id(),
            name: data.name.clone(),
            serial_number: data.serial_number.clone(),
            department: data.department.clone(),
            assigned_employee: data.assigned_employee.clone(),
            purchase_date: data.purchase_date,
            warranty_expiry: data.warranty_expiry,
            location: data.location.clone(),
            team_id: data.team_id,
            default_technician_id: data.default_technician_id,
            is_scrapped: false,
        };
        tables.equipment.insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn update_equipment(&self, id: i32, data: &EquipmentInput) -> AppResult<Equipment> {
        let mut tables = self.tables()?;
        if !tables.equipment.contains_key(&id) {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        tables.check_equipment_refs(data, Some(id))?;
        let equipment = tables
            .equipment
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;
        equipment.name = data.name.clone();
        equipment.serial_number = data.serial_number.clone();
        equipment.department = data.department.clone();
        equipment.assigned_employee = data.assigned_employee.clone();
        equipment.purchase_date = data.purchase_date;
        equipment.warranty_expiry = data.warranty_expiry;
        equipment.location = data.location.clone();
        equipment.team_id = data.team_id;
        equipment.default_technician_id = data.default_technician_id;
        Ok(equipment.clone())
    }

    async fn delete_equipment(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables()?;
        if !tables.equipment.contains_key(&id) {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        if tables.requests.values().any(|r| r.equipment_id == id) {
            return Err(AppError::Conflict(format!(
                "Equipment {} is still referenced by requests",
                id
            )));
        }
        tables.equipment.remove(&id);
        Ok(())
    }

    async fn count_equipment(&self) -> AppResult<(i64, i64)> {
        let tables = self.tables()?;
        let scrapped = tables.equipment.values().filter(|e| e.is_scrapped).count();
        Ok((tables.equipment.len() as i64, scrapped as i64))
    }

    async fn count_team_equipment(&self, team_id: i32) -> AppResult<i64> {
        let tables = self.tables()?;
        Ok(tables.equipment.values().filter(|e| e.team_id == team_id).count() as i64)
    }

    // ---- Requests ----

    async fn find_request(&self, id: i32) -> AppResult<Option<MaintenanceRequest>> {
        Ok(self.tables()?.requests.get(&id).cloned())
    }

    async fn query_requests(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        let tables = self.tables()?;
        Ok(tables
            .requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn count_requests(&self, filter: &RequestFilter) -> AppResult<i64> {
        let tables = self.tables()?;
        Ok(tables.requests.values().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn count_requests_by_status(&self) -> AppResult<Vec<(RequestStatus, i64)>> {
        let tables = self.tables()?;
        let mut counts: Vec<(RequestStatus, i64)> = Vec::new();
        for request in tables.requests.values() {
            match counts.iter_mut().find(|(status, _)| *status == request.status) {
                Some((_, count)) => *count += 1,
                None => counts.push((request.status, 1)),
            }
        }
        Ok(counts)
    }

    async fn overdue_requests(&self, today: NaiveDate) -> AppResult<Vec<MaintenanceRequest>> {
        let tables = self.tables()?;
        let mut rows: Vec<_> = tables
            .requests
            .values()
            .filter(|r| r.is_overdue_on(today))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.scheduled_date, r.id));
        Ok(rows)
    }

    async fn insert_request(&self, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        let mut tables = self.tables()?;
        tables.check_request_refs(data)?;
        let request = MaintenanceRequest {
            id: tables.next_id(),
            subject: data.subject.clone(),
            request_type: data.request_type,
            equipment_id: data.equipment_id,
            team_id: data.team_id,
            technician_id: data.technician_id,
            scheduled_date: data.scheduled_date,
            duration_hours: data.duration_hours,
            status: RequestStatus::New,
            priority: data.priority,
            created_at: tables.next_created_at(),
        };
        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn update_request(&self, id: i32, data: &RequestInput) -> AppResult<MaintenanceRequest> {
        let mut tables = self.tables()?;
        if !tables.requests.contains_key(&id) {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }
        tables.check_request_refs(data)?;
        let request = tables
            .requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;
        request.subject = data.subject.clone();
        request.request_type = data.request_type;
        request.equipment_id = data.equipment_id;
        request.team_id = data.team_id;
        request.technician_id = data.technician_id;
        request.scheduled_date = data.scheduled_date;
        request.duration_hours = data.duration_hours;
        request.priority = data.priority;
        Ok(request.clone())
    }

    async fn delete_request(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables()?;
        tables
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    async fn commit_status_change(&self, change: &StatusChange) -> AppResult<MaintenanceRequest> {
        let mut tables = self.tables()?;

        // Nothing is written until both lookups have succeeded.
        let equipment_id = tables
            .requests
            .get(&change.request_id)
            .map(|r| r.equipment_id)
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", change.request_id)))?;
        if change.scrap {
            match tables.equipment.get_mut(&equipment_id) {
                Some(equipment) => equipment.is_scrapped = true,
                None => {
                    return Err(AppError::InconsistentState(format!(
                        "Request {} references missing equipment {}",
                        change.request_id, equipment_id
                    )))
                }
            }
        }

        let request = tables
            .requests
            .get_mut(&change.request_id)
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", change.request_id)))?;
        request.status = change.status;
        Ok(request.clone())
    }
}

/// Remove a technician and clear references to it. Returns false if absent.
fn remove_technician(tables: &mut Tables, id: i32) -> bool {
    if tables.technicians.remove(&id).is_none() {
        return false;
    }
    for equipment in tables.equipment.values_mut() {
        if equipment.default_technician_id == Some(id) {
            equipment.default_technician_id = None;
        }
    }
    for request in tables.requests.values_mut() {
        if request.technician_id == Some(id) {
            request.technician_id = None;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, RequestType};

    async fn seeded() -> (MemoryStore, MaintenanceTeam, Technician, Equipment) {
        let store = MemoryStore::new();
        let team = store
            .insert_team(&TeamInput { name: "Mechanics".to_string() })
            .await
            .unwrap();
        let technician = store
            .insert_technician(team.id, &TechnicianInput { name: "Ana".to_string() })
            .await
            .unwrap();
        let equipment = store
            .insert_equipment(&EquipmentInput {
                name: "Forklift".to_string(),
                serial_number: "FL-001".to_string(),
                department: Some("Logistics".to_string()),
                assigned_employee: None,
                purchase_date: None,
                warranty_expiry: None,
                location: "Warehouse".to_string(),
                team_id: team.id,
                default_technician_id: Some(technician.id),
            })
            .await
            .unwrap();
        (store, team, technician, equipment)
    }

    fn request_input(equipment: &Equipment, technician_id: Option<i32>) -> RequestInput {
        RequestInput {
            subject: "Brake check".to_string(),
            request_type: RequestType::Corrective,
            equipment_id: equipment.id,
            team_id: equipment.team_id,
            technician_id,
            scheduled_date: None,
            duration_hours: None,
            priority: Priority::High,
        }
    }

    #[tokio::test]
    async fn test_status_change_rolls_back_on_missing_equipment() {
        let (store, _, _, equipment) = seeded().await;
        let request = store.insert_request(&request_input(&equipment, None)).await.unwrap();

        store.tables().unwrap().equipment.remove(&equipment.id);

        let err = store
            .commit_status_change(&StatusChange {
                request_id: request.id,
                status: RequestStatus::Scrap,
                scrap: true,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InconsistentState(_)));
        let unchanged = store.find_request(request.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, RequestStatus::New);
    }

    #[tokio::test]
    async fn test_status_change_scraps_equipment() {
        let (store, _, _, equipment) = seeded().await;
        let request = store.insert_request(&request_input(&equipment, None)).await.unwrap();

        let updated = store
            .commit_status_change(&StatusChange {
                request_id: request.id,
                status: RequestStatus::Scrap,
                scrap: true,
            })
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Scrap);
        assert!(store.find_equipment(equipment.id).await.unwrap().unwrap().is_scrapped);
    }

    #[tokio::test]
    async fn test_scrap_follows_current_equipment_after_retarget() {
        let (store, team, _, original) = seeded().await;
        let request = store.insert_request(&request_input(&original, None)).await.unwrap();
        let replacement = store
            .insert_equipment(&EquipmentInput {
                name: "Pallet jack".to_string(),
                serial_number: "PJ-007".to_string(),
                department: None,
                assigned_employee: None,
                purchase_date: None,
                warranty_expiry: None,
                location: "Warehouse".to_string(),
                team_id: team.id,
                default_technician_id: None,
            })
            .await
            .unwrap();

        // The edit lands after the caller read the request but before the commit.
        store
            .update_request(request.id, &request_input(&replacement, None))
            .await
            .unwrap();
        store
            .commit_status_change(&StatusChange {
                request_id: request.id,
                status: RequestStatus::Scrap,
                scrap: true,
            })
            .await
            .unwrap();

        assert!(store.find_equipment(replacement.id).await.unwrap().unwrap().is_scrapped);
        assert!(!store.find_equipment(original.id).await.unwrap().unwrap().is_scrapped);
    }

    #[tokio::test]
    async fn test_duplicate_serial_and_team_name_conflict() {
        let (store, team, _, equipment) = seeded().await;

        let mut copy = EquipmentInput {
            name: "Second forklift".to_string(),
            serial_number: equipment.serial_number.clone(),
            department: None,
            assigned_employee: None,
            purchase_date: None,
            warranty_expiry: None,
            location: "Dock".to_string(),
            team_id: team.id,
            default_technician_id: None,
        };
        assert!(matches!(store.insert_equipment(&copy).await, Err(AppError::Conflict(_))));

        copy.serial_number = "FL-002".to_string();
        assert!(store.insert_equipment(&copy).await.is_ok());

        let dup = TeamInput { name: team.name.clone() };
        assert!(matches!(store.insert_team(&dup).await, Err(AppError::Conflict(_))));
        // Renaming a team to its own name is not a conflict.
        assert!(store.update_team(team.id, &dup).await.is_ok());
    }

    #[tokio::test]
    async fn test_deleting_technician_clears_references() {
        let (store, _, technician, equipment) = seeded().await;
        let request = store
            .insert_request(&request_input(&equipment, Some(technician.id)))
            .await
            .unwrap();

        store.delete_technician(technician.id).await.unwrap();

        let equipment = store.find_equipment(equipment.id).await.unwrap().unwrap();
        assert_eq!(equipment.default_technician_id, None);
        let request = store.find_request(request.id).await.unwrap().unwrap();
        assert_eq!(request.technician_id, None);
    }

    #[tokio::test]
    async fn test_team_delete_restricted_then_cascades_technicians() {
        let (store, team, technician, equipment) = seeded().await;

        assert!(matches!(store.delete_team(team.id).await, Err(AppError::Conflict(_))));

        store.delete_equipment(equipment.id).await.unwrap();
        store.delete_team(team.id).await.unwrap();

        assert!(store.find_team(team.id).await.unwrap().is_none());
        assert!(store.find_technician(technician.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_created_at_strictly_increasing() {
        let (store, _, _, equipment) = seeded().await;
        let first = store.insert_request(&request_input(&equipment, None)).await.unwrap();
        let second = store.insert_request(&request_input(&equipment, None)).await.unwrap();
        assert!(second.created_at > first.created_at);
    }

    #[tokio::test]
    async fn test_counts_match_filters() {
        let (store, team, _, equipment) = seeded().await;
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(store.insert_request(&request_input(&equipment, None)).await.unwrap().id);
        }
        store
            .commit_status_change(&StatusChange {
                request_id: ids[0],
                status: RequestStatus::Scrap,
                scrap: true,
            })
            .await
            .unwrap();

        assert_eq!(store.count_equipment().await.unwrap(), (1, 1));
        assert_eq!(store.count_team_equipment(team.id).await.unwrap(), 1);
        assert_eq!(store.count_team_equipment(team.id + 100).await.unwrap(), 0);

        let open = RequestFilter {
            equipment_id: Some(equipment.id),
            open: Some(true),
            ..Default::default()
        };
        assert_eq!(store.count_requests(&open).await.unwrap(), 2);
        assert_eq!(store.count_requests(&RequestFilter::default()).await.unwrap(), 3);

        let mut by_status = store.count_requests_by_status().await.unwrap();
        by_status.sort_by_key(|(status, _)| status.to_string());
        assert_eq!(by_status, vec![(RequestStatus::New, 2), (RequestStatus::Scrap, 1)]);
    }

    #[tokio::test]
    async fn test_overdue_ordered_by_schedule() {
        let (store, _, _, equipment) = seeded().await;
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut ids = Vec::new();
        for day in [12, 3, 20, 3] {
            let mut input = request_input(&equipment, None);
            input.scheduled_date = NaiveDate::from_ymd_opt(2024, 6, day);
            ids.push(store.insert_request(&input).await.unwrap().id);
        }
        store
            .commit_status_change(&StatusChange {
                request_id: ids[0],
                status: RequestStatus::Repaired,
                scrap: false,
            })
            .await
            .unwrap();

        let overdue: Vec<i32> = store.overdue_requests(today).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(overdue, vec![ids[1], ids[3]]);
    }
}
