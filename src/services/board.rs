//! Kanban board aggregation

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::{
    error::AppResult,
    models::{Board, MaintenanceRequest, RequestDetails, RequestFilter, RequestStatus},
    repository::EntityStore,
};

#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn EntityStore>,
}

impl BoardService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// All requests grouped by status. New is ordered by priority (High
    /// first, ties keep store order); other columns are newest first.
    pub async fn build_board(&self) -> AppResult<Board> {
        let today = Utc::now().date_naive();

        let mut new = self.column(RequestStatus::New).await?;
        sort_by_priority(&mut new);

        let mut in_progress = self.column(RequestStatus::InProgress).await?;
        let mut repaired = self.column(RequestStatus::Repaired).await?;
        let mut scrap = self.column(RequestStatus::Scrap).await?;
        for column in [&mut in_progress, &mut repaired, &mut scrap] {
            sort_newest_first(column);
        }

        Ok(Board {
            new: cards(new, today),
            in_progress: cards(in_progress, today),
            repaired: cards(repaired, today),
            scrap: cards(scrap, today),
        })
    }

    async fn column(&self, status: RequestStatus) -> AppResult<Vec<MaintenanceRequest>> {
        self.store.query_requests(&RequestFilter::status(status)).await
    }
}

/// Stable sort, High before Medium before Low
pub fn sort_by_priority(requests: &mut [MaintenanceRequest]) {
    requests.sort_by_key(|r| r.priority.rank());
}

pub fn sort_newest_first(requests: &mut [MaintenanceRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn cards(requests: Vec<MaintenanceRequest>, today: NaiveDate) -> Vec<RequestDetails> {
    requests
        .into_iter()
        .map(|r| RequestDetails::new(r, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentInput, Priority, RequestInput, RequestType, TeamInput};
    use crate::repository::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn request(id: i32, priority: Priority, created_minute: u32) -> MaintenanceRequest {
        MaintenanceRequest {
            id,
            subject: format!("Request {}", id),
            request_type: RequestType::Corrective,
            equipment_id: 1,
            team_id: 1,
            technician_id: None,
            scheduled_date: None,
            duration_hours: None,
            status: RequestStatus::New,
            priority,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, created_minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_priority_sort_is_stable() {
        let mut requests = vec![
            request(1, Priority::Low, 0),
            request(2, Priority::High, 1),
            request(3, Priority::Medium, 2),
            request(4, Priority::High, 3),
        ];
        sort_by_priority(&mut requests);

        let ids: Vec<i32> = requests.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_newest_first() {
        let mut requests = vec![
            request(1, Priority::Medium, 5),
            request(2, Priority::Medium, 30),
            request(3, Priority::Medium, 10),
        ];
        sort_newest_first(&mut requests);

        let ids: Vec<i32> = requests.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_board_partitions_every_request() {
        let store = Arc::new(MemoryStore::new());
        let team = store.insert_team(&TeamInput { name: "Facilities".to_string() }).await.unwrap();
        let equipment = store
            .insert_equipment(&EquipmentInput {
                name: "Chiller".to_string(),
                serial_number: "CH-1".to_string(),
                department: None,
                assigned_employee: None,
                purchase_date: None,
                warranty_expiry: None,
                location: "Roof".to_string(),
                team_id: team.id,
                default_technician_id: None,
            })
            .await
            .unwrap();

        let yesterday = Utc::now().date_naive() - Duration::days(1);
        let mut ids = Vec::new();
        for (subject, priority) in [
            ("Low one", Priority::Low),
            ("High one", Priority::High),
            ("Medium one", Priority::Medium),
            ("High two", Priority::High),
            ("Moved along", Priority::Medium),
        ] {
            let created = store
                .insert_request(&RequestInput {
                    subject: subject.to_string(),
                    request_type: RequestType::Corrective,
                    equipment_id: equipment.id,
                    team_id: team.id,
                    technician_id: None,
                    scheduled_date: Some(yesterday),
                    duration_hours: None,
                    priority,
                })
                .await
                .unwrap();
            ids.push(created.id);
        }
        store
            .commit_status_change(&crate::models::StatusChange {
                request_id: ids[4],
                status: RequestStatus::Repaired,
                scrap: false,
            })
            .await
            .unwrap();

        let board = BoardService::new(store).build_board().await.unwrap();

        let subjects: Vec<&str> = board.new.iter().map(|c| c.request.subject.as_str()).collect();
        assert_eq!(subjects, vec!["High one", "High two", "Medium one", "Low one"]);
        assert!(board.new.iter().all(|c| c.is_overdue));
        assert!(board.in_progress.is_empty());
        assert!(board.scrap.is_empty());
        assert_eq!(board.repaired.len(), 1);
        assert!(!board.repaired[0].is_overdue);
    }
}
