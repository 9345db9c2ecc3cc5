//! Dashboard statistics service

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    api::dashboard::{DashboardStats, EquipmentCounts, RequestCounts},
    error::AppResult,
    models::{RequestDetails, RequestStatus},
    repository::EntityStore,
};

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn EntityStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Registry and request counts as of `today`
    pub async fn stats(&self, today: NaiveDate) -> AppResult<DashboardStats> {
        let (total, scrapped) = self.store.count_equipment().await?;

        let mut counts = RequestCounts {
            total: 0,
            new: 0,
            in_progress: 0,
            repaired: 0,
            scrap: 0,
        };
        for (status, count) in self.store.count_requests_by_status().await? {
            counts.total += count;
            match status {
                RequestStatus::New => counts.new += count,
                RequestStatus::InProgress => counts.in_progress += count,
                RequestStatus::Repaired => counts.repaired += count,
                RequestStatus::Scrap => counts.scrap += count,
            }
        }

        let overdue = self
            .store
            .overdue_requests(today)
            .await?
            .into_iter()
            .map(|r| RequestDetails::new(r, today))
            .collect();

        Ok(DashboardStats {
            equipment: EquipmentCounts {
                total,
                active: total - scrapped,
                scrapped,
            },
            requests: counts,
            overdue_requests: overdue,
        })
    }
}
