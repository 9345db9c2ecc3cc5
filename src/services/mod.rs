//! Business logic services

pub mod board;
pub mod calendar;
pub mod dashboard;
pub mod equipment;
pub mod requests;
pub mod teams;

use std::sync::Arc;

use crate::repository::EntityStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub requests: requests::RequestsService,
    pub calendar: calendar::CalendarService,
    pub board: board::BoardService,
    pub equipment: equipment::EquipmentService,
    pub teams: teams::TeamsService,
    pub dashboard: dashboard::DashboardService,
    /// Shared store handle, used directly by the readiness probe
    pub store: Arc<dyn EntityStore>,
}

impl Services {
    /// Create all services over the given entity store
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            requests: requests::RequestsService::new(store.clone()),
            calendar: calendar::CalendarService::new(store.clone()),
            board: board::BoardService::new(store.clone()),
            equipment: equipment::EquipmentService::new(store.clone()),
            teams: teams::TeamsService::new(store.clone()),
            dashboard: dashboard::DashboardService::new(store.clone()),
            store,
        }
    }
}
