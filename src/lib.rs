//! GearGuard maintenance tracker
//!
//! REST JSON API over an equipment registry, maintenance teams and the
//! maintenance request workflow: status lifecycle with equipment scrapping,
//! a preventive maintenance calendar and a kanban board.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
