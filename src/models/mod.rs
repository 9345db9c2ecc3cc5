//! Data models for GearGuard

pub mod board;
pub mod calendar;
pub mod enums;
pub mod equipment;
pub mod request;
pub mod team;
pub mod user;

// Re-export commonly used types
pub use board::Board;
pub use calendar::CalendarView;
pub use enums::{Priority, RequestStatus, RequestType};
pub use equipment::{Equipment, EquipmentInput, EquipmentQuery};
pub use request::{MaintenanceRequest, RequestDetails, RequestFilter, RequestInput, StatusChange};
pub use team::{MaintenanceTeam, TeamInput, Technician, TechnicianInput};
pub use user::{Role, UserClaims};
