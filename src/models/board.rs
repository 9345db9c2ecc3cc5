//! Kanban board grouping

use serde::Serialize;
use utoipa::ToSchema;

use super::request::RequestDetails;

/// Requests grouped by status
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Board {
    /// Sorted by priority, High first
    pub new: Vec<RequestDetails>,
    /// The remaining buckets are newest first
    pub in_progress: Vec<RequestDetails>,
    pub repaired: Vec<RequestDetails>,
    pub scrap: Vec<RequestDetails>,
}
