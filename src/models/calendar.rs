//! Month calendar view for preventive maintenance

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::request::RequestDetails;

/// One week row, Sunday first; `None` marks a padding cell
pub type Week = [Option<u32>; 7];

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    /// English month name, e.g. "February"
    pub month_name: String,
    #[schema(value_type = Vec<Vec<Option<u32>>>)]
    pub weeks: Vec<Week>,
    /// Preventive requests keyed by day of month
    pub requests_by_day: BTreeMap<u32, Vec<RequestDetails>>,
    pub prev_month: u32,
    pub prev_year: i32,
    pub next_month: u32,
    pub next_year: i32,
}
