//! Equipment model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    /// Equipment name / description
    pub name: String,
    /// Manufacturer serial number (unique)
    pub serial_number: String,
    pub department: Option<String>,
    /// Employee the equipment is assigned to
    pub assigned_employee: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub location: String,
    /// Owning maintenance team
    pub team_id: i32,
    pub default_technician_id: Option<i32>,
    /// Set once a request on this equipment reaches Scrap; never cleared
    pub is_scrapped: bool,
}

/// Equipment with its open request count
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentDetails {
    #[serde(flatten)]
    pub equipment: Equipment,
    /// Requests in New or In Progress
    pub open_requests: i64,
}

/// Values a request form pre-fills from the chosen equipment
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentDefaults {
    pub team_id: i32,
    pub default_technician_id: Option<i32>,
    pub is_scrapped: bool,
}

/// Create or update equipment request (updates replace every editable field)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EquipmentInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1-100 characters"))]
    pub serial_number: String,
    pub department: Option<String>,
    pub assigned_employee: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: String,
    pub team_id: i32,
    pub default_technician_id: Option<i32>,
}

/// Equipment list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    /// Exact department match
    pub department: Option<String>,
    /// Exact assigned employee match
    pub employee: Option<String>,
    /// Substring of name or serial number
    pub search: Option<String>,
}

impl EquipmentQuery {
    /// Whether `equipment` passes every filter that is set
    pub fn matches(&self, equipment: &Equipment) -> bool {
        if let Some(ref department) = self.department {
            if equipment.department.as_deref() != Some(department.as_str()) {
                return false;
            }
        }
        if let Some(ref employee) = self.employee {
            if equipment.assigned_employee.as_deref() != Some(employee.as_str()) {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !equipment.name.to_lowercase().contains(&needle)
                && !equipment.serial_number.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Treat empty strings from query forms as unset
    pub fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            department: keep(self.department),
            employee: keep(self.employee),
            search: keep(self.search),
        }
    }
}

/// Equipment listing with filter facets
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentList {
    pub items: Vec<Equipment>,
    /// Distinct departments across all equipment
    pub departments: Vec<String>,
    /// Distinct assigned employees across all equipment
    pub employees: Vec<String>,
}
