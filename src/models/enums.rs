//! Closed value sets for maintenance requests
//!
//! Each enum is stored as TEXT in PostgreSQL using exactly the string
//! returned by `as_str`, and parses back from that string only.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

use crate::error::AppError;

macro_rules! text_enum {
    ($name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(AppError::Validation(format!(
                        "Invalid {} '{}' (expected one of: {})",
                        $label,
                        s,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: AppError| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Position of a request on the maintenance board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Repaired,
    /// Terminal: the equipment is decommissioned
    Scrap,
}

text_enum!(RequestStatus, "status" {
    New => "New",
    InProgress => "In Progress",
    Repaired => "Repaired",
    Scrap => "Scrap",
});

impl RequestStatus {
    /// New and In Progress requests still need work
    pub fn is_open(&self) -> bool {
        matches!(self, RequestStatus::New | RequestStatus::InProgress)
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

text_enum!(Priority, "priority" {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

impl Priority {
    /// Board ordering rank, lower comes first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// RequestType
// ---------------------------------------------------------------------------

/// Reactive repair vs scheduled maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RequestType {
    Corrective,
    Preventive,
}

text_enum!(RequestType, "request type" {
    Corrective => "Corrective",
    Preventive => "Preventive",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in RequestStatus::ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), *status);
        }
        assert_eq!(RequestStatus::InProgress.to_string(), "In Progress");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        for raw in ["Done", "in progress", "", "SCRAP"] {
            let err = raw.parse::<RequestStatus>().unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_status_serde_uses_display_names() {
        let json = serde_json::to_string(&RequestStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: RequestStatus = serde_json::from_str("\"Scrap\"").unwrap();
        assert_eq!(back, RequestStatus::Scrap);
    }

    #[test]
    fn test_priority_rank_and_default() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn test_open_statuses() {
        assert!(RequestStatus::New.is_open());
        assert!(RequestStatus::InProgress.is_open());
        assert!(!RequestStatus::Repaired.is_open());
        assert!(!RequestStatus::Scrap.is_open());
    }
}
