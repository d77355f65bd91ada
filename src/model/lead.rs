use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum LeadStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Closed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum LeadPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Acme rollout")]
    pub name: String,
    #[schema(example = "buyer@acme.test", nullable = true)]
    pub email: Option<String>,
    #[schema(example = "+15550100", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = "Acme", nullable = true)]
    pub company: Option<String>,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    /// Identity with role `sales`; cleared when that identity is deleted.
    #[schema(example = 4, nullable = true)]
    pub assigned_to: Option<u64>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    pub assigned_to: Option<u64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadChanges {
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    pub notes: Option<Option<String>>,
    pub assigned_to: Option<Option<u64>>,
}
