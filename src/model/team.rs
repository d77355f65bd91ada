use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Team {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Platform")]
    pub name: String,
    /// Identity with role `head_manager` that owns the team.
    #[schema(example = 3)]
    pub head_manager_id: u64,
    /// Identities with role `manager`.
    pub manager_ids: Vec<u64>,
    /// Identities with role `employee`.
    pub member_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub head_manager_id: u64,
    pub manager_ids: Vec<u64>,
    pub member_ids: Vec<u64>,
}

/// Set-replace semantics: a present list replaces the whole relation.
#[derive(Debug, Clone, Default)]
pub struct TeamChanges {
    pub name: Option<String>,
    pub manager_ids: Option<Vec<u64>>,
    pub member_ids: Option<Vec<u64>>,
}

/// Task/report filed against a team. Never edited after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TeamReport {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub team_id: u64,
    #[schema(example = "Quarterly review")]
    pub title: String,
    #[schema(example = "Prepare the Q4 numbers")]
    pub description: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTeamReport {
    pub title: String,
    pub description: String,
}
