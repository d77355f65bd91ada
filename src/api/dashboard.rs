use std::collections::BTreeSet;
use std::str::FromStr;

use actix_web::{HttpResponse, http::header::LOCATION, web};
use serde::Serialize;
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::gate::Operation;
use crate::config::Config;
use crate::error::AppError;
use crate::model::lead::LeadStatus;
use crate::model::role::Role;
use crate::model::team::Team;
use crate::model::user::User;
use crate::store::{EmployeeStore, LeadStore, PayrollStore, Store, TeamStore, UserStore};

/// Role specific counters. Roles without a dedicated dashboard get none.
#[derive(Serialize)]
#[serde(untagged)]
pub enum Counters {
    HeadHr {
        total_employees: u64,
        total_payrolls: u64,
        total_reports: u64,
    },
    Manager {
        teams: Vec<Team>,
        total_team_members: usize,
        total_reports: usize,
    },
    HeadManager {
        total_teams: usize,
        total_managers: usize,
        total_reports: usize,
    },
    Sales {
        total_leads: usize,
        open_leads: usize,
        closed_leads: usize,
    },
    Plain {},
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub user: User,
    #[serde(flatten)]
    pub counters: Counters,
}

async fn counters_for(store: &dyn Store, user: &User) -> Result<Counters, AppError> {
    let counters = match user.role {
        Role::HeadHr => Counters::HeadHr {
            total_employees: store.count_employees().await?,
            total_payrolls: store.payroll_totals().await?.0,
            total_reports: 0,
        },
        Role::Manager => {
            let teams = store.teams_managed_by(user.id).await?;
            let ids: Vec<u64> = teams.iter().map(|t| t.id).collect();
            let total_reports = store.reports_for_teams(&ids).await?.len();
            Counters::Manager {
                total_team_members: teams.iter().map(|t| t.member_ids.len()).sum(),
                total_reports,
                teams,
            }
        }
        Role::HeadManager => {
            let teams = store.teams_headed_by(user.id).await?;
            let ids: Vec<u64> = teams.iter().map(|t| t.id).collect();
            let managers: BTreeSet<u64> = teams
                .iter()
                .flat_map(|t| t.manager_ids.iter().copied())
                .collect();
            Counters::HeadManager {
                total_teams: teams.len(),
                total_managers: managers.len(),
                total_reports: store.reports_for_teams(&ids).await?.len(),
            }
        }
        Role::Sales => {
            let leads = store.list_leads(Some(user.id)).await?;
            let with_status = |s: LeadStatus| leads.iter().filter(|l| l.status == s).count();
            Counters::Sales {
                total_leads: leads.len(),
                open_leads: with_status(LeadStatus::Open),
                closed_leads: with_status(LeadStatus::Closed),
            }
        }
        _ => Counters::Plain {},
    };
    Ok(counters)
}

#[utoipa::path(
    get,
    path = "/erp/{role}/dashboard",
    params(("role" = String, Path, description = "Role tag, e.g. `head_hr`")),
    responses(
        (status = 200, description = "Caller identity plus role counters", body = Object, example = json!({
            "user": {"id": 4, "username": "sam", "role": "sales"},
            "total_leads": 3,
            "open_leads": 2,
            "closed_leads": 1
        })),
        (status = 302, description = "Caller's role differs from the path segment"),
        (status = 404, description = "Unknown role segment")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    caller: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let role = Role::from_str(&path.into_inner()).map_err(|_| AppError::NotFound("Dashboard"))?;
    caller.require(Operation::Dashboard(role))?;

    let store = store.get_ref();
    let user = store
        .get_user(caller.user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    let counters = counters_for(store, &user).await?;
    debug!(user_id = user.id, role = %role, "Dashboard rendered");
    Ok(HttpResponse::Ok().json(DashboardResponse { user, counters }))
}

#[utoipa::path(
    get,
    path = "/erp/home",
    responses(
        (status = 302, description = "Redirect to the caller's dashboard")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn home(caller: AuthUser, config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, caller.role.dashboard_path(&config.api_prefix)))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_counters_add_nothing() {
        let body = serde_json::to_value(Counters::Plain {}).unwrap();
        assert_eq!(body, json!({}));

        let body = serde_json::to_value(Counters::Sales {
            total_leads: 2,
            open_leads: 1,
            closed_leads: 0,
        })
        .unwrap();
        assert_eq!(body["open_leads"], 1);
    }
}
