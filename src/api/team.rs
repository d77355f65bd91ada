use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::gate::{Gate, policy};
use crate::error::AppError;
use crate::model::team::{NewTeamReport, Team, TeamReport};
use crate::services::teams::{self, TeamEdit, TeamForm};
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct CreateTeam {
    #[schema(example = "Platform")]
    pub name: String,
    /// Identities with role `manager`.
    #[serde(default)]
    pub manager_ids: Vec<u64>,
    /// Identities with role `employee`.
    #[serde(default)]
    pub member_ids: Vec<u64>,
}

/// A present list replaces the whole relation.
#[derive(Deserialize, ToSchema)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub manager_ids: Option<Vec<u64>>,
    pub member_ids: Option<Vec<u64>>,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignManagers {
    #[schema(example = 1)]
    pub team_id: u64,
    #[serde(default)]
    pub manager_ids: Vec<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTask {
    #[schema(example = "Quarterly review")]
    pub title: String,
    #[schema(example = "Prepare the Q4 numbers")]
    pub description: String,
}

#[utoipa::path(
    get,
    path = "/erp/head_manager/teams",
    responses((status = 200, description = "Teams headed by the caller", body = [Team])),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn list_teams(
    gate: Gate<policy::ManageTeams>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let teams = teams::list_teams(store.get_ref(), gate.user_id).await?;
    Ok(HttpResponse::Ok().json(teams))
}

#[utoipa::path(
    post,
    path = "/erp/head_manager/teams",
    request_body = CreateTeam,
    responses(
        (status = 201, body = Team),
        (status = 400, description = "Field errors, e.g. a member without role employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn create_team(
    gate: Gate<policy::ManageTeams>,
    store: web::Data<dyn Store>,
    payload: web::Json<CreateTeam>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let team = teams::create_team(
        store.get_ref(),
        gate.user_id,
        TeamForm {
            name: payload.name,
            manager_ids: payload.manager_ids,
            member_ids: payload.member_ids,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(team))
}

#[utoipa::path(
    put,
    path = "/erp/head_manager/teams/{id}",
    request_body = UpdateTeam,
    params(("id" = u64, Path, description = "Team id")),
    responses(
        (status = 200, body = Team),
        (status = 404, description = "No such team headed by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn update_team(
    gate: Gate<policy::ManageTeams>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<UpdateTeam>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let team = teams::update_team(
        store.get_ref(),
        gate.user_id,
        path.into_inner(),
        TeamEdit {
            name: payload.name,
            manager_ids: payload.manager_ids,
            member_ids: payload.member_ids,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(team))
}

#[utoipa::path(
    delete,
    path = "/erp/head_manager/teams/{id}",
    params(("id" = u64, Path, description = "Team id")),
    responses(
        (status = 204, description = "Team and its reports deleted"),
        (status = 404, description = "No such team headed by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn delete_team(
    gate: Gate<policy::ManageTeams>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    teams::delete_team(store.get_ref(), gate.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/erp/head_manager/assign-manager",
    request_body = AssignManagers,
    responses(
        (status = 200, description = "Manager set replaced", body = Team),
        (status = 400, description = "An id is not a manager"),
        (status = 404, description = "No such team headed by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn assign_managers(
    gate: Gate<policy::ManageTeams>,
    store: web::Data<dyn Store>,
    payload: web::Json<AssignManagers>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let team =
        teams::assign_managers(store.get_ref(), gate.user_id, payload.team_id, payload.manager_ids)
            .await?;
    Ok(HttpResponse::Ok().json(team))
}

#[utoipa::path(
    post,
    path = "/erp/manager/teams/{id}/tasks",
    request_body = CreateTask,
    params(("id" = u64, Path, description = "Team id")),
    responses(
        (status = 201, body = TeamReport),
        (status = 404, description = "The caller does not manage this team")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn assign_task(
    gate: Gate<policy::AssignTask>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<CreateTask>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let report = teams::assign_task(
        store.get_ref(),
        gate.user_id,
        path.into_inner(),
        NewTeamReport {
            title: payload.title,
            description: payload.description,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(report))
}

#[utoipa::path(
    get,
    path = "/erp/manager/tasks",
    responses((status = 200, description = "Newest first", body = [TeamReport])),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn list_tasks(
    gate: Gate<policy::ViewTasks>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let tasks = teams::tasks_for_manager(store.get_ref(), gate.user_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}
