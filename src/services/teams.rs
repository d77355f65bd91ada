use tracing::info;

use crate::error::{AppError, FieldErrors};
use crate::model::role::Role;
use crate::model::team::{NewTeam, NewTeamReport, Team, TeamChanges, TeamReport};
use crate::services::validate;
use crate::store::{Store, TeamStore, UserStore};

#[derive(Debug, Clone, Default)]
pub struct TeamForm {
    pub name: String,
    pub manager_ids: Vec<u64>,
    pub member_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamEdit {
    pub name: Option<String>,
    pub manager_ids: Option<Vec<u64>>,
    pub member_ids: Option<Vec<u64>>,
}

/// Every id must name an identity holding `role`.
async fn check_roles(
    store: &dyn Store,
    errors: &mut FieldErrors,
    field: &str,
    ids: &[u64],
    role: Role,
) -> Result<(), AppError> {
    for id in ids {
        let matches = store
            .get_user(*id)
            .await?
            .is_some_and(|user| user.role == role);
        if !matches {
            errors.add(
                field,
                format!("Select a valid choice. {id} is not one of the available choices."),
            );
        }
    }
    Ok(())
}

/// Team headed by `head_id`. Teams of other head managers read as missing.
async fn own_team(store: &dyn Store, head_id: u64, team_id: u64) -> Result<Team, AppError> {
    store
        .get_team(team_id)
        .await?
        .filter(|team| team.head_manager_id == head_id)
        .ok_or(AppError::NotFound("Team"))
}

pub async fn create_team(
    store: &dyn Store,
    head_id: u64,
    form: TeamForm,
) -> Result<Team, AppError> {
    let mut errors = FieldErrors::new();
    validate::required_text(&mut errors, "name", &form.name, validate::TEAM_NAME_MAX);
    check_roles(store, &mut errors, "managers", &form.manager_ids, Role::Manager).await?;
    check_roles(store, &mut errors, "members", &form.member_ids, Role::Employee).await?;
    errors.into_result()?;

    let team = store
        .create_team(NewTeam {
            name: form.name.trim().to_string(),
            head_manager_id: head_id,
            manager_ids: form.manager_ids,
            member_ids: form.member_ids,
        })
        .await?;
    info!(team_id = team.id, head_id, "Team created");
    Ok(team)
}

pub async fn list_teams(store: &dyn Store, head_id: u64) -> Result<Vec<Team>, AppError> {
    Ok(store.teams_headed_by(head_id).await?)
}

pub async fn update_team(
    store: &dyn Store,
    head_id: u64,
    team_id: u64,
    edit: TeamEdit,
) -> Result<Team, AppError> {
    own_team(store, head_id, team_id).await?;

    let mut errors = FieldErrors::new();
    if let Some(name) = &edit.name {
        validate::required_text(&mut errors, "name", name, validate::TEAM_NAME_MAX);
    }
    if let Some(ids) = &edit.manager_ids {
        check_roles(store, &mut errors, "managers", ids, Role::Manager).await?;
    }
    if let Some(ids) = &edit.member_ids {
        check_roles(store, &mut errors, "members", ids, Role::Employee).await?;
    }
    errors.into_result()?;

    store
        .update_team(
            team_id,
            TeamChanges {
                name: edit.name.map(|n| n.trim().to_string()),
                manager_ids: edit.manager_ids,
                member_ids: edit.member_ids,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Team"))
}

/// Replaces the manager set of one of the caller's teams.
pub async fn assign_managers(
    store: &dyn Store,
    head_id: u64,
    team_id: u64,
    manager_ids: Vec<u64>,
) -> Result<Team, AppError> {
    update_team(
        store,
        head_id,
        team_id,
        TeamEdit {
            manager_ids: Some(manager_ids),
            ..Default::default()
        },
    )
    .await
}

/// Deleting a team removes its reports.
pub async fn delete_team(store: &dyn Store, head_id: u64, team_id: u64) -> Result<(), AppError> {
    own_team(store, head_id, team_id).await?;
    if !store.delete_team(team_id).await? {
        return Err(AppError::NotFound("Team"));
    }
    info!(team_id, head_id, "Team deleted");
    Ok(())
}

/// Files a task against a team the caller manages.
pub async fn assign_task(
    store: &dyn Store,
    manager_id: u64,
    team_id: u64,
    report: NewTeamReport,
) -> Result<TeamReport, AppError> {
    let team = store
        .get_team(team_id)
        .await?
        .filter(|team| team.manager_ids.contains(&manager_id))
        .ok_or(AppError::NotFound("Team"))?;

    let mut errors = FieldErrors::new();
    validate::required_text(&mut errors, "title", &report.title, validate::REPORT_TITLE_MAX);
    if report.description.trim().is_empty() {
        errors.add("description", "This field is required.");
    }
    errors.into_result()?;

    let report = store.create_team_report(team.id, report).await?;
    info!(team_id, report_id = report.id, manager_id, "Task assigned");
    Ok(report)
}

/// Tasks of every team the caller manages, newest first.
pub async fn tasks_for_manager(store: &dyn Store, manager_id: u64) -> Result<Vec<TeamReport>, AppError> {
    let team_ids: Vec<u64> = store
        .teams_managed_by(manager_id)
        .await?
        .iter()
        .map(|t| t.id)
        .collect();
    Ok(store.reports_for_teams(&team_ids).await?)
}
