use tracing::info;

use crate::error::{AppError, FieldErrors};
use crate::model::lead::{Lead, LeadChanges, LeadPriority, LeadStatus, NewLead};
use crate::model::role::Role;
use crate::services::validate;
use crate::store::{LeadStore, Store, UserStore};

#[derive(Debug, Clone, Default)]
pub struct LeadForm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    pub notes: Option<String>,
}

/// Fields the assigned salesperson may change.
#[derive(Debug, Clone, Default)]
pub struct LeadEdit {
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    pub notes: Option<Option<String>>,
}

/// Creates a lead assigned to `owner_id`.
pub async fn create_own_lead(
    store: &dyn Store,
    owner_id: u64,
    form: LeadForm,
) -> Result<Lead, AppError> {
    let email = validate::blank_to_none(form.email);
    let phone = validate::blank_to_none(form.phone);
    let company = validate::blank_to_none(form.company);

    let mut errors = FieldErrors::new();
    validate::required_text(&mut errors, "name", &form.name, validate::LEAD_NAME_MAX);
    validate::email(&mut errors, "email", email.as_deref());
    validate::optional_text(&mut errors, "phone", phone.as_deref(), validate::LEAD_PHONE_MAX);
    validate::optional_text(&mut errors, "company", company.as_deref(), validate::LEAD_COMPANY_MAX);
    errors.into_result()?;

    let lead = store
        .create_lead(NewLead {
            name: form.name.trim().to_string(),
            email,
            phone,
            company,
            status: form.status.unwrap_or_default(),
            priority: form.priority.unwrap_or_default(),
            assigned_to: Some(owner_id),
            notes: validate::blank_to_none(form.notes),
        })
        .await?;
    info!(lead_id = lead.id, owner_id, "Lead created");
    Ok(lead)
}

pub async fn leads_of(store: &dyn Store, owner_id: u64) -> Result<Vec<Lead>, AppError> {
    Ok(store.list_leads(Some(owner_id)).await?)
}

pub async fn all_leads(store: &dyn Store) -> Result<Vec<Lead>, AppError> {
    Ok(store.list_leads(None).await?)
}

/// Only the assignee may edit a lead.
pub async fn update_own_lead(
    store: &dyn Store,
    owner_id: u64,
    lead_id: u64,
    edit: LeadEdit,
) -> Result<Lead, AppError> {
    let lead = store.get_lead(lead_id).await?.ok_or(AppError::NotFound("Lead"))?;
    if lead.assigned_to != Some(owner_id) {
        return Err(AppError::Unauthorized);
    }

    store
        .update_lead(
            lead_id,
            LeadChanges {
                status: edit.status,
                priority: edit.priority,
                notes: edit.notes.map(validate::blank_to_none),
                assigned_to: None,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Lead"))
}

/// Hands a lead to another salesperson, or unassigns it with `None`.
pub async fn assign_lead(
    store: &dyn Store,
    lead_id: u64,
    assignee: Option<u64>,
) -> Result<Lead, AppError> {
    store.get_lead(lead_id).await?.ok_or(AppError::NotFound("Lead"))?;

    if let Some(user_id) = assignee {
        let is_sales = store
            .get_user(user_id)
            .await?
            .is_some_and(|u| u.role == Role::Sales);
        if !is_sales {
            return Err(AppError::validation(
                "assigned_to",
                "Select a valid choice. That choice is not one of the available choices.",
            ));
        }
    }

    let lead = store
        .update_lead(
            lead_id,
            LeadChanges {
                assigned_to: Some(assignee),
                ..Default::default()
            },
        )
        .await?
        .ok_or(AppError::NotFound("Lead"))?;
    info!(lead_id, assignee = ?assignee, "Lead reassigned");
    Ok(lead)
}

pub async fn delete_lead(store: &dyn Store, lead_id: u64) -> Result<(), AppError> {
    if store.delete_lead(lead_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Lead"))
    }
}
