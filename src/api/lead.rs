use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::double_option;
use crate::auth::gate::{Gate, policy};
use crate::error::AppError;
use crate::model::lead::{Lead, LeadPriority, LeadStatus};
use crate::services::leads::{self, LeadEdit, LeadForm};
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct CreateLead {
    #[schema(example = "Acme rollout")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Defaults to `Open`.
    pub status: Option<LeadStatus>,
    /// Defaults to `Medium`.
    pub priority: Option<LeadPriority>,
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLead {
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignLead {
    /// Identity with role `sales`, or null to unassign.
    #[schema(example = 4, nullable = true)]
    pub assigned_to: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/erp/sales/leads",
    responses((status = 200, description = "Leads assigned to the caller, newest first", body = [Lead])),
    security(("bearer_auth" = [])),
    tag = "Lead"
)]
pub async fn my_leads(
    gate: Gate<policy::ManageOwnLeads>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let leads = leads::leads_of(store.get_ref(), gate.user_id).await?;
    Ok(HttpResponse::Ok().json(leads))
}

#[utoipa::path(
    post,
    path = "/erp/sales/leads",
    request_body = CreateLead,
    responses(
        (status = 201, description = "Lead created and assigned to the caller", body = Lead),
        (status = 400, description = "Field errors")
    ),
    security(("bearer_auth" = [])),
    tag = "Lead"
)]
pub async fn create_lead(
    gate: Gate<policy::ManageOwnLeads>,
    store: web::Data<dyn Store>,
    payload: web::Json<CreateLead>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let lead = leads::create_own_lead(
        store.get_ref(),
        gate.user_id,
        LeadForm {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            company: payload.company,
            status: payload.status,
            priority: payload.priority,
            notes: payload.notes,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(lead))
}

#[utoipa::path(
    put,
    path = "/erp/sales/leads/{id}",
    request_body = UpdateLead,
    params(("id" = u64, Path, description = "Lead id")),
    responses(
        (status = 200, body = Lead),
        (status = 302, description = "The caller is not the assignee"),
        (status = 404, description = "Lead not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Lead"
)]
pub async fn update_lead(
    gate: Gate<policy::ManageOwnLeads>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLead>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let lead = leads::update_own_lead(
        store.get_ref(),
        gate.user_id,
        path.into_inner(),
        LeadEdit {
            status: payload.status,
            priority: payload.priority,
            notes: payload.notes,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(lead))
}

#[utoipa::path(
    get,
    path = "/erp/head_sales/leads",
    responses((status = 200, description = "Every lead, newest first", body = [Lead])),
    security(("bearer_auth" = [])),
    tag = "Lead"
)]
pub async fn all_leads(
    _gate: Gate<policy::OverseeLeads>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let leads = leads::all_leads(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(leads))
}

#[utoipa::path(
    put,
    path = "/erp/head_sales/leads/{id}/assign",
    request_body = AssignLead,
    params(("id" = u64, Path, description = "Lead id")),
    responses(
        (status = 200, body = Lead),
        (status = 400, description = "Assignee is not a sales identity"),
        (status = 404, description = "Lead not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Lead"
)]
pub async fn assign_lead(
    _gate: Gate<policy::OverseeLeads>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<AssignLead>,
) -> Result<HttpResponse, AppError> {
    let lead = leads::assign_lead(store.get_ref(), path.into_inner(), payload.assigned_to).await?;
    Ok(HttpResponse::Ok().json(lead))
}

#[utoipa::path(
    delete,
    path = "/erp/head_sales/leads/{id}",
    params(("id" = u64, Path, description = "Lead id")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "Lead not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Lead"
)]
pub async fn delete_lead(
    _gate: Gate<policy::OverseeLeads>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    leads::delete_lead(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
