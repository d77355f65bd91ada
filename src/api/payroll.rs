use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::gate::{Gate, policy};
use crate::error::AppError;
use crate::model::payroll::Payroll;
use crate::services::payrolls::{self, PayrollEdit, PayrollForm};
use crate::store::{PayrollStore, Store};

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    /// Employee row id.
    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "October")]
    pub month: String,

    #[schema(example = 2025)]
    pub year: i32,
}

/// Any subset of fields. Salary columns are always re-derived from the
/// employee's current basic salary.
#[derive(Deserialize, ToSchema)]
pub struct UpdatePayroll {
    #[schema(example = 1)]
    pub employee_id: Option<u64>,

    #[schema(example = "November")]
    pub month: Option<String>,

    #[schema(example = 2025)]
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/erp/hr/payrolls",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll created", body = Payroll, example = json!({
            "id": 1,
            "employee_id": 1,
            "month": "October",
            "year": 2025,
            "basic_salary": "50000.00",
            "hra": "10000.00",
            "allowances": "5000.00",
            "deductions": "2500.00",
            "net_salary": "62500.00",
            "created_at": "2025-10-19T09:30:00Z"
        })),
        (status = 400, description = "Field errors"),
        (status = 302, description = "Not logged in or not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    _gate: Gate<policy::ManagePayrolls>,
    store: web::Data<dyn Store>,
    payload: web::Json<CreatePayroll>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let payroll = payrolls::create_payroll(
        store.get_ref(),
        PayrollForm {
            employee_id: payload.employee_id,
            month: payload.month,
            year: payload.year,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(payroll))
}

#[utoipa::path(
    put,
    path = "/erp/hr/payrolls/{payroll_id}",
    request_body = UpdatePayroll,
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll updated and re-priced", body = Payroll),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    _gate: Gate<policy::ManagePayrolls>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayroll>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let payroll = payrolls::update_payroll(
        store.get_ref(),
        path.into_inner(),
        PayrollEdit {
            employee_id: body.employee_id,
            month: body.month,
            year: body.year,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/erp/hr/payrolls/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, body = Payroll),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    _gate: Gate<policy::ManagePayrolls>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let payroll = store
        .get_payroll(path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Payroll"))?;

    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/erp/hr/payrolls",
    params(PayrollQuery),
    responses(
        (status = 200, body = [Payroll])
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    _gate: Gate<policy::ManagePayrolls>,
    store: web::Data<dyn Store>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, AppError> {
    let payrolls = store.list_payrolls(query.employee_id).await?;
    Ok(HttpResponse::Ok().json(payrolls))
}

#[utoipa::path(
    delete,
    path = "/erp/hr/payrolls/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 204, description = "Payroll deleted"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    _gate: Gate<policy::ManagePayrolls>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    payrolls::delete_payroll(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
