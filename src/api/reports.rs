use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::gate::{Gate, policy};
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::model::payroll::Payroll;
use crate::store::{EmployeeStore, PayrollStore, Store};

#[derive(Serialize, ToSchema)]
pub struct AdminReport {
    #[schema(example = 12)]
    pub total_employees: u64,
    #[schema(example = 30)]
    pub total_payrolls: u64,
    /// Sum of every payroll's net salary.
    #[schema(value_type = String, example = "1875000.00")]
    pub total_salary: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct HrReport {
    pub employees: Vec<Employee>,
    pub payrolls: Vec<Payroll>,
}

#[utoipa::path(
    get,
    path = "/erp/admin/reports",
    responses((status = 200, body = AdminReport)),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn admin_reports(
    _gate: Gate<policy::AdminReports>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let (total_payrolls, total_salary) = store.payroll_totals().await?;
    Ok(HttpResponse::Ok().json(AdminReport {
        total_employees: store.count_employees().await?,
        total_payrolls,
        total_salary,
    }))
}

#[utoipa::path(
    get,
    path = "/erp/hr/reports",
    responses((status = 200, body = HrReport)),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn hr_reports(
    _gate: Gate<policy::HrReports>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(HrReport {
        employees: store.list_employees().await?,
        payrolls: store.list_payrolls(None).await?,
    }))
}
