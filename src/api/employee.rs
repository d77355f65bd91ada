use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::api::double_option;
use crate::auth::gate::{Gate, policy};
use crate::error::{AppError, FieldErrors};
use crate::model::employee::{Employee, EmployeeChanges, EmployeeFields};
use crate::model::role::Role;
use crate::services::{
    employees,
    users::{self, Registration, UserEdit},
    validate,
};
use crate::store::{EmployeeStore, Store, UserStore};
use crate::utils::username_index::UsernameIndex;

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "s3cret")]
    pub password: String,
    #[serde(default)]
    #[schema(example = "John")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email", nullable = true)]
    pub email: Option<String>,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Developer")]
    pub designation: String,
    #[schema(example = "+8801712345678")]
    pub contact_number: String,
    #[schema(value_type = String, example = "50000.00")]
    pub basic_salary: Decimal,
    #[schema(nullable = true)]
    pub photo: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub contact_number: Option<String>,
    #[schema(value_type = Option<String>, example = "60000.00")]
    pub basic_salary: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub photo: Option<Option<String>>,
}

/// Employee record together with the owning identity's names.
#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    #[serde(flatten)]
    pub employee: Employee,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
}

async fn with_identity(store: &dyn Store, employee: Employee) -> Result<EmployeeResponse, AppError> {
    let user = store
        .get_user(employee.user_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("employee {} has no identity", employee.id)))?;

    Ok(EmployeeResponse {
        employee,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    })
}

#[utoipa::path(
    get,
    path = "/erp/hr/employees",
    responses(
        (status = 200, body = [EmployeeResponse]),
        (status = 302, description = "Not logged in or not HR")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    _gate: Gate<policy::ManageEmployees>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let employees = store.list_employees().await?;
    debug!(count = employees.len(), "Fetched employees");

    let mut data = Vec::with_capacity(employees.len());
    for employee in employees {
        data.push(with_identity(store, employee).await?);
    }
    Ok(HttpResponse::Ok().json(data))
}

/// Create Employee
///
/// Creates an identity with role `employee` and its employee record. The
/// `YYYYMM####` code is generated on save.
#[utoipa::path(
    post,
    path = "/erp/hr/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, body = EmployeeResponse),
        (status = 400, description = "Field errors", body = Object, example = json!({
            "errors": {"basic_salary": "Ensure this value is greater than or equal to 0."}
        })),
        (status = 409, description = "No free employee code after retrying")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    _gate: Gate<policy::ManageEmployees>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let (user, employee) = employees::hire(
        store.get_ref(),
        &index,
        Registration {
            username: payload.username.trim().to_string(),
            password: payload.password,
            role: Role::Employee,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
        },
        EmployeeFields {
            department: payload.department,
            designation: payload.designation,
            contact_number: payload.contact_number,
            basic_salary: payload.basic_salary,
            photo: payload.photo,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(EmployeeResponse {
        employee,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    }))
}

#[utoipa::path(
    get,
    path = "/erp/hr/employees/{id}",
    params(("id" = u64, Path, description = "Employee row id")),
    responses(
        (status = 200, body = EmployeeResponse),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    _gate: Gate<policy::ManageEmployees>,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let employee = store
        .get_employee(path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Employee"))?;
    Ok(HttpResponse::Ok().json(with_identity(store, employee).await?))
}

#[utoipa::path(
    put,
    path = "/erp/hr/employees/{id}",
    request_body = UpdateEmployee,
    params(("id" = u64, Path, description = "Employee row id")),
    responses(
        (status = 200, body = EmployeeResponse),
        (status = 400, description = "Field errors"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    _gate: Gate<policy::ManageEmployees>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let id = path.into_inner();
    let payload = payload.into_inner();

    let current = store
        .get_employee(id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    let mut changes = EmployeeChanges {
        department: payload.department,
        designation: payload.designation,
        contact_number: payload.contact_number,
        basic_salary: payload.basic_salary,
        photo: payload.photo,
    };

    // Check both halves before writing either.
    let mut errors = FieldErrors::new();
    employees::validate_changes(&mut changes, &mut errors);
    if let Some(v) = &payload.first_name {
        validate::max_len(&mut errors, "first_name", v, validate::NAME_MAX);
    }
    if let Some(v) = &payload.last_name {
        validate::max_len(&mut errors, "last_name", v, validate::NAME_MAX);
    }
    let email = payload.email.map(validate::blank_to_none);
    if let Some(v) = &email {
        validate::email(&mut errors, "email", v.as_deref());
    }
    errors.into_result()?;

    if payload.first_name.is_some() || payload.last_name.is_some() || email.is_some() {
        users::update_user(
            store,
            &index,
            current.user_id,
            UserEdit {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email,
                ..Default::default()
            },
        )
        .await?;
    }

    let employee = employees::update_employee(store, id, changes).await?;
    Ok(HttpResponse::Ok().json(with_identity(store, employee).await?))
}

#[utoipa::path(
    delete,
    path = "/erp/hr/employees/{id}",
    params(("id" = u64, Path, description = "Employee row id")),
    responses(
        (status = 204, description = "Identity, employee record and payrolls deleted"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    _gate: Gate<policy::ManageEmployees>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    employees::delete_employee(store.get_ref(), &index, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
