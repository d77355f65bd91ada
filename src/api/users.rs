use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::double_option;
use crate::auth::gate::{Gate, policy};
use crate::error::AppError;
use crate::model::employee::{Employee, EmployeeFields};
use crate::model::role::Role;
use crate::model::user::User;
use crate::services::{
    employees,
    users::{self, Registration, UserEdit},
};
use crate::store::{Store, UserStore};
use crate::utils::username_index::UsernameIndex;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Only identities with this role.
    pub role: Option<Role>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "s3cret")]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    #[schema(example = "John")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john.doe@company.com", nullable = true)]
    pub email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    pub username: Option<String>,
    /// Empty or absent keeps the current password.
    pub password: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct AttachEmployee {
    /// Identity that gets the employee record.
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Developer")]
    pub designation: String,
    #[schema(example = "+8801712345678")]
    pub contact_number: String,
    #[schema(value_type = String, example = "50000.00")]
    pub basic_salary: Decimal,
    pub photo: Option<String>,
}

#[utoipa::path(
    get,
    path = "/erp/admin/users",
    params(UserQuery),
    responses(
        (status = 200, body = [User]),
        (status = 302, description = "Not logged in or not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    _gate: Gate<policy::ManageUsers>,
    store: web::Data<dyn Store>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, AppError> {
    let users = store.list_users(query.role).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    post,
    path = "/erp/admin/users",
    request_body = CreateUser,
    responses(
        (status = 201, body = User),
        (status = 400, description = "Field errors", body = Object, example = json!({
            "errors": {"username": "A user with that username already exists."}
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_user(
    _gate: Gate<policy::ManageUsers>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
    payload: web::Json<CreateUser>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let user = users::create_user(
        store.get_ref(),
        &index,
        Registration {
            username: payload.username.trim().to_string(),
            password: payload.password,
            role: payload.role,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    put,
    path = "/erp/admin/users/{id}",
    request_body = UpdateUser,
    params(("id" = u64, Path, description = "Identity id")),
    responses(
        (status = 200, body = User),
        (status = 400, description = "Field errors"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    _gate: Gate<policy::ManageUsers>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
    path: web::Path<u64>,
    payload: web::Json<UpdateUser>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let user = users::update_user(
        store.get_ref(),
        &index,
        path.into_inner(),
        UserEdit {
            username: payload.username.map(|u| u.trim().to_string()),
            password: payload.password,
            role: payload.role,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            is_active: payload.is_active,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    delete,
    path = "/erp/admin/users/{id}",
    params(("id" = u64, Path, description = "Identity id")),
    responses(
        (status = 204, description = "Identity and its dependent records deleted"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    _gate: Gate<policy::ManageUsers>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    users::delete_user(store.get_ref(), &index, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/erp/admin/employees",
    request_body = AttachEmployee,
    responses(
        (status = 201, body = Employee),
        (status = 400, description = "Field errors, or the identity already has a record"),
        (status = 409, description = "No free employee code after retrying")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn attach_employee(
    _gate: Gate<policy::AttachEmployee>,
    store: web::Data<dyn Store>,
    payload: web::Json<AttachEmployee>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let employee = employees::attach_employee(
        store.get_ref(),
        payload.user_id,
        EmployeeFields {
            department: payload.department,
            designation: payload.designation,
            contact_number: payload.contact_number,
            basic_salary: payload.basic_salary,
            photo: payload.photo,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(employee))
}
