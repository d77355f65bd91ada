use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::double_option;
use crate::auth::gate::{Gate, policy};
use crate::error::{AppError, FieldErrors};
use crate::model::employee::{Employee, EmployeeChanges};
use crate::model::user::User;
use crate::services::{
    employees,
    users::{self, UserEdit},
    validate,
};
use crate::store::{EmployeeStore, Store, UserStore};
use crate::utils::username_index::UsernameIndex;

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    /// Present when the caller has an employee record.
    pub employee: Option<Employee>,
}

/// Self-service edit. Salary and role are not reachable from here.
#[derive(Deserialize, ToSchema)]
pub struct UpdateProfile {
    #[schema(example = "jdoe")]
    pub username: Option<String>,
    /// Empty or absent keeps the current password.
    pub password: Option<String>,
    pub contact_number: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub photo: Option<Option<String>>,
}

async fn load(store: &dyn Store, user_id: u64) -> Result<ProfileResponse, AppError> {
    let user = store
        .get_user(user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    let employee = store.employee_for_user(user_id).await?;
    Ok(ProfileResponse { user, employee })
}

#[utoipa::path(
    get,
    path = "/erp/profile",
    responses((status = 200, body = ProfileResponse)),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    gate: Gate<policy::Profile>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(load(store.get_ref(), gate.user_id).await?))
}

#[utoipa::path(
    put,
    path = "/erp/profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, body = ProfileResponse),
        (status = 400, description = "Field errors")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    gate: Gate<policy::Profile>,
    store: web::Data<dyn Store>,
    index: web::Data<UsernameIndex>,
    payload: web::Json<UpdateProfile>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let payload = payload.into_inner();
    let username = payload.username.map(|u| u.trim().to_string());

    let mut changes = EmployeeChanges {
        department: payload.department,
        designation: payload.designation,
        contact_number: payload.contact_number,
        photo: payload.photo,
        ..Default::default()
    };

    let mut errors = FieldErrors::new();
    if let Some(name) = &username {
        validate::username(&mut errors, "username", name);
    }
    employees::validate_changes(&mut changes, &mut errors);
    errors.into_result()?;

    if username.is_some() || payload.password.is_some() {
        users::update_user(
            store,
            &index,
            gate.user_id,
            UserEdit {
                username,
                password: payload.password,
                ..Default::default()
            },
        )
        .await?;
    }

    // Identities without an employee record only have the identity half.
    if let Some(employee_id) = gate.employee_id {
        if !changes.is_empty() {
            employees::update_employee(store, employee_id, changes).await?;
        }
    }

    Ok(HttpResponse::Ok().json(load(store, gate.user_id).await?))
}
