use std::future::Future;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::compute::employee_id::EmployeeIdPrefix;
use crate::error::{AppError, FieldErrors};
use crate::model::employee::{Employee, EmployeeChanges, EmployeeFields};
use crate::model::role::Role;
use crate::model::user::User;
use crate::services::users::{self, Registration};
use crate::services::validate;
use crate::store::{EmployeeStore, Store, StoreError, StoreResult, UserStore};
use crate::utils::username_index::UsernameIndex;

/// Attempts at generating a free employee code before giving up.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Runs `op` until it stops failing with a duplicate employee code, at most
/// `attempts` times. The attempt number (starting at 1) is passed in. Every
/// other error is returned straight away.
pub async fn retry_on_duplicate_code<T, F, Fut>(attempts: usize, mut op: F) -> StoreResult<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Err(StoreError::DuplicateCode(reason)) if attempt < attempts => {
                warn!(attempt, %reason, "Employee code taken, retrying");
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn normalize_salary(errors: &mut FieldErrors, salary: Decimal) -> Decimal {
    validate::salary(errors, "basic_salary", salary);
    salary.round_dp(2)
}

pub fn validate_fields(fields: &mut EmployeeFields, errors: &mut FieldErrors) {
    validate::required_text(errors, "department", &fields.department, validate::DEPARTMENT_MAX);
    validate::required_text(errors, "designation", &fields.designation, validate::DESIGNATION_MAX);
    validate::required_text(errors, "contact_number", &fields.contact_number, validate::CONTACT_MAX);
    fields.basic_salary = normalize_salary(errors, fields.basic_salary);
    fields.photo = validate::blank_to_none(fields.photo.take());
}

pub fn validate_changes(changes: &mut EmployeeChanges, errors: &mut FieldErrors) {
    if let Some(v) = &changes.department {
        validate::required_text(errors, "department", v, validate::DEPARTMENT_MAX);
    }
    if let Some(v) = &changes.designation {
        validate::required_text(errors, "designation", v, validate::DESIGNATION_MAX);
    }
    if let Some(v) = &changes.contact_number {
        validate::required_text(errors, "contact_number", v, validate::CONTACT_MAX);
    }
    if let Some(v) = changes.basic_salary {
        changes.basic_salary = Some(normalize_salary(errors, v));
    }
    if let Some(photo) = changes.photo.take() {
        changes.photo = Some(validate::blank_to_none(photo));
    }
}

/// Inserts the employee row, generating its code for the current month.
///
/// Losing the code race to a concurrent insert is retried with a fresh code.
/// Any other constraint failure is a problem with the identity itself.
async fn insert_with_fresh_code(
    store: &dyn Store,
    user_id: u64,
    fields: EmployeeFields,
) -> Result<Employee, AppError> {
    let result = retry_on_duplicate_code(MAX_ID_ATTEMPTS, |_| {
        let fields = fields.clone();
        async move {
            store
                .insert_employee(user_id, fields, &EmployeeIdPrefix::current())
                .await
        }
    })
    .await;

    match result {
        Ok(employee) => {
            info!(user_id, employee_id = %employee.employee_id, "Employee record created");
            Ok(employee)
        }
        Err(StoreError::DuplicateCode(reason)) => {
            error!(user_id, %reason, attempts = MAX_ID_ATTEMPTS, "Could not assign an employee code");
            Err(AppError::Conflict(format!(
                "could not assign a unique employee code after {MAX_ID_ATTEMPTS} attempts"
            )))
        }
        Err(StoreError::Conflict(reason)) => {
            warn!(user_id, %reason, "Employee record rejected");
            if store.get_user(user_id).await?.is_none() {
                Err(AppError::validation("user", "Select a valid identity."))
            } else {
                Err(AppError::validation(
                    "user",
                    "This identity already has an employee record.",
                ))
            }
        }
        Err(other) => Err(other.into()),
    }
}

/// Attaches an employee record to an identity that has none.
pub async fn attach_employee(
    store: &dyn Store,
    user_id: u64,
    mut fields: EmployeeFields,
) -> Result<Employee, AppError> {
    let mut errors = FieldErrors::new();
    validate_fields(&mut fields, &mut errors);

    if store.get_user(user_id).await?.is_none() {
        errors.add("user", "Select a valid identity.");
    } else if store.employee_for_user(user_id).await?.is_some() {
        errors.add("user", "This identity already has an employee record.");
    }
    errors.into_result()?;

    insert_with_fresh_code(store, user_id, fields).await
}

/// HR onboarding: a new identity with role `employee` plus its employee record.
///
/// When the employee insert fails the freshly created identity is removed
/// again, so no half-onboarded identity is left behind.
pub async fn hire(
    store: &dyn Store,
    index: &UsernameIndex,
    mut registration: Registration,
    mut fields: EmployeeFields,
) -> Result<(User, Employee), AppError> {
    registration.role = Role::Employee;

    let mut errors = FieldErrors::new();
    registration.validate_into(&mut errors);
    validate_fields(&mut fields, &mut errors);
    errors.into_result()?;

    let user = users::create_user(store, index, registration).await?;

    match insert_with_fresh_code(store, user.id, fields).await {
        Ok(employee) => Ok((user, employee)),
        Err(err) => {
            if let Err(cleanup) = store.delete_user(user.id).await {
                error!(user_id = user.id, error = %cleanup, "Failed to roll back identity after employee insert failure");
            } else {
                index.forget(&user.username).await;
            }
            Err(err)
        }
    }
}

pub async fn update_employee(
    store: &dyn Store,
    id: u64,
    mut changes: EmployeeChanges,
) -> Result<Employee, AppError> {
    let mut errors = FieldErrors::new();
    validate_changes(&mut changes, &mut errors);
    errors.into_result()?;

    store
        .update_employee(id, changes)
        .await?
        .ok_or(AppError::NotFound("Employee"))
}

/// Removes the owning identity, which cascades to the employee and payrolls.
pub async fn delete_employee(
    store: &dyn Store,
    index: &UsernameIndex,
    id: u64,
) -> Result<(), AppError> {
    let employee = store
        .get_employee(id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;
    users::delete_user(store, index, employee.user_id).await
}
