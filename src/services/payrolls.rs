//! Payroll saves.
//!
//! Every save, create or update, re-derives the salary columns from the
//! linked employee's *current* basic salary. Editing only the month of an old
//! row therefore picks up a raise given since the row was created.

use tracing::info;

use crate::compute::payroll::PayrollBreakdown;
use crate::error::{AppError, FieldErrors};
use crate::model::payroll::{Payroll, PayrollEntry};
use crate::services::validate;
use crate::store::{EmployeeStore, PayrollStore, Store};

#[derive(Debug, Clone)]
pub struct PayrollForm {
    /// Row id of the employee.
    pub employee_id: u64,
    pub month: String,
    pub year: i32,
}

#[derive(Debug, Clone, Default)]
pub struct PayrollEdit {
    pub employee_id: Option<u64>,
    pub month: Option<String>,
    pub year: Option<i32>,
}

/// Validates `form` and prices it against the employee as stored right now.
async fn price(store: &dyn Store, form: PayrollForm) -> Result<PayrollEntry, AppError> {
    let mut errors = FieldErrors::new();
    validate::required_text(&mut errors, "month", &form.month, validate::MONTH_MAX);
    validate::year(&mut errors, "year", form.year);

    let employee = store.get_employee(form.employee_id).await?;
    if employee.is_none() {
        errors.add("employee_id", "Select a valid employee.");
    }
    errors.into_result()?;

    let basic = employee.map(|e| e.basic_salary).unwrap_or_default();
    Ok(PayrollEntry {
        employee_id: form.employee_id,
        month: form.month.trim().to_string(),
        year: form.year,
        breakdown: PayrollBreakdown::from_basic(basic),
    })
}

pub async fn create_payroll(store: &dyn Store, form: PayrollForm) -> Result<Payroll, AppError> {
    let entry = price(store, form).await?;
    let payroll = store.insert_payroll(entry).await?;
    info!(
        payroll_id = payroll.id,
        employee_id = payroll.employee_id,
        net = %payroll.net_salary,
        "Payroll created"
    );
    Ok(payroll)
}

pub async fn update_payroll(
    store: &dyn Store,
    id: u64,
    edit: PayrollEdit,
) -> Result<Payroll, AppError> {
    let current = store
        .get_payroll(id)
        .await?
        .ok_or(AppError::NotFound("Payroll"))?;

    let form = PayrollForm {
        employee_id: edit.employee_id.unwrap_or(current.employee_id),
        month: edit.month.unwrap_or(current.month),
        year: edit.year.unwrap_or(current.year),
    };
    let entry = price(store, form).await?;

    let payroll = store
        .replace_payroll(id, entry)
        .await?
        .ok_or(AppError::NotFound("Payroll"))?;

    if payroll.net_salary != current.net_salary {
        info!(
            payroll_id = id,
            from = %current.net_salary,
            to = %payroll.net_salary,
            "Payroll re-priced from current basic salary"
        );
    }
    Ok(payroll)
}

pub async fn delete_payroll(store: &dyn Store, id: u64) -> Result<(), AppError> {
    if store.delete_payroll(id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Payroll"))
    }
}
