//! Field checks applied at the data-entry boundary. Each check records at
//! most one message per field into a shared [`FieldErrors`].

use rust_decimal::Decimal;

use crate::error::FieldErrors;

pub const USERNAME_MAX: usize = 150;
pub const NAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;
pub const DEPARTMENT_MAX: usize = 100;
pub const DESIGNATION_MAX: usize = 100;
pub const CONTACT_MAX: usize = 15;
pub const MONTH_MAX: usize = 20;
pub const TEAM_NAME_MAX: usize = 100;
pub const REPORT_TITLE_MAX: usize = 255;
pub const LEAD_NAME_MAX: usize = 255;
pub const LEAD_PHONE_MAX: usize = 20;
pub const LEAD_COMPANY_MAX: usize = 255;
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;

/// 99,999,999.99, the largest value of a `DECIMAL(10, 2)` column.
pub const SALARY_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

const REQUIRED: &str = "This field is required.";

pub fn username(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() > USERNAME_MAX {
        errors.add(
            field,
            format!("Ensure this value has at most {USERNAME_MAX} characters."),
        );
    } else if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            field,
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

pub fn required_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
    } else {
        max_len(errors, field, value, max);
    }
}

pub fn max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("Ensure this value has at most {max} characters."));
    }
}

pub fn optional_text(errors: &mut FieldErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        max_len(errors, field, value, max);
    }
}

pub fn email(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    let Some(value) = value else { return };
    max_len(errors, field, value, EMAIL_MAX);
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        errors.add(field, "Enter a valid email address.");
    }
}

pub fn salary(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value.is_sign_negative() && !value.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    } else if value.normalize().scale() > 2 {
        errors.add(field, "Ensure that there are no more than 2 decimal places.");
    } else if value > SALARY_MAX {
        errors.add(field, "Ensure that there are no more than 10 digits in total.");
    }
}

pub fn year(errors: &mut FieldErrors, field: &str, value: i32) {
    if !YEAR_RANGE.contains(&value) {
        errors.add(
            field,
            format!(
                "Ensure this value is between {} and {}.",
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            ),
        );
    }
}

/// Blank optional strings are stored as null.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
