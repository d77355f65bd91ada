use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::compute::payroll::PayrollBreakdown;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    #[schema(example = 1)]
    pub id: u64,
    /// Row id of the owning employee.
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "October")]
    pub month: String,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = "50000.00")]
    pub basic_salary: Decimal,
    #[schema(example = "10000.00")]
    pub hra: Decimal,
    #[schema(example = "5000.00")]
    pub allowances: Decimal,
    #[schema(example = "2500.00")]
    pub deductions: Decimal,
    #[schema(example = "62500.00")]
    pub net_salary: Decimal,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Full column set written on every payroll save.
#[derive(Debug, Clone)]
pub struct PayrollEntry {
    pub employee_id: u64,
    pub month: String,
    pub year: i32,
    pub breakdown: PayrollBreakdown,
}
