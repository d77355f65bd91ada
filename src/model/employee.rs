use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 7,
        "employee_id": "2025100001",
        "department": "Engineering",
        "designation": "Developer",
        "contact_number": "+8801712345678",
        "basic_salary": "50000.00",
        "photo": null
    })
)]
pub struct Employee {
    pub id: u64,

    /// Owning identity (1:1).
    pub user_id: u64,

    /// Derived `YYYYMM####` code, assigned once at first save.
    #[schema(example = "2025100001")]
    pub employee_id: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Developer")]
    pub designation: String,

    #[schema(example = "+8801712345678")]
    pub contact_number: String,

    #[schema(example = "50000.00")]
    pub basic_salary: Decimal,

    #[schema(example = "employee_photos/jdoe.png", nullable = true)]
    pub photo: Option<String>,
}

/// Employee columns supplied by the caller; the code is generated by the store.
#[derive(Debug, Clone)]
pub struct EmployeeFields {
    pub department: String,
    pub designation: String,
    pub contact_number: String,
    pub basic_salary: Decimal,
    pub photo: Option<String>,
}

/// Partial update. There is deliberately no way to set `employee_id` here.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub department: Option<String>,
    pub designation: Option<String>,
    pub contact_number: Option<String>,
    pub basic_salary: Option<Decimal>,
    pub photo: Option<Option<String>>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.department.is_none()
            && self.designation.is_none()
            && self.contact_number.is_none()
            && self.basic_salary.is_none()
            && self.photo.is_none()
    }
}
