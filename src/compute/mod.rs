//! Derived values computed at save time.

pub mod employee_id;
pub mod payroll;
